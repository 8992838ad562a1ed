use std::collections::HashMap;
use std::sync::Arc;

use boardroom::{
    session::{
        InMemorySessionRepository, SessionEngine, SessionId, SessionLobby, SessionRepository,
    },
    websockets::{CommandDispatcher, DirectoryBroadcaster, RoomManager},
};

use super::clients::RecordingClient;
use super::store::ControlledRepository;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub repository: Arc<InMemorySessionRepository>,
    pub store: Arc<ControlledRepository>,
    pub engine: Arc<SessionEngine>,
    pub lobby: Arc<SessionLobby>,
    pub room_manager: Arc<RoomManager>,
    pub directory: Arc<DirectoryBroadcaster>,
    pub dispatcher: CommandDispatcher,
    pub session_id: SessionId,
    pub players: Vec<String>,
    pub clients: HashMap<String, RecordingClient>,
    pub viewer: RecordingClient,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    max_players: i32,
    queue_capacity: usize,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            max_players: 4,
            queue_capacity: 64,
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie"])
    }

    pub fn with_four_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie", "david"])
    }

    pub fn with_max_players(mut self, max_players: i32) -> Self {
        self.max_players = max_players;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Creates the session, joins every player, then attaches one client per
    /// player to the room and one viewer to the directory
    pub async fn build(self) -> TestSetup {
        let repository = Arc::new(InMemorySessionRepository::new());
        let store = Arc::new(ControlledRepository::new(repository.clone()));
        let room_manager = Arc::new(RoomManager::new());
        let engine = Arc::new(SessionEngine::new(
            store.clone() as Arc<dyn SessionRepository>,
            room_manager.clone(),
        ));
        let lobby = Arc::new(SessionLobby::new(store.clone(), 4));
        let directory = Arc::new(DirectoryBroadcaster::new(lobby.clone()));

        let session_id = lobby.create_session(Some(self.max_players)).await.unwrap();
        for player in &self.players {
            engine.join(session_id, player, player).await.unwrap();
        }

        let room = room_manager.room_for(session_id).await;
        let mut clients = HashMap::new();
        for player in &self.players {
            let client = RecordingClient::new(player, self.queue_capacity);
            room.attach(client.connection.clone()).await;
            clients.insert(player.clone(), client);
        }

        let viewer = RecordingClient::new("viewer", self.queue_capacity);
        directory.attach(viewer.connection.clone()).await;

        let dispatcher = CommandDispatcher::new(session_id, engine.clone(), directory.clone());

        TestSetup {
            repository,
            store,
            engine,
            lobby,
            room_manager,
            directory,
            dispatcher,
            session_id,
            players: self.players,
            clients,
            viewer,
        }
    }
}

impl TestSetup {
    pub fn client(&self, player: &str) -> &RecordingClient {
        self.clients
            .get(player)
            .unwrap_or_else(|| panic!("{} has no client", player))
    }
}
