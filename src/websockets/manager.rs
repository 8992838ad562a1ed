use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::room::Room;
use crate::event::{EventError, EventHandler, SessionEvent};
use crate::session::models::SessionId;

/// Maps session ids to their rooms
///
/// Rooms are created on first reference and retained for the process
/// lifetime; at most one room ever exists per session id.
#[derive(Default)]
pub struct RoomManager {
    rooms: RwLock<HashMap<SessionId, Arc<Room>>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session's room, creating it on first access
    pub async fn room_for(&self, session_id: SessionId) -> Arc<Room> {
        if let Some(room) = self.rooms.read().await.get(&session_id) {
            return Arc::clone(room);
        }

        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(session_id).or_insert_with(|| {
            debug!(session_id = session_id, "Creating room");
            Arc::new(Room::new(session_id))
        });
        Arc::clone(room)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

/// Fans committed events out to the session's room
#[async_trait]
impl EventHandler for RoomManager {
    async fn handle(&self, session_id: SessionId, event: &SessionEvent) -> Result<(), EventError> {
        self.room_for(session_id).await.broadcast(event).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "RoomManager"
    }
}
