use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::connection::{Connection, ConnectionId, ConnectionSet, Outbound};
use super::messages::WebSocketMessage;
use crate::session::{errors::StoreError, lobby::SessionLobby, models::SessionView};

/// Fan-out of the joinable-session listing to directory viewers
///
/// Not scoped to any session. Every update is a full snapshot, so viewers
/// never merge deltas; refreshes are serialized so a stale snapshot can't
/// overtake a newer one.
pub struct DirectoryBroadcaster {
    lobby: Arc<SessionLobby>,
    connections: ConnectionSet,
    refresh_lock: Mutex<()>,
}

impl DirectoryBroadcaster {
    pub fn new(lobby: Arc<SessionLobby>) -> Self {
        Self {
            lobby,
            connections: ConnectionSet::new(),
            refresh_lock: Mutex::new(()),
        }
    }

    pub async fn attach(&self, connection: Arc<Connection>) {
        debug!(connection_id = %connection.id(), "Directory viewer attached");
        self.connections.attach(connection).await;
    }

    /// Idempotent; closes the connection's queue the first time only
    pub async fn detach(&self, connection_id: ConnectionId) -> bool {
        self.connections.detach(connection_id).await
    }

    /// Pushes one snapshot to every attached viewer
    pub async fn broadcast_directory(&self, listing: &[SessionView]) -> usize {
        let json = match WebSocketMessage::games_update(listing).and_then(|m| m.to_json()) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize directory snapshot");
                return 0;
            }
        };
        let message: Outbound = Arc::from(json);

        let queued = self.connections.offer_all(&message).await;
        debug!(
            sessions = listing.len(),
            receivers = queued,
            "Directory snapshot broadcast"
        );
        queued
    }

    /// Re-reads the listing and broadcasts it
    pub async fn refresh(&self) -> Result<usize, StoreError> {
        let _serialized = self.refresh_lock.lock().await;
        let listing = self.lobby.list_sessions().await?;
        Ok(self.broadcast_directory(&listing).await)
    }

    /// Refresh for callers that have nothing to do with a failure but log it
    pub async fn refresh_logged(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Directory refresh failed");
        }
    }

    pub async fn viewer_count(&self) -> usize {
        self.connections.len().await
    }
}
