use std::sync::Arc;
use tracing::debug;

use super::connection::{Connection, ConnectionId, ConnectionSet, Outbound};
use crate::event::{EventError, SessionEvent};
use crate::session::models::SessionId;

/// The live connections observing one session
pub struct Room {
    session_id: SessionId,
    connections: ConnectionSet,
}

impl Room {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            connections: ConnectionSet::new(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub async fn attach(&self, connection: Arc<Connection>) {
        debug!(
            session_id = self.session_id,
            connection_id = %connection.id(),
            user_id = %connection.user_id(),
            "Connection attached to room"
        );
        self.connections.attach(connection).await;
    }

    /// Idempotent; closes the connection's queue the first time only
    pub async fn detach(&self, connection_id: ConnectionId) -> bool {
        let removed = self.connections.detach(connection_id).await;
        if removed {
            debug!(
                session_id = self.session_id,
                connection_id = %connection_id,
                "Connection detached from room"
            );
        }
        removed
    }

    /// Serializes the event once and offers it to every attached connection
    pub async fn broadcast(&self, event: &SessionEvent) -> Result<usize, EventError> {
        let json =
            serde_json::to_string(event).map_err(|e| EventError::Serialization(e.to_string()))?;
        let message: Outbound = Arc::from(json);

        let queued = self.connections.offer_all(&message).await;
        debug!(
            session_id = self.session_id,
            event_type = event.event_type(),
            receivers = queued,
            "Room event broadcast"
        );
        Ok(queued)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.len().await
    }

    pub async fn contains(&self, connection_id: ConnectionId) -> bool {
        self.connections.contains(connection_id).await
    }
}
