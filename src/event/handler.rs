use async_trait::async_trait;
use thiserror::Error;

use super::events::SessionEvent;
use crate::session::models::SessionId;

/// Errors that can occur when handling events
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Failed to serialize event: {0}")]
    Serialization(String),
}

/// Trait for components that react to committed session events
///
/// The engine calls `handle` while it still holds the session's serialization
/// point, so implementations see events in commit order. They must not block:
/// anything slow belongs on a queue, not in the handler.
///
/// A failed handler is a dropped notification, never a state error. The
/// committed state stays correct in the store.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, session_id: SessionId, event: &SessionEvent)
        -> Result<(), EventError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// A no-op event handler for testing
///
/// This handler does nothing but can be used in tests where you need
/// an EventHandler but don't care about the actual behavior.
pub struct NoOpEventHandler;

#[async_trait]
impl EventHandler for NoOpEventHandler {
    async fn handle(
        &self,
        _session_id: SessionId,
        _event: &SessionEvent,
    ) -> Result<(), EventError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NoOpEventHandler"
    }
}
