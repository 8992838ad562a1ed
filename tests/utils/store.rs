#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use boardroom::session::{
    models::{ParticipantModel, SessionModel},
    InMemorySessionRepository, SessionId, SessionRepository, SessionStatus, StoreError,
};

// ============================================================================
// Controllable Store
// ============================================================================

/// In-memory store whose writes can be slowed down or made to fail
///
/// Reads always succeed so tests can inspect what was committed.
pub struct ControlledRepository {
    inner: Arc<InMemorySessionRepository>,
    failing: AtomicBool,
    status_delay_ms: AtomicU64,
}

impl ControlledRepository {
    pub fn new(inner: Arc<InMemorySessionRepository>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
            status_delay_ms: AtomicU64::new(0),
        }
    }

    /// Every write fails with a database error until turned off again
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Status writes sleep this long before committing
    pub fn set_status_delay(&self, delay: Duration) {
        self.status_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection reset by peer".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for ControlledRepository {
    async fn create_session(&self, max_participants: i32) -> Result<SessionId, StoreError> {
        self.check_write()?;
        self.inner.create_session(max_participants).await
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Option<SessionModel>, StoreError> {
        self.inner.get_session(session_id).await
    }

    async fn list_open_sessions(&self) -> Result<Vec<SessionModel>, StoreError> {
        self.inner.list_open_sessions().await
    }

    async fn set_session_status(
        &self,
        session_id: SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        let delay = self.status_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.check_write()?;
        self.inner.set_session_status(session_id, status).await
    }

    async fn add_participant(&self, participant: &ParticipantModel) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.add_participant(participant).await
    }

    async fn list_participants(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ParticipantModel>, StoreError> {
        self.inner.list_participants(session_id).await
    }

    async fn set_participant_ready(
        &self,
        session_id: SessionId,
        user_id: &str,
        is_ready: bool,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner
            .set_participant_ready(session_id, user_id, is_ready)
            .await
    }

    async fn set_current_turn(
        &self,
        session_id: SessionId,
        user_id: &str,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.set_current_turn(session_id, user_id).await
    }
}
