use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    errors::StoreError,
    models::{clamp_max_participants, SessionId, SessionView},
    repository::SessionRepository,
};

/// Creation and listing of joinable sessions
pub struct SessionLobby {
    repository: Arc<dyn SessionRepository>,
    default_max_participants: i32,
}

impl SessionLobby {
    pub fn new(repository: Arc<dyn SessionRepository>, default_max_participants: i32) -> Self {
        Self {
            repository,
            default_max_participants: clamp_max_participants(default_max_participants),
        }
    }

    /// Creates a waiting session; the size is clamped into the supported range
    #[instrument(skip(self))]
    pub async fn create_session(
        &self,
        max_participants: Option<i32>,
    ) -> Result<SessionId, StoreError> {
        let max_participants = max_participants
            .map(clamp_max_participants)
            .unwrap_or(self.default_max_participants);

        let session_id = self.repository.create_session(max_participants).await?;
        info!(
            session_id = session_id,
            max_participants = max_participants,
            "Session created"
        );
        Ok(session_id)
    }

    /// Snapshot of every non-finished session, newest first
    #[instrument(skip(self))]
    pub async fn list_sessions(&self) -> Result<Vec<SessionView>, StoreError> {
        let sessions = self.repository.list_open_sessions().await?;

        let mut views = Vec::with_capacity(sessions.len());
        for session in sessions {
            let participants = self.repository.list_participants(session.id).await?;
            views.push(SessionView::assemble(session, participants));
        }
        Ok(views)
    }

    #[instrument(skip(self))]
    pub async fn get_session(&self, session_id: SessionId) -> Result<Option<SessionView>, StoreError> {
        let Some(session) = self.repository.get_session(session_id).await? else {
            return Ok(None);
        };
        let participants = self.repository.list_participants(session_id).await?;
        Ok(Some(SessionView::assemble(session, participants)))
    }
}
