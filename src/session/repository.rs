use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument, warn};

use super::{
    errors::StoreError,
    models::{ParticipantModel, SessionId, SessionModel, SessionStatus},
};

/// Durable record of sessions and their participants
///
/// Every method is a single store round trip. Callers that need a
/// read-validate-write sequence must provide their own exclusion.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, max_participants: i32) -> Result<SessionId, StoreError>;

    async fn get_session(&self, session_id: SessionId) -> Result<Option<SessionModel>, StoreError>;

    /// Non-finished sessions, newest first
    async fn list_open_sessions(&self) -> Result<Vec<SessionModel>, StoreError>;

    async fn set_session_status(
        &self,
        session_id: SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError>;

    /// Fails if (session_id, user_id) already exists
    async fn add_participant(&self, participant: &ParticipantModel) -> Result<(), StoreError>;

    /// Ordered by join order
    async fn list_participants(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ParticipantModel>, StoreError>;

    async fn set_participant_ready(
        &self,
        session_id: SessionId,
        user_id: &str,
        is_ready: bool,
    ) -> Result<(), StoreError>;

    /// Clears every turn flag in the session and sets the given user's, atomically
    async fn set_current_turn(&self, session_id: SessionId, user_id: &str)
        -> Result<(), StoreError>;
}

#[derive(Default)]
struct InMemoryState {
    last_id: SessionId,
    sessions: HashMap<SessionId, SessionModel>,
    participants: HashMap<SessionId, Vec<ParticipantModel>>,
}

/// In-memory implementation of SessionRepository for development and testing
///
/// Each method takes the state lock once, so the turn swap is atomic here too.
#[derive(Default)]
pub struct InMemorySessionRepository {
    state: Mutex<InMemoryState>,
}

impl InMemorySessionRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current number of sessions in the repository
    pub fn session_count(&self) -> usize {
        self.state().sessions.len()
    }

    fn state(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self))]
    async fn create_session(&self, max_participants: i32) -> Result<SessionId, StoreError> {
        let mut state = self.state();
        state.last_id += 1;
        let id = state.last_id;

        state.sessions.insert(
            id,
            SessionModel {
                id,
                status: SessionStatus::Waiting,
                max_participants,
                created_at: Utc::now(),
            },
        );
        state.participants.insert(id, Vec::new());

        debug!(session_id = id, "Session created in memory");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: SessionId) -> Result<Option<SessionModel>, StoreError> {
        Ok(self.state().sessions.get(&session_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_open_sessions(&self) -> Result<Vec<SessionModel>, StoreError> {
        let state = self.state();
        let mut sessions: Vec<SessionModel> = state
            .sessions
            .values()
            .filter(|s| s.status != SessionStatus::Finished)
            .cloned()
            .collect();

        // Ids break ties between sessions created within the same instant
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(sessions)
    }

    #[instrument(skip(self))]
    async fn set_session_status(
        &self,
        session_id: SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        let session = state.sessions.get_mut(&session_id).ok_or_else(|| {
            warn!(session_id = session_id, "Status update for unknown session");
            StoreError::Database(format!("session {} does not exist", session_id))
        })?;
        session.status = status;
        Ok(())
    }

    #[instrument(skip(self, participant), fields(session_id = participant.session_id, user_id = %participant.user_id))]
    async fn add_participant(&self, participant: &ParticipantModel) -> Result<(), StoreError> {
        let mut state = self.state();
        let participants = state
            .participants
            .get_mut(&participant.session_id)
            .ok_or_else(|| {
                StoreError::Database(format!(
                    "session {} does not exist",
                    participant.session_id
                ))
            })?;

        if participants.iter().any(|p| p.user_id == participant.user_id) {
            warn!("Duplicate participant rejected by store");
            return Err(StoreError::Database(
                "participant already exists".to_string(),
            ));
        }
        if participants
            .iter()
            .any(|p| p.join_order == participant.join_order)
        {
            return Err(StoreError::Database("join order already taken".to_string()));
        }

        participants.push(participant.clone());
        participants.sort_by_key(|p| p.join_order);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_participants(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ParticipantModel>, StoreError> {
        Ok(self
            .state()
            .participants
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn set_participant_ready(
        &self,
        session_id: SessionId,
        user_id: &str,
        is_ready: bool,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        if let Some(participant) = state
            .participants
            .get_mut(&session_id)
            .and_then(|ps| ps.iter_mut().find(|p| p.user_id == user_id))
        {
            participant.is_ready = is_ready;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_current_turn(
        &self,
        session_id: SessionId,
        user_id: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state();
        if let Some(participants) = state.participants.get_mut(&session_id) {
            for participant in participants.iter_mut() {
                participant.is_current_turn = participant.user_id == user_id;
            }
        }
        Ok(())
    }
}
