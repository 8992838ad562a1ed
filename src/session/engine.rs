use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};

use super::{
    errors::SessionError,
    models::{ParticipantModel, ParticipantView, SessionId, SessionStatus, SessionView},
    repository::SessionRepository,
};
use crate::event::{EventHandler, SessionEvent};

/// One serialization token per session id
///
/// Tokens are created on first use and kept for the process lifetime, like
/// the rooms they pair with. The outer map lock is held only long enough to
/// clone the token out, so unrelated sessions never wait on each other.
#[derive(Default)]
pub struct SessionLocks {
    tokens: Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to one session
    pub async fn acquire(&self, session_id: SessionId) -> OwnedMutexGuard<()> {
        let token = {
            let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(tokens.entry(session_id).or_default())
        };
        token.lock_owned().await
    }
}

/// Command validation and state transitions for sessions
///
/// The engine holds no session state between calls: every command re-reads
/// the store inside its session's serialized section, commits, and hands the
/// resulting event to the event handler before releasing the section.
pub struct SessionEngine {
    repository: Arc<dyn SessionRepository>,
    event_handler: Arc<dyn EventHandler>,
    locks: SessionLocks,
}

impl SessionEngine {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            repository,
            event_handler,
            locks: SessionLocks::new(),
        }
    }

    /// Assembles the full view of a session from store reads
    #[instrument(skip(self))]
    pub async fn get_state(&self, session_id: SessionId) -> Result<SessionView, SessionError> {
        let session = self
            .repository
            .get_session(session_id)
            .await?
            .ok_or(SessionError::NotFound)?;
        let participants = self.repository.list_participants(session_id).await?;

        Ok(SessionView::assemble(session, participants))
    }

    /// Admits a user to a waiting session with the next join order
    #[instrument(skip(self, display_name))]
    pub async fn join(
        &self,
        session_id: SessionId,
        user_id: &str,
        display_name: &str,
    ) -> Result<SessionEvent, SessionError> {
        let _guard = self.locks.acquire(session_id).await;
        let state = self.get_state(session_id).await?;

        if state.status != SessionStatus::Waiting {
            return Err(self.reject(session_id, user_id, SessionError::AlreadyStarted));
        }
        if state.is_full() {
            return Err(self.reject(session_id, user_id, SessionError::Full));
        }
        if state.has_player(user_id) {
            return Err(self.reject(session_id, user_id, SessionError::AlreadyMember));
        }

        let join_order = state.players.len() as i32;
        let participant = ParticipantModel::new(session_id, user_id, display_name, join_order);
        self.repository.add_participant(&participant).await?;

        info!(
            session_id = session_id,
            user_id = %user_id,
            join_order = join_order,
            "Participant joined session"
        );

        let event = SessionEvent::ParticipantJoined {
            player: ParticipantView::from(&participant),
        };
        self.publish(session_id, &event).await;
        Ok(event)
    }

    /// Records a participant's readiness and starts the session once everyone is ready
    ///
    /// Returns `SessionStarted` instead of `ReadinessChanged` when this call
    /// completed the ready set; never both.
    #[instrument(skip(self))]
    pub async fn set_ready(
        &self,
        session_id: SessionId,
        user_id: &str,
        is_ready: bool,
    ) -> Result<SessionEvent, SessionError> {
        let _guard = self.locks.acquire(session_id).await;
        let state = self.get_state(session_id).await?;

        if state.status != SessionStatus::Waiting {
            return Err(self.reject(session_id, user_id, SessionError::AlreadyStarted));
        }
        if !state.has_player(user_id) {
            return Err(self.reject(session_id, user_id, SessionError::NotAMember));
        }

        self.repository
            .set_participant_ready(session_id, user_id, is_ready)
            .await?;

        let participants = self.repository.list_participants(session_id).await?;
        let all_ready = participants.len() >= 2 && participants.iter().all(|p| p.is_ready);

        let event = match participants.iter().min_by_key(|p| p.join_order) {
            Some(first) if all_ready => {
                // Turn first: a fault before the status write leaves a waiting
                // session whose stray flag the next start overwrites.
                self.repository
                    .set_current_turn(session_id, &first.user_id)
                    .await?;
                self.repository
                    .set_session_status(session_id, SessionStatus::Active)
                    .await?;

                info!(
                    session_id = session_id,
                    participants = participants.len(),
                    first_player = %first.user_id,
                    "Session started"
                );
                SessionEvent::SessionStarted {
                    current_player_id: first.user_id.clone(),
                }
            }
            _ => {
                debug!(session_id = session_id, user_id = %user_id, is_ready, "Readiness changed");
                SessionEvent::ReadinessChanged {
                    user_id: user_id.to_string(),
                    is_ready,
                }
            }
        };

        self.publish(session_id, &event).await;
        Ok(event)
    }

    /// Passes the turn from its holder to the next participant in join order
    #[instrument(skip(self))]
    pub async fn advance_turn(
        &self,
        session_id: SessionId,
        user_id: &str,
    ) -> Result<SessionEvent, SessionError> {
        let _guard = self.locks.acquire(session_id).await;
        let state = self.get_state(session_id).await?;

        if state.status != SessionStatus::Active {
            return Err(self.reject(session_id, user_id, SessionError::NotStarted));
        }
        if state.current_player_id.as_deref() != Some(user_id) {
            return Err(self.reject(session_id, user_id, SessionError::NotYourTurn));
        }

        let current_index = state
            .players
            .iter()
            .position(|p| p.user_id == user_id)
            .ok_or(SessionError::NotYourTurn)?;
        let next = &state.players[(current_index + 1) % state.players.len()];

        self.repository
            .set_current_turn(session_id, &next.user_id)
            .await?;

        debug!(
            session_id = session_id,
            previous = %user_id,
            current = %next.user_id,
            "Turn advanced"
        );

        let event = SessionEvent::TurnAdvanced {
            previous_player_id: user_id.to_string(),
            current_player_id: next.user_id.clone(),
        };
        self.publish(session_id, &event).await;
        Ok(event)
    }

    async fn publish(&self, session_id: SessionId, event: &SessionEvent) {
        if let Err(e) = self.event_handler.handle(session_id, event).await {
            warn!(
                session_id = session_id,
                handler = self.event_handler.name(),
                event_type = event.event_type(),
                error = %e,
                "Event handler failed, notification dropped"
            );
        }
    }

    fn reject(&self, session_id: SessionId, user_id: &str, error: SessionError) -> SessionError {
        debug!(session_id = session_id, user_id = %user_id, reason = %error, "Command rejected");
        error
    }
}
