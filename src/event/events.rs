use serde::{Deserialize, Serialize};

use crate::session::models::{ParticipantView, UserId};

/// Committed state transitions of a session
///
/// Events represent facts about things that have already happened. They are
/// produced by the engine only after the store mutation has committed, and
/// serialize directly to the outbound wire envelope `{ "type", "payload" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum SessionEvent {
    /// A participant was admitted to a waiting session
    #[serde(rename = "player_joined")]
    ParticipantJoined { player: ParticipantView },

    /// A participant toggled their ready flag without starting the session
    #[serde(rename = "player_ready", rename_all = "camelCase")]
    ReadinessChanged { user_id: UserId, is_ready: bool },

    /// Everyone was ready: the session is active and the first turn assigned
    #[serde(rename = "game_started", rename_all = "camelCase")]
    SessionStarted { current_player_id: UserId },

    /// The turn moved to the next participant in join order
    #[serde(rename = "turn_changed", rename_all = "camelCase")]
    TurnAdvanced {
        previous_player_id: UserId,
        current_player_id: UserId,
    },
}

impl SessionEvent {
    /// Wire name of the event kind
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::ParticipantJoined { .. } => "player_joined",
            SessionEvent::ReadinessChanged { .. } => "player_ready",
            SessionEvent::SessionStarted { .. } => "game_started",
            SessionEvent::TurnAdvanced { .. } => "turn_changed",
        }
    }

    /// Whether observers of the session directory need a fresh listing
    pub fn changes_directory(&self) -> bool {
        !matches!(self, SessionEvent::TurnAdvanced { .. })
    }
}
