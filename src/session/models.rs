use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub type SessionId = i64;
pub type UserId = String;

/// Smallest and largest table size a session may be created with
pub const MIN_PARTICIPANTS: i32 = 2;
pub const MAX_PARTICIPANTS: i32 = 8;

/// Lifecycle of a session: waiting for players, in progress, or done
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    Waiting,
    #[serde(rename = "in_progress")]
    #[strum(serialize = "in_progress")]
    Active,
    Finished,
}

/// Stored session record
#[derive(Debug, Clone, PartialEq)]
pub struct SessionModel {
    pub id: SessionId,
    pub status: SessionStatus,
    pub max_participants: i32,
    pub created_at: DateTime<Utc>,
}

/// Stored membership record, keyed by (session_id, user_id)
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantModel {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub display_name: String,
    /// Assigned at join time, never renumbered
    pub join_order: i32,
    pub is_ready: bool,
    pub is_current_turn: bool,
}

impl ParticipantModel {
    /// A freshly joined participant: not ready, not holding the turn
    pub fn new(session_id: SessionId, user_id: &str, display_name: &str, join_order: i32) -> Self {
        Self {
            session_id,
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            join_order,
            is_ready: false,
            is_current_turn: false,
        }
    }
}

/// Observer-facing view of one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub user_id: UserId,
    pub username: String,
    pub order: i32,
    pub is_ready: bool,
    pub is_current_turn: bool,
}

impl From<&ParticipantModel> for ParticipantView {
    fn from(participant: &ParticipantModel) -> Self {
        Self {
            user_id: participant.user_id.clone(),
            username: participant.display_name.clone(),
            order: participant.join_order,
            is_ready: participant.is_ready,
            is_current_turn: participant.is_current_turn,
        }
    }
}

/// Full state of a session as assembled from store reads
///
/// Also the element type of the directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub status: SessionStatus,
    /// Ordered by join order
    pub players: Vec<ParticipantView>,
    pub current_player_id: Option<UserId>,
    pub max_players: i32,
    pub created_at: DateTime<Utc>,
}

impl SessionView {
    /// Builds the view from a session and its participants
    ///
    /// Turn flags are only reported while the session is active.
    pub fn assemble(session: SessionModel, mut participants: Vec<ParticipantModel>) -> Self {
        participants.sort_by_key(|p| p.join_order);

        let active = session.status == SessionStatus::Active;
        let current_player_id = participants
            .iter()
            .find(|p| active && p.is_current_turn)
            .map(|p| p.user_id.clone());

        let players = participants
            .iter()
            .map(|p| ParticipantView {
                is_current_turn: active && p.is_current_turn,
                ..ParticipantView::from(p)
            })
            .collect();

        Self {
            id: session.id,
            status: session.status,
            players,
            current_player_id,
            max_players: session.max_participants,
            created_at: session.created_at,
        }
    }

    pub fn has_player(&self, user_id: &str) -> bool {
        self.players.iter().any(|p| p.user_id == user_id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }
}

/// Clamps a requested table size into the supported range
pub fn clamp_max_participants(requested: i32) -> i32 {
    requested.clamp(MIN_PARTICIPANTS, MAX_PARTICIPANTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn session(status: SessionStatus) -> SessionModel {
        SessionModel {
            id: 7,
            status,
            max_participants: 4,
            created_at: Utc::now(),
        }
    }

    fn participant(user_id: &str, order: i32, turn: bool) -> ParticipantModel {
        ParticipantModel {
            is_current_turn: turn,
            ..ParticipantModel::new(7, user_id, user_id, order)
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(SessionStatus::Active.to_string(), "in_progress");
        assert_eq!(
            SessionStatus::from_str("waiting").unwrap(),
            SessionStatus::Waiting
        );
        assert_eq!(
            serde_json::to_value(SessionStatus::Active).unwrap(),
            "in_progress"
        );
        assert_eq!(SessionStatus::Finished.as_ref(), "finished");
    }

    #[test]
    fn test_assemble_orders_players_and_reports_turn() {
        let view = SessionView::assemble(
            session(SessionStatus::Active),
            vec![participant("bob", 1, true), participant("alice", 0, false)],
        );

        assert_eq!(view.players[0].user_id, "alice");
        assert_eq!(view.players[1].user_id, "bob");
        assert_eq!(view.current_player_id.as_deref(), Some("bob"));
        assert!(view.has_player("alice"));
        assert!(!view.is_full());
    }

    #[test]
    fn test_assemble_hides_turn_outside_active() {
        let view = SessionView::assemble(
            session(SessionStatus::Waiting),
            vec![participant("alice", 0, true), participant("bob", 1, false)],
        );
        assert_eq!(view.current_player_id, None);
        assert!(view.players.iter().all(|p| !p.is_current_turn));
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let view = SessionView::assemble(
            session(SessionStatus::Waiting),
            vec![participant("alice", 0, false)],
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["maxPlayers"], 4);
        assert_eq!(json["players"][0]["isReady"], false);
        assert_eq!(json["players"][0]["userId"], "alice");
    }

    #[rstest]
    #[case(0, 2)]
    #[case(2, 2)]
    #[case(5, 5)]
    #[case(8, 8)]
    #[case(20, 8)]
    fn test_clamp_max_participants(#[case] requested: i32, #[case] expected: i32) {
        assert_eq!(clamp_max_participants(requested), expected);
    }
}
