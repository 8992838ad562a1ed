use serde::{Deserialize, Serialize};

use super::models::SessionId;

/// Request payload for creating a new session
///
/// A missing or unparseable body falls back to the default size.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub max_players: Option<i32>,
}

/// Response for session creation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub game_id: SessionId,
}

/// Response for a successful join
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionResponse {
    pub message: String,
    pub game_id: SessionId,
}
