use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::session::models::SessionView;

/// Message types for WebSocket communication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    // Client -> Server
    Ready,
    EndTurn,

    // Server -> Client
    PlayerJoined,
    PlayerReady,
    GameStarted,
    TurnChanged,
    GameState,
    GamesUpdate,
    Error,
}

/// Base structure for WebSocket messages: `{ "type": ..., "payload": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: Value,
}

/// A decoded inbound command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ready { is_ready: bool },
    EndTurn,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Unsupported message type: {0:?}")]
    Unsupported(MessageType),
}

impl Command {
    /// Decodes a text frame into a command
    ///
    /// `ready` without a boolean `isReady` means ready.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let message: WebSocketMessage =
            serde_json::from_str(text).map_err(|e| CommandError::Malformed(e.to_string()))?;

        match message.message_type {
            MessageType::Ready => Ok(Command::Ready {
                is_ready: message
                    .payload
                    .get("isReady")
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
            }),
            MessageType::EndTurn => Ok(Command::EndTurn),
            other => Err(CommandError::Unsupported(other)),
        }
    }
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: Value) -> Self {
        Self {
            message_type,
            payload,
        }
    }

    /// Create an ERROR message, private to one connection
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(MessageType::Error, json!({ "message": message.into() }))
    }

    /// Create a GAME_STATE snapshot for a newly attached connection
    pub fn game_state(view: &SessionView) -> Result<Self, serde_json::Error> {
        Ok(Self::new(MessageType::GameState, serde_json::to_value(view)?))
    }

    /// Create a GAMES_UPDATE directory snapshot
    pub fn games_update(listing: &[SessionView]) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            MessageType::GamesUpdate,
            serde_json::to_value(listing)?,
        ))
    }

    /// Create a READY command
    pub fn ready(is_ready: bool) -> Self {
        Self::new(MessageType::Ready, json!({ "isReady": is_ready }))
    }

    /// Create an END_TURN command
    pub fn end_turn() -> Self {
        Self::new(MessageType::EndTurn, json!({}))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
