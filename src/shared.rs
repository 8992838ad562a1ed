use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::TokenConfig;
use crate::config::ConnectionConfig;
use crate::session::{
    engine::SessionEngine,
    errors::{SessionError, StoreError},
    lobby::SessionLobby,
    repository::SessionRepository,
};
use crate::websockets::{DirectoryBroadcaster, RoomManager};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SessionEngine>,
    pub lobby: Arc<SessionLobby>,
    pub room_manager: Arc<RoomManager>,
    pub directory: Arc<DirectoryBroadcaster>,
    pub tokens: Arc<TokenConfig>,
    pub connection_config: ConnectionConfig,
}

impl AppState {
    /// Wires the engine, rooms and directory around one store
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        tokens: TokenConfig,
        connection_config: ConnectionConfig,
        default_max_participants: i32,
    ) -> Self {
        let room_manager = Arc::new(RoomManager::new());
        let engine = Arc::new(SessionEngine::new(
            Arc::clone(&repository),
            room_manager.clone(),
        ));
        let lobby = Arc::new(SessionLobby::new(repository, default_max_participants));
        let directory = Arc::new(DirectoryBroadcaster::new(Arc::clone(&lobby)));

        Self {
            engine,
            lobby,
            room_manager,
            directory,
            tokens: Arc::new(tokens),
            connection_config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound => AppError::NotFound("session not found".to_string()),
            SessionError::Store(store) => store.into(),
            rejection => AppError::BadRequest(rejection.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::JwtError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::DatabaseError(msg) => {
                // Logged here, never shown to the client
                error!(error = %msg, "Store fault while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
