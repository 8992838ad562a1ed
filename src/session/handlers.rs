use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{debug, info, instrument};

use super::{
    models::{SessionId, SessionView},
    types::{CreateSessionRequest, CreateSessionResponse, JoinSessionResponse},
};
use crate::auth::Identity;
use crate::shared::{AppError, AppState};

/// HTTP handler for listing joinable sessions
///
/// GET /api/lobby/games
/// Returns every non-finished session, newest first
#[instrument(name = "list_sessions", skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionView>>, AppError> {
    let sessions = state.lobby.list_sessions().await?;
    debug!(session_count = sessions.len(), "Sessions listed");
    Ok(Json(sessions))
}

/// HTTP handler for creating a new session
///
/// POST /api/lobby/create with optional `{ "maxPlayers": n }`
#[instrument(name = "create_session", skip(state, body))]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let request: CreateSessionRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!(error = %e, "Unreadable create request, using default size");
        CreateSessionRequest::default()
    });

    let game_id = state.lobby.create_session(request.max_players).await?;
    info!(
        session_id = game_id,
        user_id = %identity.user_id,
        "Session created via HTTP"
    );

    state.directory.refresh_logged().await;
    Ok((StatusCode::CREATED, Json(CreateSessionResponse { game_id })))
}

/// HTTP handler for joining a session
///
/// POST /api/lobby/join/{id}
/// The engine broadcasts `player_joined` to the room; the directory is refreshed afterwards
#[instrument(name = "join_session", skip(state, identity))]
pub async fn join_session(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<JoinSessionResponse>, AppError> {
    state
        .engine
        .join(session_id, &identity.user_id, &identity.username)
        .await?;

    state.directory.refresh_logged().await;
    Ok(Json(JoinSessionResponse {
        message: "Joined game successfully".to_string(),
        game_id: session_id,
    }))
}

/// HTTP handler for reading one session
///
/// GET /api/lobby/games/{id}
#[instrument(name = "get_session", skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionView>, AppError> {
    state
        .lobby
        .get_session(session_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("session not found".to_string()))
}
