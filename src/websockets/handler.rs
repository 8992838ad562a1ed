use axum::{
    extract::{ws::WebSocket, Path, State, WebSocketUpgrade},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::connection::Connection;
use super::dispatcher::{CommandDispatcher, DirectoryViewerHandler};
use super::messages::WebSocketMessage;
use super::socket::run_connection;
use crate::auth::{websocket_protocol, websocket_token, Identity};
use crate::config::ConnectionConfig;
use crate::session::models::SessionId;
use crate::shared::{AppError, AppState};

/// WebSocket endpoint for one session's room
/// GET /ws/game/{id} with the token in Sec-WebSocket-Protocol or Authorization
pub async fn game_websocket_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<SessionId>,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    debug!(session_id = session_id, "Game WebSocket connection requested");
    let identity = authenticate(&app_state, &headers)?;

    // Verify the session exists before upgrading
    if app_state.lobby.get_session(session_id).await?.is_none() {
        warn!(
            session_id = session_id,
            user_id = %identity.user_id,
            "Session not found, rejecting WebSocket connection"
        );
        return Err(AppError::NotFound("session not found".to_string()));
    }

    info!(
        session_id = session_id,
        user_id = %identity.user_id,
        "Session verified, establishing WebSocket connection"
    );
    let ws = configure(ws, &headers, &app_state.connection_config);
    Ok(ws.on_upgrade(move |socket| {
        handle_game_connection(socket, session_id, identity, app_state)
    }))
}

/// WebSocket endpoint for the session directory
/// GET /ws/lobby with the token in Sec-WebSocket-Protocol or Authorization
pub async fn lobby_websocket_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let identity = authenticate(&app_state, &headers)?;
    info!(user_id = %identity.user_id, "Lobby WebSocket connection requested");

    let ws = configure(ws, &headers, &app_state.connection_config);
    Ok(ws.on_upgrade(move |socket| handle_lobby_connection(socket, identity, app_state)))
}

fn authenticate(app_state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let token = websocket_token(headers).map_err(|e| {
        warn!("Missing WebSocket authentication token");
        e
    })?;
    app_state.tokens.validate_token(token)
}

/// Applies frame limits and echoes a token sent as subprotocol, which browsers require
fn configure(ws: WebSocketUpgrade, headers: &HeaderMap, config: &ConnectionConfig) -> WebSocketUpgrade {
    let ws = ws
        .max_message_size(config.max_message_size)
        .max_frame_size(config.max_message_size);

    match websocket_protocol(headers) {
        Some(protocol) => ws.protocols([protocol.to_string()]),
        None => ws,
    }
}

/// Handle an upgraded session connection until it closes
async fn handle_game_connection(
    socket: WebSocket,
    session_id: SessionId,
    identity: Identity,
    app_state: AppState,
) {
    let config = &app_state.connection_config;
    let (connection, outbound) =
        Connection::new(&identity.user_id, config.outbound_queue_capacity);

    let room = app_state.room_manager.room_for(session_id).await;
    room.attach(Arc::clone(&connection)).await;

    // Snapshot after attaching, so nothing committed in between is missed
    match app_state.engine.get_state(session_id).await {
        Ok(view) => offer_snapshot(&connection, WebSocketMessage::game_state(&view)),
        Err(e) => warn!(
            session_id = session_id,
            error = %e,
            "Failed to load initial session state"
        ),
    }

    let dispatcher = Arc::new(CommandDispatcher::new(
        session_id,
        Arc::clone(&app_state.engine),
        Arc::clone(&app_state.directory),
    ));

    match run_connection(socket, Arc::clone(&connection), outbound, dispatcher, config).await {
        Ok(()) => info!(
            session_id = session_id,
            user_id = %identity.user_id,
            "WebSocket connection closed cleanly"
        ),
        Err(e) => warn!(
            session_id = session_id,
            user_id = %identity.user_id,
            error = %e,
            "WebSocket connection error"
        ),
    }

    room.detach(connection.id()).await;
}

/// Handle an upgraded directory connection until it closes
async fn handle_lobby_connection(socket: WebSocket, identity: Identity, app_state: AppState) {
    let config = &app_state.connection_config;
    let (connection, outbound) =
        Connection::new(&identity.user_id, config.outbound_queue_capacity);

    app_state.directory.attach(Arc::clone(&connection)).await;

    match app_state.lobby.list_sessions().await {
        Ok(listing) => offer_snapshot(&connection, WebSocketMessage::games_update(&listing)),
        Err(e) => warn!(error = %e, "Failed to load initial directory"),
    }

    let handler = Arc::new(DirectoryViewerHandler);
    if let Err(e) = run_connection(socket, Arc::clone(&connection), outbound, handler, config).await {
        warn!(user_id = %identity.user_id, error = %e, "Lobby WebSocket connection error");
    }

    app_state.directory.detach(connection.id()).await;
    debug!(user_id = %identity.user_id, "Lobby WebSocket connection closed");
}

fn offer_snapshot(connection: &Connection, message: Result<WebSocketMessage, serde_json::Error>) {
    match message.and_then(|m| m.to_json()) {
        Ok(json) => {
            connection.offer(Arc::from(json));
        }
        Err(e) => warn!(
            connection_id = %connection.id(),
            error = %e,
            "Failed to serialize initial snapshot"
        ),
    }
}
