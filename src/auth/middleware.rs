use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::shared::{AppError, AppState};

/// Subprotocol header browsers can set on a WebSocket handshake
pub const WEBSOCKET_PROTOCOL_HEADER: &str = "sec-websocket-protocol";

/// JWT authentication middleware - validates the Authorization Bearer header and adds the Identity to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), auth::jwt_auth))
/// Handlers can then extract Extension(identity): Extension<Identity>.
#[instrument(skip(state, req, next))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    debug!(uri = %req.uri(), "JWT authentication middleware triggered");

    let token = bearer_token(req.headers())?;
    let identity = state.tokens.validate_token(token).map_err(|e| {
        warn!(error = %e, "JWT authentication failed");
        e
    })?;

    debug!(
        user_id = %identity.user_id,
        username = %identity.username,
        "Authentication successful, adding identity to request"
    );

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Extracts the token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header in request");
            AppError::Unauthorized("Missing authorization header".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Invalid Authorization header format (expected Bearer token)");
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })
}

/// First subprotocol the client offered, which carries the token
pub fn websocket_protocol(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(WEBSOCKET_PROTOCOL_HEADER)
        .and_then(|h| h.to_str().ok())?
        .split(',')
        .map(str::trim)
        .find(|protocol| !protocol.is_empty())
}

/// Token for a WebSocket handshake: the subprotocol header first, then a bearer header
pub fn websocket_token(headers: &HeaderMap) -> Result<&str, AppError> {
    match websocket_protocol(headers) {
        Some(token) => Ok(token),
        None => bearer_token(headers),
    }
}
