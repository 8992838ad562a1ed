use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::auth;
use crate::config::ServerConfig;
use crate::session::{self, InMemorySessionRepository, PostgresSessionRepository, SessionRepository};
use crate::shared::AppState;
use crate::websockets::{game_websocket_handler, lobby_websocket_handler};

/// HTTP and WebSocket routes for the given state
pub fn build_router(app_state: AppState) -> Router {
    let lobby_routes = Router::new()
        .route("/games", get(session::list_sessions))
        .route("/games/:id", get(session::get_session))
        .route("/create", post(session::create_session))
        .route("/join/:id", post(session::join_session))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::jwt_auth,
        ));

    Router::new()
        .route("/api/auth/session", post(auth::create_identity))
        .nest("/api/lobby", lobby_routes)
        .route("/ws/game/:id", get(game_websocket_handler))
        .route("/ws/lobby", get(lobby_websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Postgres when a database URL is configured, in-memory otherwise
pub async fn build_repository(
    config: &ServerConfig,
) -> Result<Arc<dyn SessionRepository>, session::StoreError> {
    match &config.database_url {
        Some(url) => {
            info!("Using PostgreSQL session store");
            Ok(Arc::new(PostgresSessionRepository::connect(url).await?))
        }
        None => {
            warn!("DATABASE_URL not set, sessions are kept in memory");
            Ok(Arc::new(InMemorySessionRepository::new()))
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Received shutdown signal");
}
