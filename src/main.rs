use boardroom::auth::TokenConfig;
use boardroom::config::ServerConfig;
use boardroom::server::{build_repository, build_router, shutdown_signal};
use boardroom::shared::AppState;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boardroom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting session coordinator");

    let config = ServerConfig::from_env();
    let repository = build_repository(&config).await?;

    let app_state = AppState::new(
        repository,
        TokenConfig::new(config.jwt_secret.clone(), config.token_expiration_days),
        config.connection.clone(),
        config.default_max_participants,
    );
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
