use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Timeouts and queue sizing for every WebSocket connection
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// A connection with no inbound frame for this long is closed
    pub pong_wait: Duration,
    /// Keep-alive ping period, roughly half of `pong_wait`
    pub ping_interval: Duration,
    /// Deadline for writing a single outbound frame
    pub write_wait: Duration,
    /// Largest inbound frame accepted, in bytes
    pub max_message_size: usize,
    /// Bound of each connection's outbound queue
    pub outbound_queue_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pong_wait: Duration::from_secs(60),
            ping_interval: Duration::from_secs(30),
            write_wait: Duration::from_secs(10),
            max_message_size: 512,
            outbound_queue_capacity: 256,
        }
    }
}

/// Process configuration, read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// When absent the in-memory store is used
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_expiration_days: i64,
    pub default_max_participants: i32,
    pub connection: ConnectionConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ConnectionConfig::default();
        let pong_wait = Duration::from_secs(parse_or(
            &lookup,
            "PONG_WAIT_SECS",
            defaults.pong_wait.as_secs(),
        ));
        let ping_interval = lookup("PING_INTERVAL_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(pong_wait / 2);

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, generating a per-process secret");
            generate_secret()
        });

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            jwt_secret,
            token_expiration_days: parse_or(&lookup, "TOKEN_EXPIRATION_DAYS", 7),
            default_max_participants: parse_or(&lookup, "DEFAULT_MAX_PARTICIPANTS", 4),
            connection: ConnectionConfig {
                pong_wait,
                ping_interval,
                write_wait: Duration::from_secs(parse_or(
                    &lookup,
                    "WRITE_WAIT_SECS",
                    defaults.write_wait.as_secs(),
                )),
                max_message_size: parse_or(&lookup, "MAX_MESSAGE_SIZE", defaults.max_message_size),
                outbound_queue_capacity: parse_or(
                    &lookup,
                    "OUTBOUND_QUEUE_CAPACITY",
                    defaults.outbound_queue_capacity,
                ),
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, "Invalid configuration value, using default");
            default
        }),
        None => default,
    }
}

/// 32 random bytes, base64 encoded
fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}
