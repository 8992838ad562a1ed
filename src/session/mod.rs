// Public API - what other modules can use
pub use engine::SessionEngine;
pub use errors::{SessionError, StoreError};
pub use handlers::{create_session, get_session, join_session, list_sessions};
pub use lobby::SessionLobby;
pub use models::{SessionId, SessionStatus, SessionView};
pub use postgres::PostgresSessionRepository;
pub use repository::{InMemorySessionRepository, SessionRepository};

pub mod engine;
pub mod errors;
mod handlers;
pub mod lobby;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod types;
