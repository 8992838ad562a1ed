// Library crate for the session coordinator
// This file exposes the public API for the binary and integration tests

pub mod auth;
pub mod config;
pub mod event;
pub mod server;
pub mod session;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::{ConnectionConfig, ServerConfig};
pub use event::{EventHandler, SessionEvent};
pub use session::{SessionEngine, SessionError, SessionLobby, SessionRepository};
pub use shared::{AppError, AppState};
pub use websockets::{Connection, DirectoryBroadcaster, MessageHandler, RoomManager, WebSocketMessage};
