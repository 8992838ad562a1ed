// Public API
pub use connection::{Connection, ConnectionId, ConnectionSet, ConnectionState, Delivery, Outbound};
pub use directory::DirectoryBroadcaster;
pub use dispatcher::{CommandDispatcher, DirectoryViewerHandler};
pub use handler::{game_websocket_handler, lobby_websocket_handler};
pub use manager::RoomManager;
pub use messages::{Command, CommandError, MessageType, WebSocketMessage};
pub use room::Room;
pub use socket::{read_loop, run_connection, write_loop, MessageHandler, SocketError};

// Internal modules
pub mod connection;
mod directory;
mod dispatcher;
mod handler;
mod manager;
mod messages;
mod room;
mod socket;
