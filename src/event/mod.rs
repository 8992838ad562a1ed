// Session events and the seam through which committed events leave the engine

// Public API - what other modules can use
pub use events::SessionEvent;
pub use handler::{EventError, EventHandler, NoOpEventHandler};

// Internal modules
mod events;
mod handler;
