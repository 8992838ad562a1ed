// Public API - what other modules can use
pub use handlers::create_identity;
pub use middleware::{
    bearer_token, jwt_auth, websocket_protocol, websocket_token, WEBSOCKET_PROTOCOL_HEADER,
};
pub use token::TokenConfig;
pub use types::{Identity, IdentityClaims, TokenResponse};

// Internal modules
mod generators;
mod handlers;
mod middleware;
mod token;
mod types;
