pub mod actions;
pub mod assertions;
pub mod clients;
pub mod setup;
pub mod store;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{DirectoryAssertion, MessageAssertion, MessageContent};
#[allow(unused_imports)]
pub use clients::RecordingClient;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
#[allow(unused_imports)]
pub use store::ControlledRepository;
