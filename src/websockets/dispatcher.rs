use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::connection::{Connection, Delivery};
use super::directory::DirectoryBroadcaster;
use super::messages::{Command, WebSocketMessage};
use super::socket::MessageHandler;
use crate::session::{engine::SessionEngine, errors::SessionError, models::SessionId};

/// Routes commands from one session connection into the engine
///
/// Success is reported through the room broadcast the engine publishes;
/// failures are answered privately on the sending connection.
pub struct CommandDispatcher {
    session_id: SessionId,
    engine: Arc<SessionEngine>,
    directory: Arc<DirectoryBroadcaster>,
}

impl CommandDispatcher {
    pub fn new(
        session_id: SessionId,
        engine: Arc<SessionEngine>,
        directory: Arc<DirectoryBroadcaster>,
    ) -> Self {
        Self {
            session_id,
            engine,
            directory,
        }
    }

    async fn execute(&self, connection: &Connection, command: Command) {
        let session_id = self.session_id;
        let user_id = connection.user_id().to_string();
        let engine = Arc::clone(&self.engine);
        let directory = Arc::clone(&self.directory);

        // Runs to completion even if the connection closes meanwhile
        let task = tokio::spawn(async move {
            let outcome = match command {
                Command::Ready { is_ready } => {
                    engine.set_ready(session_id, &user_id, is_ready).await
                }
                Command::EndTurn => engine.advance_turn(session_id, &user_id).await,
            };
            if let Ok(event) = &outcome {
                if event.changes_directory() {
                    directory.refresh_logged().await;
                }
            }
            outcome
        });

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(session_id = session_id, error = %e, "Command task failed");
                reply_error(connection, "internal error");
                return;
            }
        };

        if let Err(e) = outcome {
            if !e.is_rejection() {
                error!(
                    session_id = session_id,
                    user_id = %connection.user_id(),
                    error = %e,
                    "Command failed on store fault"
                );
            }
            reply_error(connection, public_message(&e));
        }
    }
}

#[async_trait]
impl MessageHandler for CommandDispatcher {
    async fn handle_message(&self, connection: &Connection, message: &str) {
        match Command::parse(message) {
            Ok(command) => {
                info!(
                    session_id = self.session_id,
                    user_id = %connection.user_id(),
                    command = ?command,
                    "Received command"
                );
                self.execute(connection, command).await;
            }
            Err(e) => {
                warn!(
                    session_id = self.session_id,
                    user_id = %connection.user_id(),
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                reply_error(connection, e.to_string());
            }
        }
    }
}

/// Directory viewers only listen; anything they send is ignored
pub struct DirectoryViewerHandler;

#[async_trait]
impl MessageHandler for DirectoryViewerHandler {
    async fn handle_message(&self, connection: &Connection, message: &str) {
        debug!(
            connection_id = %connection.id(),
            length = message.len(),
            "Ignoring message from directory viewer"
        );
    }
}

/// Queues an error frame for one connection only
fn reply_error(connection: &Connection, message: impl Into<String>) {
    let json = match WebSocketMessage::error(message).to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to serialize error reply");
            return;
        }
    };

    if connection.offer(Arc::from(json)) != Delivery::Queued {
        debug!(connection_id = %connection.id(), "Error reply not delivered");
    }
}

/// Message for a rejected HTTP or WebSocket command, store faults hidden
pub fn public_message(error: &SessionError) -> String {
    if error.is_rejection() {
        error.to_string()
    } else {
        "internal error".to_string()
    }
}
