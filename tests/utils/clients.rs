#![allow(dead_code)] // Test utilities may not all be used in every test

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use boardroom::websockets::{Connection, Outbound};

// ============================================================================
// Recording Clients
// ============================================================================

/// A live connection whose outbound queue the test reads directly
///
/// Stands in for the socket write loop: whatever the server queues for this
/// connection can be consumed in order.
pub struct RecordingClient {
    pub connection: Arc<Connection>,
    receiver: Mutex<mpsc::Receiver<Outbound>>,
}

impl RecordingClient {
    pub fn new(user_id: &str, capacity: usize) -> Self {
        let (connection, receiver) = Connection::new(user_id, capacity);
        Self {
            connection,
            receiver: Mutex::new(receiver),
        }
    }

    pub fn user_id(&self) -> &str {
        self.connection.user_id()
    }

    /// Next queued frame, if one is already waiting
    pub async fn consume_message(&self) -> Option<String> {
        self.receiver
            .lock()
            .await
            .try_recv()
            .ok()
            .map(|frame| frame.to_string())
    }

    /// Every frame queued so far, in order
    pub async fn drain_messages(&self) -> Vec<String> {
        let mut receiver = self.receiver.lock().await;
        let mut frames = Vec::new();
        while let Ok(frame) = receiver.try_recv() {
            frames.push(frame.to_string());
        }
        frames
    }

    /// True once the queue is closed and fully drained
    pub async fn is_closed(&self) -> bool {
        matches!(
            self.receiver.lock().await.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        )
    }
}
