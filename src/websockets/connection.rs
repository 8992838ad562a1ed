use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// A serialized outbound frame, shared by every queue it is offered to
pub type Outbound = Arc<str>;

/// Lifecycle of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Attached,
    Closed,
}

/// Result of offering a message to one connection's outbound queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Queue full; this message is dropped for this connection only
    Dropped,
    Closed,
}

struct ConnectionInner {
    state: ConnectionState,
    sender: Option<mpsc::Sender<Outbound>>,
}

/// Server-side handle of one live connection
///
/// Holds the only sender of the bounded outbound queue. Closing takes the
/// sender out, so the queue closes exactly once no matter how many callers
/// race to close it; the write loop drains what is queued and then stops.
pub struct Connection {
    id: ConnectionId,
    user_id: String,
    inner: Mutex<ConnectionInner>,
}

impl Connection {
    /// Creates a connection in the `Connecting` state and its outbound receiver
    pub fn new(user_id: &str, capacity: usize) -> (Arc<Self>, mpsc::Receiver<Outbound>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let connection = Arc::new(Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            inner: Mutex::new(ConnectionInner {
                state: ConnectionState::Connecting,
                sender: Some(sender),
            }),
        });
        (connection, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> ConnectionState {
        self.inner().state
    }

    /// Connecting -> Attached; a closed connection stays closed
    pub fn mark_attached(&self) {
        let mut inner = self.inner();
        if inner.state == ConnectionState::Connecting {
            inner.state = ConnectionState::Attached;
        }
    }

    /// Non-blocking enqueue
    pub fn offer(&self, message: Outbound) -> Delivery {
        let inner = self.inner();
        let Some(sender) = inner.sender.as_ref() else {
            return Delivery::Closed;
        };

        match sender.try_send(message) {
            Ok(()) => Delivery::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Dropped,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    /// Closes the outbound queue; returns true only for the call that closed it
    pub fn close(&self) -> bool {
        let mut inner = self.inner();
        inner.state = ConnectionState::Closed;
        inner.sender.take().is_some()
    }

    fn inner(&self) -> MutexGuard<'_, ConnectionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Set of live connections with best-effort fan-out
///
/// Shared by session rooms and the directory broadcaster.
#[derive(Default)]
pub struct ConnectionSet {
    connections: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn attach(&self, connection: Arc<Connection>) {
        connection.mark_attached();
        self.connections
            .write()
            .await
            .insert(connection.id(), connection);
    }

    /// Removes the connection and closes its queue
    ///
    /// Idempotent: a second detach, racing or not, finds nothing to remove.
    pub async fn detach(&self, connection_id: ConnectionId) -> bool {
        let removed = self.connections.write().await.remove(&connection_id);
        match removed {
            Some(connection) => {
                connection.close();
                true
            }
            None => false,
        }
    }

    /// Offers one frame to every attached connection; returns how many queued it
    ///
    /// Never waits on a consumer. A full queue loses this frame and the loop
    /// moves on to the next connection.
    pub async fn offer_all(&self, message: &Outbound) -> usize {
        let connections = self.connections.read().await;
        let mut queued = 0;

        for connection in connections.values() {
            match connection.offer(Arc::clone(message)) {
                Delivery::Queued => queued += 1,
                Delivery::Dropped => warn!(
                    connection_id = %connection.id(),
                    user_id = %connection.user_id(),
                    "Outbound queue full, dropping message"
                ),
                Delivery::Closed => debug!(
                    connection_id = %connection.id(),
                    "Skipping closed connection"
                ),
            }
        }
        queued
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    pub async fn contains(&self, connection_id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&connection_id)
    }
}
