use async_trait::async_trait;
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant};
use tracing::{debug, trace};

use super::connection::{Connection, Outbound};
use crate::config::ConnectionConfig;

/// Handler for incoming WebSocket text frames
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle one text frame received on `connection`
    async fn handle_message(&self, connection: &Connection, message: &str);
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SocketError {
    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    #[error("no frame received within {0:?}")]
    ReadTimeout(Duration),

    #[error("write did not complete within {0:?}")]
    WriteTimeout(Duration),

    #[error("binary frames are not supported")]
    UnsupportedFrame,
}

/// Reads frames until the peer goes away, handing text frames to `handler`
///
/// Any inbound frame, including pongs, resets the liveness deadline.
/// Returns `Ok` on a clean close.
pub async fn read_loop<S, E>(
    stream: &mut S,
    connection: &Connection,
    handler: &dyn MessageHandler,
    pong_wait: Duration,
) -> Result<(), SocketError>
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let frame = timeout(pong_wait, stream.next())
            .await
            .map_err(|_| SocketError::ReadTimeout(pong_wait))?;

        match frame {
            Some(Ok(Message::Text(text))) => handler.handle_message(connection, &text).await,
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                trace!(connection_id = %connection.id(), "Keep-alive frame");
            }
            Some(Ok(Message::Binary(_))) => return Err(SocketError::UnsupportedFrame),
            Some(Ok(Message::Close(_))) | None => return Ok(()),
            Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
        }
    }
}

/// Drains the outbound queue into `sink` and pings on a fixed period
///
/// When the queue closes, whatever was queued is written first, then a
/// close frame. Every write is bounded by `write_wait`.
pub async fn write_loop<K>(
    sink: &mut K,
    mut outbound: mpsc::Receiver<Outbound>,
    ping_interval: Duration,
    write_wait: Duration,
) -> Result<(), SocketError>
where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    let mut ping = interval_at(Instant::now() + ping_interval, ping_interval);

    loop {
        tokio::select! {
            message = outbound.recv() => match message {
                Some(text) => send_with_deadline(sink, Message::Text(text.to_string()), write_wait).await?,
                None => {
                    // Peer may already be gone; the close frame is best effort
                    let _ = send_with_deadline(sink, Message::Close(None), write_wait).await;
                    return Ok(());
                }
            },
            _ = ping.tick() => {
                send_with_deadline(sink, Message::Ping(Vec::new()), write_wait).await?;
            }
        }
    }
}

async fn send_with_deadline<K>(
    sink: &mut K,
    message: Message,
    write_wait: Duration,
) -> Result<(), SocketError>
where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    timeout(write_wait, sink.send(message))
        .await
        .map_err(|_| SocketError::WriteTimeout(write_wait))?
        .map_err(|e| SocketError::SendFailed(e.to_string()))
}

/// Runs one upgraded socket until either direction finishes
///
/// The caller owns detaching the connection afterwards; detaching closes
/// the outbound queue, so nothing is left writing to a dead socket.
pub async fn run_connection<T, E>(
    socket: T,
    connection: Arc<Connection>,
    outbound: mpsc::Receiver<Outbound>,
    handler: Arc<dyn MessageHandler>,
    config: &ConnectionConfig,
) -> Result<(), SocketError>
where
    T: Stream<Item = Result<Message, E>> + Sink<Message, Error = E>,
    E: Display,
{
    let (mut sink, mut stream) = socket.split();

    let result = tokio::select! {
        read = read_loop(&mut stream, &connection, handler.as_ref(), config.pong_wait) => read,
        write = write_loop(&mut sink, outbound, config.ping_interval, config.write_wait) => write,
    };

    debug!(
        connection_id = %connection.id(),
        user_id = %connection.user_id(),
        clean = result.is_ok(),
        "Connection loop finished"
    );
    result
}
