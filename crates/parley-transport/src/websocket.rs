//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! The WebSocket upgrade runs in its own task per peer, so a client that
//! opens a socket and never completes the handshake cannot hold up
//! [`accept`](Transport::accept) for everyone else. Finished upgrades are
//! handed back to the listener over a channel.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::{Connection, ConnectionId, Transport, TransportError};

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// How long a peer has to complete the WebSocket upgrade.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Upgraded connections waiting for `accept`.
const READY_BACKLOG: usize = 64;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: Option<TcpListener>,
    ready_tx: mpsc::Sender<WebSocketConnection>,
    ready_rx: mpsc::Receiver<WebSocketConnection>,
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn bind(addr: &str) -> Result<Self, Self::Error> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        let (ready_tx, ready_rx) = mpsc::channel(READY_BACKLOG);
        Ok(Self {
            listener: Some(listener),
            ready_tx,
            ready_rx,
        })
    }

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let listener = self.listener.as_ref().ok_or(TransportError::Shutdown)?;
        loop {
            tokio::select! {
                Some(conn) = self.ready_rx.recv() => return Ok(conn),
                accepted = listener.accept() => {
                    let (stream, addr) =
                        accepted.map_err(TransportError::AcceptFailed)?;
                    tokio::spawn(upgrade(stream, addr, self.ready_tx.clone()));
                }
            }
        }
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener
            .as_ref()
            .ok_or(TransportError::Shutdown)?
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }

    /// Closes the listening socket and drops upgrades nobody accepted.
    /// Idempotent.
    async fn shutdown(&mut self) -> Result<(), Self::Error> {
        if self.listener.take().is_some() {
            self.ready_rx.close();
            tracing::info!("WebSocket transport stopped listening");
        }
        Ok(())
    }
}

/// Performs the WebSocket upgrade for one peer and hands the connection
/// to the listener.
async fn upgrade(
    stream: TcpStream,
    peer: SocketAddr,
    ready: mpsc::Sender<WebSocketConnection>,
) {
    let handshake = tokio_tungstenite::accept_async(stream);
    let ws = match tokio::time::timeout(HANDSHAKE_TIMEOUT, handshake).await {
        Ok(Ok(ws)) => ws,
        Ok(Err(e)) => {
            tracing::debug!(%peer, error = %e, "WebSocket handshake failed");
            return;
        }
        Err(_) => {
            tracing::debug!(%peer, "WebSocket handshake timed out");
            return;
        }
    };

    let id = ConnectionId::next();
    tracing::debug!(%id, %peer, "accepted WebSocket connection");

    // Split so a pending `recv` never holds the lock a `send` needs.
    let (sink, stream) = ws.split();
    let conn = WebSocketConnection {
        id,
        peer,
        sink: Mutex::new(sink),
        stream: Mutex::new(stream),
    };
    if ready.send(conn).await.is_err() {
        tracing::debug!(%id, "transport shut down before accept");
    }
}

/// A single WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = Message::Binary(data.to_vec().into());
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(|e| self.send_error(e))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => return Err(TransportError::recv(e)),
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| self.send_error(e))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl WebSocketConnection {
    fn send_error(&self, err: WsError) -> TransportError {
        match err {
            WsError::ConnectionClosed
            | WsError::AlreadyClosed
            | WsError::Protocol(ProtocolError::SendAfterClosing) => {
                TransportError::ConnectionClosed(self.id.to_string())
            }
            other => TransportError::send(other),
        }
    }
}
