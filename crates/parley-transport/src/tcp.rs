//! Raw TCP transport: one frame per `\n`-terminated line.
//!
//! Framing is done by `tokio-util`'s [`LinesCodec`]. Each frame must be
//! valid UTF-8 and must not contain a newline; the JSON codec used by the
//! server already guarantees both. Blank lines are skipped so a client
//! typing into `nc` by hand does not produce decode errors.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Longest line (in bytes, excluding the terminator) a peer may send.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// A line-delimited TCP [`Transport`].
pub struct TcpTransport {
    listener: Option<TcpListener>,
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn bind(addr: &str) -> Result<Self, Self::Error> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP line transport listening");
        Ok(Self {
            listener: Some(listener),
        })
    }

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .as_ref()
            .ok_or(TransportError::Shutdown)?
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        // Chat frames are small and latency-sensitive.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%addr, error = %e, "failed to set TCP_NODELAY");
        }

        let id = ConnectionId::next();
        tracing::debug!(%id, %addr, "accepted TCP connection");

        let (read, write) = stream.into_split();
        Ok(TcpConnection {
            id,
            peer: addr,
            reader: Mutex::new(FramedRead::new(
                read,
                LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
            )),
            writer: Mutex::new(FramedWrite::new(write, LinesCodec::new())),
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener
            .as_ref()
            .ok_or(TransportError::Shutdown)?
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }

    /// Closes the listening socket. Idempotent.
    async fn shutdown(&mut self) -> Result<(), Self::Error> {
        if self.listener.take().is_some() {
            tracing::info!("TCP line transport stopped listening");
        }
        Ok(())
    }
}

/// A single line-delimited TCP connection.
pub struct TcpConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<FramedRead<OwnedReadHalf, LinesCodec>>,
    writer: Mutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let line = std::str::from_utf8(data).map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e,
            ))
        })?;
        if line.contains('\n') {
            return Err(TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "frame contains a newline",
            )));
        }
        self.writer
            .lock()
            .await
            .send(line)
            .await
            .map_err(lines_error)
            .map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut reader = self.reader.lock().await;
        loop {
            match reader.next().await {
                Some(Ok(line)) if line.trim().is_empty() => continue,
                Some(Ok(line)) => return Ok(Some(line.into_bytes())),
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(lines_error(e)));
                }
                None => return Ok(None),
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        let mut writer = self.writer.lock().await;
        SinkExt::<&str>::close(&mut *writer)
            .await
            .map_err(lines_error)
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

fn lines_error(err: LinesCodecError) -> std::io::Error {
    match err {
        LinesCodecError::Io(e) => e,
        LinesCodecError::MaxLineLengthExceeded => std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("line exceeds {MAX_LINE_LENGTH} bytes"),
        ),
    }
}
