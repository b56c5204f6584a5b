//! Error types for the client.

use parley_protocol::ProtocolError;
use tokio_util::codec::LinesCodecError;

/// Why a line typed at the console could not become a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Nothing but whitespace.
    #[error("empty input")]
    Empty,

    /// Unknown command or missing arguments.
    #[error("Incorrect message format, try again:")]
    Malformed,
}

/// Errors talking to the server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Could not open the TCP connection.
    #[error("failed to connect: {0}")]
    Connect(#[source] std::io::Error),

    /// WebSocket handshake or frame error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Line framing error on the TCP transport.
    #[error("line framing error: {0}")]
    Lines(#[from] LinesCodecError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
