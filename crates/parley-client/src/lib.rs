//! Console client for Parley.
//!
//! - [`parse_command`]: the text grammar users type
//! - [`ClientConnection`]: a connection over TCP or WebSocket that sends
//!   [`Message`](parley_protocol::Message)s and receives
//!   [`ServerMessage`](parley_protocol::ServerMessage)s

mod command;
mod connection;
mod error;

pub use command::parse_command;
pub use connection::{ClientConnection, ClientReceiver, ClientSender};
pub use error::{ClientError, CommandError};

use parley_protocol::ServerMessage;

/// Returns `true` if `frame` confirms a successful login.
pub fn confirms_login(frame: &ServerMessage) -> bool {
    matches!(frame, ServerMessage::Reply { text } if text.starts_with("Name set:"))
}

/// What the console prints for a server frame.
pub fn render(frame: &ServerMessage) -> String {
    match frame {
        ServerMessage::Error { code, message } => format!("error {code}: {message}"),
        other => other.text().to_string(),
    }
}
