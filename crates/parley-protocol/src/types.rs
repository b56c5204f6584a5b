//! Core protocol types for Parley's wire format.
//!
//! Two enums travel on the wire:
//!
//! - [`Message`]: what a client asks the server to do (the five request
//!   kinds).
//! - [`ServerMessage`]: what the server pushes back (replies to the
//!   sender, mailbox deliveries, prompts and errors).
//!
//! Both use serde's *internally tagged* representation, so a chat message
//! looks like `{"type":"Chat","destination":"bob","body":"hi"}` and a
//! request without fields is just `{"type":"List"}`.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Message: client → server
// ---------------------------------------------------------------------------

/// A single request from a client.
///
/// Immutable once constructed: the router consumes it by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// "Call me `name`." The login step; only valid before a nickname is set.
    Handshake { name: String },

    /// "Tell `destination` this." A direct message to one nickname.
    Chat { destination: String, body: String },

    /// "Tell everybody this." Delivered to every logged-in user, the
    /// sender included.
    Broadcast { body: String },

    /// "Who is online?"
    List,

    /// "I'm leaving." The server unregisters the sender and closes the
    /// connection without replying.
    Disconnect,
}

impl Message {
    /// Short, stable name of the variant, for logs and metrics fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Handshake { .. } => "handshake",
            Self::Chat { .. } => "chat",
            Self::Broadcast { .. } => "broadcast",
            Self::List => "list",
            Self::Disconnect => "disconnect",
        }
    }

    /// Returns `true` for [`Message::Disconnect`].
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnect)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

// ---------------------------------------------------------------------------
// ServerMessage: server → client
// ---------------------------------------------------------------------------

/// A frame the server sends to a client.
///
/// The text-bearing variants carry exactly the strings a console client
/// prints; the variant only tells the client *why* it got the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Sent once when the connection opens, e.g. `"Enter your nickname:"`.
    Prompt { text: String },

    /// The server's answer to the request the client just sent.
    Reply { text: String },

    /// A message another user (or the client itself, for broadcasts)
    /// addressed to this client, delivered from its mailbox.
    Mail { text: String },

    /// The request was not valid in the session's current state.
    ///
    /// Codes follow HTTP conventions: 403 not logged in, 409 already
    /// logged in, 410 session terminated.
    Error { code: u16, message: String },
}

impl ServerMessage {
    /// The human-readable text of this frame.
    pub fn text(&self) -> &str {
        match self {
            Self::Prompt { text } | Self::Reply { text } | Self::Mail { text } => {
                text
            }
            Self::Error { message, .. } => message,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
