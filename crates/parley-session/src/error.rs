//! Error types for the session layer.

use crate::SessionId;

/// Errors that can occur while registering a session.
///
/// The first two are ordinary user mistakes (the client is told to pick
/// another name); the last two mean the caller tried an operation the
/// session's state does not allow.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The requested nickname is the empty string.
    #[error("nickname must not be empty")]
    EmptyNickname,

    /// Another live session already holds this nickname.
    #[error("nickname {0:?} is already taken")]
    NicknameTaken(String),

    /// The session has already completed a handshake.
    #[error("session {0} is already authenticated")]
    AlreadyAuthenticated(SessionId),

    /// The session has disconnected and can never be registered again.
    #[error("session {0} is terminated")]
    Terminated(SessionId),
}

impl SessionError {
    /// Returns `true` for errors caused by the nickname itself (as opposed
    /// to the session's state), i.e. the ones a client can fix by retrying
    /// with another name.
    pub fn is_invalid_nickname(&self) -> bool {
        matches!(self, Self::EmptyNickname | Self::NicknameTaken(_))
    }
}
