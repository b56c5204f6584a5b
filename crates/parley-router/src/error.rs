//! Error types for the routing layer.

use parley_session::{SessionError, SessionId};

/// A request that is not valid in the sender's current session state.
///
/// Ordinary validation failures (bad nickname, unknown recipient) are not
/// errors: they produce a reply string. These are protocol misuse that a
/// well-behaved client never triggers.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// List, Chat or Broadcast before a successful handshake.
    #[error("session {0} has not set a nickname yet")]
    NotAuthenticated(SessionId),

    /// A second Handshake after one already succeeded.
    #[error("session {0} already has a nickname")]
    AlreadyAuthenticated(SessionId),

    /// Any request other than Disconnect after the session ended.
    #[error("session {0} is terminated")]
    Terminated(SessionId),
}

impl RouteError {
    /// HTTP-style status code sent to the client in an error frame.
    pub fn code(&self) -> u16 {
        match self {
            Self::NotAuthenticated(_) => 403,
            Self::AlreadyAuthenticated(_) => 409,
            Self::Terminated(_) => 410,
        }
    }
}

impl TryFrom<SessionError> for RouteError {
    type Error = SessionError;

    /// Converts the state-related registry errors; nickname errors are
    /// handed back because they are not route errors.
    fn try_from(err: SessionError) -> Result<Self, Self::Error> {
        match err {
            SessionError::AlreadyAuthenticated(id) => {
                Ok(Self::AlreadyAuthenticated(id))
            }
            SessionError::Terminated(id) => Ok(Self::Terminated(id)),
            other => Err(other),
        }
    }
}
