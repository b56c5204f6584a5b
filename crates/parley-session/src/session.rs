//! Session types: the server's record of one connected client.
//!
//! A session tracks:
//! - WHO the client is (`SessionId`, and a nickname once logged in)
//! - WHAT state it is in (unauthenticated, authenticated, terminated)
//! - WHAT is waiting to be delivered to it (its [`Mailbox`])

use std::fmt;

use parking_lot::Mutex;

use crate::Mailbox;

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Opaque, unique identifier for a session, assigned when the connection
/// is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// ```text
///   Unauthenticated ──(handshake ok)──→ Authenticated ──(disconnect)──→ Terminated
///        │   ↺ (handshake rejected)                                        ↑
///        └───────────────────────(disconnect / transport failure)──────────┘
/// ```
///
/// There is no way back out of `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no nickname yet.
    Unauthenticated,
    /// Nickname set and registered.
    Authenticated,
    /// Disconnected; the session only lingers until its handler exits.
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated => "authenticated",
            Self::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single client's session on the server.
///
/// Owned by its connection handler and shared (as `Arc<Session>`) with the
/// [`SessionRegistry`](crate::SessionRegistry) while authenticated. Every
/// method takes `&self`; the mutable parts sit behind their own locks so
/// other sessions' handlers can enqueue mail while this one is routing.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    status: Mutex<Status>,
    mailbox: Mailbox,
}

#[derive(Debug)]
struct Status {
    nickname: Option<String>,
    state: SessionState,
}

impl Session {
    /// Creates a fresh, unauthenticated session.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            status: Mutex::new(Status {
                nickname: None,
                state: SessionState::Unauthenticated,
            }),
            mailbox: Mailbox::new(),
        }
    }

    /// The session's identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The nickname, once a handshake has succeeded.
    ///
    /// Still returned after termination so log lines can name the user.
    pub fn nickname(&self) -> Option<String> {
        self.status.lock().nickname.clone()
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.status.lock().state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn is_terminated(&self) -> bool {
        self.state() == SessionState::Terminated
    }

    /// The session's outbound mailbox.
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Queues `text` for delivery to this session's client.
    ///
    /// A no-op once the session is terminated: delivery is best-effort.
    pub fn enqueue(&self, text: impl Into<String>) {
        let text = text.into();
        if self.mailbox.enqueue(text.as_str()) {
            tracing::trace!(session_id = %self.id, %text, "enqueued");
        } else {
            tracing::trace!(
                session_id = %self.id,
                %text,
                "dropped mail for terminated session"
            );
        }
    }

    /// Removes and returns the oldest undelivered text.
    pub fn drain_one(&self) -> Option<String> {
        self.mailbox.drain_one()
    }

    /// Moves the session to `Terminated` and closes its mailbox.
    ///
    /// Idempotent. Does not touch the registry; callers unregister first
    /// (see [`SessionRegistry::unregister`](crate::SessionRegistry::unregister)).
    pub fn terminate(&self) {
        {
            let mut status = self.status.lock();
            if status.state == SessionState::Terminated {
                return;
            }
            status.state = SessionState::Terminated;
        }
        let discarded = self.mailbox.close();
        tracing::debug!(session_id = %self.id, discarded, "session terminated");
    }

    /// Applies a successful handshake. Called by the registry while it
    /// holds its own lock, after all checks have passed.
    pub(crate) fn set_authenticated(&self, nickname: &str) {
        let mut status = self.status.lock();
        status.nickname = Some(nickname.to_owned());
        status.state = SessionState::Authenticated;
    }
}
