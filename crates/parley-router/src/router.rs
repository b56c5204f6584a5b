//! The router: one request in, one [`Outcome`] out.
//!
//! Routing is synchronous and holds no state of its own. Everything it
//! reads or changes lives in the sender's [`Session`] and the shared
//! [`SessionRegistry`], so any number of connection tasks can route
//! concurrently.

use std::sync::Arc;

use parley_protocol::Message;
use parley_session::{Session, SessionRegistry, SessionState};

use crate::{replies, RouteError};

/// Text queued for one recipient's mailbox.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub target: Arc<Session>,
    pub text: String,
}

/// What happened as a result of routing one request.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Text for the sender, if the request gets a reply.
    pub reply: Option<String>,
    /// Texts for other sessions' mailboxes (the sender's own, for
    /// broadcasts). Not yet enqueued; see [`Outcome::deliver`].
    pub deliveries: Vec<Delivery>,
    /// The sender asked to disconnect; the connection should close.
    pub close: bool,
}

impl Outcome {
    fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            ..Self::default()
        }
    }

    /// Enqueues every delivery on its target's mailbox.
    ///
    /// Targets that terminated since routing silently drop the text.
    pub fn deliver(&self) {
        for delivery in &self.deliveries {
            delivery.target.enqueue(delivery.text.as_str());
        }
    }
}

/// Routes `message` from `session`.
///
/// Disconnect is accepted in every state. Everything else requires the
/// state the message table prescribes: Handshake only before login, the
/// rest only after.
///
/// # Errors
/// Returns a [`RouteError`] when the request is not allowed in the
/// session's current state. Session and registry are unchanged.
pub fn route(
    session: &Arc<Session>,
    message: Message,
    registry: &SessionRegistry,
) -> Result<Outcome, RouteError> {
    tracing::debug!(
        session_id = %session.id(),
        kind = message.kind(),
        "routing message"
    );

    match message {
        Message::Disconnect => Ok(disconnect(session, registry)),
        Message::Handshake { name } => handshake(session, &name, registry),
        Message::List => {
            sender_nickname(session)?;
            Ok(Outcome::reply(replies::online_users(&registry.snapshot())))
        }
        Message::Chat { destination, body } => {
            let sender = sender_nickname(session)?;
            Ok(chat(&sender, &destination, &body, registry))
        }
        Message::Broadcast { body } => {
            let sender = sender_nickname(session)?;
            Ok(broadcast(&sender, &body, registry))
        }
    }
}

fn handshake(
    session: &Arc<Session>,
    name: &str,
    registry: &SessionRegistry,
) -> Result<Outcome, RouteError> {
    match registry.register(session, name) {
        Ok(()) => Ok(Outcome::reply(replies::name_set(name))),
        Err(err) if err.is_invalid_nickname() => {
            tracing::debug!(
                session_id = %session.id(),
                name,
                reason = %err,
                "handshake rejected"
            );
            Ok(Outcome::reply(replies::INVALID_NAME))
        }
        Err(err) => Err(RouteError::try_from(err)
            .unwrap_or(RouteError::NotAuthenticated(session.id()))),
    }
}

fn chat(
    sender: &str,
    destination: &str,
    body: &str,
    registry: &SessionRegistry,
) -> Outcome {
    match registry.lookup(destination) {
        Some(target) => Outcome {
            reply: Some(replies::MESSAGE_SENT.to_owned()),
            deliveries: vec![Delivery {
                target,
                text: replies::direct(sender, body),
            }],
            close: false,
        },
        None => {
            tracing::debug!(sender, destination, "chat to unknown recipient");
            Outcome::reply(replies::INVALID_RECIPIENT)
        }
    }
}

fn broadcast(sender: &str, body: &str, registry: &SessionRegistry) -> Outcome {
    let text = replies::broadcast(sender, body);
    let deliveries = registry
        .sessions()
        .into_iter()
        .map(|target| Delivery {
            target,
            text: text.clone(),
        })
        .collect();
    Outcome {
        reply: Some(replies::BROADCAST_SENT.to_owned()),
        deliveries,
        close: false,
    }
}

fn disconnect(session: &Session, registry: &SessionRegistry) -> Outcome {
    registry.unregister(session);
    session.terminate();
    tracing::info!(
        session_id = %session.id(),
        nickname = session.nickname().as_deref().unwrap_or("-"),
        "client disconnected"
    );
    Outcome {
        close: true,
        ..Outcome::default()
    }
}

/// The sender's nickname, if it is allowed to chat.
fn sender_nickname(session: &Session) -> Result<String, RouteError> {
    match (session.state(), session.nickname()) {
        (SessionState::Authenticated, Some(nickname)) => Ok(nickname),
        (SessionState::Terminated, _) => {
            Err(RouteError::Terminated(session.id()))
        }
        _ => Err(RouteError::NotAuthenticated(session.id())),
    }
}

// =========================================================================
// Tests
// =========================================================================
