//! Message routing for Parley.
//!
//! [`route`] interprets one decoded [`Message`](parley_protocol::Message)
//! from one session against the shared
//! [`SessionRegistry`](parley_session::SessionRegistry) and returns an
//! [`Outcome`]: the reply for the sender, the texts to push into other
//! sessions' mailboxes, and whether the connection should close.
//!
//! # Key items
//!
//! - [`route`]: the dispatch function
//! - [`Outcome`] / [`Delivery`]: what routing produced
//! - [`RouteError`]: a request not allowed in the session's state
//! - [`replies`]: the exact reply and mailbox texts

mod error;
pub mod replies;
mod router;

pub use error::RouteError;
pub use router::{route, Delivery, Outcome};
