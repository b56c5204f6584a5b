//! Session bookkeeping for Parley.
//!
//! This crate owns the state that outlives a single message:
//!
//! 1. **Sessions**: one per connection ([`Session`]), with its lifecycle
//!    state and nickname
//! 2. **Mailboxes**: per-session FIFO of text waiting to be delivered
//!    ([`Mailbox`])
//! 3. **The registry**: who is logged in under which nickname
//!    ([`SessionRegistry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)  ← reads and mutates sessions and the registry per message
//!     ↕
//! Session Layer (this crate)  ← identity, uniqueness, outbound queues
//! ```
//!
//! Nothing here knows about sockets or wire formats.

mod error;
mod mailbox;
mod registry;
mod session;

pub use error::SessionError;
pub use mailbox::Mailbox;
pub use registry::SessionRegistry;
pub use session::{Session, SessionId, SessionState};
