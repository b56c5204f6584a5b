//! Wire protocol for Parley.
//!
//! This crate defines the "language" that chat clients and the server speak:
//!
//! - **Types** ([`Message`], [`ServerMessage`]): the frames that travel on
//!   the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those frames are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the chat
//! core (sessions and routing). It knows nothing about connections or
//! nicknames; it only serializes and deserializes.
//!
//! ```text
//! Transport (bytes) → Protocol (Message) → Router (session + registry)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Message, ServerMessage};
