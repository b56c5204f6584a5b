//! # Parley
//!
//! A nickname-based text chat server.
//!
//! Clients connect over a [`Transport`](parley_transport::Transport), pick
//! a unique nickname, and then send direct messages, broadcasts and
//! user-list requests. Every connection runs in its own task; they share
//! one [`SessionRegistry`](parley_session::SessionRegistry) and talk to
//! each other only through per-session mailboxes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parley::prelude::*;
//!
//! # async fn start() -> Result<(), ParleyError> {
//! let server = ParleyServer::builder()
//!     .bind("127.0.0.1:9090")
//!     .build::<TcpTransport>()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{DeliveryMode, ServerConfig, DEFAULT_POLL_INTERVAL};
pub use error::ParleyError;
pub use server::{ParleyServer, ParleyServerBuilder};

/// Convenient re-exports for the common case.
///
/// ```rust
/// use parley::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        DeliveryMode, ParleyError, ParleyServer, ParleyServerBuilder,
        ServerConfig,
    };

    pub use parley_protocol::{Codec, JsonCodec, Message, ServerMessage};
    pub use parley_router::{replies, RouteError};
    pub use parley_session::{Session, SessionId, SessionRegistry, SessionState};
    pub use parley_transport::{
        Connection, Transport, TransportError, TcpTransport,
        WebSocketTransport,
    };
}
