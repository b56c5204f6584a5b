//! `ParleyServer` builder and accept loop.
//!
//! This is the entry point for running a Parley chat server. It ties
//! together all the layers: transport → protocol → router → session.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parley_protocol::{Codec, JsonCodec};
use parley_session::SessionRegistry;
use parley_transport::{Connection, Transport, TransportError};

use crate::config::{DeliveryMode, ServerConfig};
use crate::handler::handle_connection;
use crate::ParleyError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The registry
/// synchronizes itself; nothing here needs an outer lock.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Arc<SessionRegistry>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Parley server.
///
/// # Example
///
/// ```rust,no_run
/// use parley::prelude::*;
///
/// # async fn start() -> Result<(), ParleyError> {
/// let server = ParleyServer::builder()
///     .bind("0.0.0.0:9090")
///     .delivery(DeliveryMode::poll())
///     .build::<TcpTransport>()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ParleyServerBuilder {
    bind_addr: String,
    config: ServerConfig,
}

impl ParleyServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:9090".to_string(),
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how queued mail reaches clients.
    pub fn delivery(mut self, mode: DeliveryMode) -> Self {
        self.config.delivery = mode;
        self
    }

    /// Shorthand for `delivery(DeliveryMode::Poll(interval))`.
    pub fn poll_interval(self, interval: Duration) -> Self {
        self.delivery(DeliveryMode::Poll(interval))
    }

    /// Sets the prompt sent to every new connection.
    pub fn greeting(mut self, text: impl Into<String>) -> Self {
        self.config.greeting = text.into();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the transport and returns a server ready to [`run`](ParleyServer::run).
    ///
    /// Frames are encoded with [`JsonCodec`].
    pub async fn build<T>(self) -> Result<ParleyServer<T, JsonCodec>, ParleyError>
    where
        T: Transport<Error = TransportError>,
        T::Connection: Connection<Error = TransportError>,
    {
        let transport = T::bind(&self.bind_addr).await?;

        tracing::debug!(
            addr = %self.bind_addr,
            delivery = ?self.config.delivery,
            "transport bound"
        );

        let state = Arc::new(ServerState {
            registry: Arc::new(SessionRegistry::new()),
            codec: JsonCodec,
            config: self.config,
        });

        Ok(ParleyServer { transport, state })
    }
}

impl Default for ParleyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Parley chat server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ParleyServer<T: Transport, C: Codec> {
    transport: T,
    state: Arc<ServerState<C>>,
}

impl ParleyServer<parley_transport::TcpTransport, JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ParleyServerBuilder {
        ParleyServerBuilder::new()
    }
}

impl<T, C> ParleyServer<T, C>
where
    T: Transport<Error = TransportError>,
    T::Connection: Connection<Error = TransportError>,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ParleyError> {
        Ok(self.transport.local_addr()?)
    }

    /// Returns a handle to the registry of logged-in sessions.
    ///
    /// The handle stays valid after [`run`](Self::run) takes the server,
    /// which is how the operator console reads the user list.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.state.registry)
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated; accept failures are logged and skipped.
    pub async fn run(self) -> Result<(), ParleyError> {
        self.run_until(std::future::pending()).await
    }

    /// Like [`run`](Self::run), but stops accepting once `shutdown`
    /// resolves. Connections already accepted keep their tasks.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<(), ParleyError>
    where
        F: Future<Output = ()> + Send,
    {
        tracing::info!(
            addr = ?self.transport.local_addr().ok(),
            "Parley server running"
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!(
                        online = self.state.registry.len(),
                        "Parley server shutting down"
                    );
                    self.transport.shutdown().await?;
                    return Ok(());
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }
    }
}
