mod cli;
mod console;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use parley::prelude::*;

use crate::cli::{Cli, TransportKind};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let config = cli.server_config();
    match cli.transport {
        TransportKind::Tcp => serve::<TcpTransport>(&cli.listen, config).await,
        TransportKind::Ws => serve::<WebSocketTransport>(&cli.listen, config).await,
    }
}

async fn serve<T>(listen: &str, config: ServerConfig) -> Result<()>
where
    T: Transport<Error = TransportError>,
    T::Connection: Connection<Error = TransportError>,
{
    let server = ParleyServerBuilder::new()
        .bind(listen)
        .config(config)
        .build::<T>()
        .await
        .with_context(|| format!("failed to listen on {listen}"))?;

    tracing::info!(
        addr = %server.local_addr()?,
        delivery = ?server.config().delivery,
        "Starting chat server"
    );

    tokio::spawn(console::run(server.registry()));
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to install ctrl-c handler");
            }
        })
        .await?;
    Ok(())
}
