use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use parley_client::{
    ClientConnection, ClientReceiver, CommandError, confirms_login, parse_command, render,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Console client for the Parley chat server")]
struct Cli {
    /// Server address (`host:port`, or a `ws://` URL with `--transport ws`).
    #[arg(long, env = "PARLEY_SERVER", default_value = "127.0.0.1:9090")]
    server: String,

    /// Wire transport the server listens with.
    #[arg(long, value_enum, default_value_t = TransportKind::Tcp)]
    transport: TransportKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    Tcp,
    Ws,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with chat output.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("parley_client=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let conn = match cli.transport {
        TransportKind::Tcp => ClientConnection::connect_tcp(&cli.server).await,
        TransportKind::Ws => ClientConnection::connect_ws(&cli.server).await,
    }
    .with_context(|| format!("could not reach {}", cli.server))?;

    let (mut sender, receiver) = conn.split();
    let authenticated = Arc::new(AtomicBool::new(false));
    let mut listener = tokio::spawn(listen(receiver, Arc::clone(&authenticated)));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut listener => return Ok(()),
        };
        let Some(line) = line else {
            break;
        };

        match parse_command(&line, authenticated.load(Ordering::Acquire)) {
            Ok(message) => {
                let disconnect = message.is_disconnect();
                sender.send(&message).await?;
                if disconnect {
                    break;
                }
            }
            Err(CommandError::Empty) => {}
            Err(e @ CommandError::Malformed) => println!("{e}"),
        }
    }

    if let Err(e) = sender.close().await {
        tracing::debug!(error = %e, "close failed");
    }
    // Give the server a moment to close its side so trailing output prints.
    let _ = tokio::time::timeout(Duration::from_secs(1), listener).await;
    Ok(())
}

/// Prints every server frame until the connection ends.
async fn listen(mut receiver: ClientReceiver, authenticated: Arc<AtomicBool>) {
    loop {
        match receiver.recv().await {
            Ok(Some(frame)) => {
                if confirms_login(&frame) {
                    authenticated.store(true, Ordering::Release);
                }
                println!("{}", render(&frame));
            }
            Ok(None) => {
                tracing::debug!("server closed the connection");
                return;
            }
            Err(e) => {
                println!("{e}");
                return;
            }
        }
    }
}
