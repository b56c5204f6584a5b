use std::time::Duration;

use clap::{Parser, ValueEnum};
use parley::{DeliveryMode, ServerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Nickname-based text chat server")]
pub struct Cli {
    /// Address to listen on. Use port 0 for an ephemeral port.
    #[arg(long, env = "PARLEY_LISTEN", default_value = "127.0.0.1:9090")]
    pub listen: String,

    /// Wire transport clients connect with.
    #[arg(long, env = "PARLEY_TRANSPORT", value_enum, default_value_t = TransportKind::Tcp)]
    pub transport: TransportKind,

    /// Deliver mail every N milliseconds instead of immediately.
    #[arg(long, env = "PARLEY_POLL_MS")]
    pub poll_ms: Option<u64>,

    /// Prompt sent to each client on connect.
    #[arg(long, env = "PARLEY_GREETING")]
    pub greeting: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    /// Newline-delimited JSON over plain TCP
    Tcp,
    /// JSON frames over WebSocket
    Ws,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::default();
        if let Some(ms) = self.poll_ms {
            config.delivery = DeliveryMode::Poll(Duration::from_millis(ms.max(1)));
        }
        if let Some(greeting) = &self.greeting {
            config.greeting = greeting.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["parley-server"]).unwrap();

        assert_eq!(cli.listen, "127.0.0.1:9090");
        assert_eq!(cli.transport, TransportKind::Tcp);
        let config = cli.server_config();
        assert_eq!(config.delivery, DeliveryMode::Push);
        assert_eq!(config.greeting, "Enter your nickname:");
    }

    #[test]
    fn test_cli_poll_ms_enables_poll_delivery() {
        let cli = Cli::try_parse_from([
            "parley-server",
            "--poll-ms",
            "300",
            "--transport",
            "ws",
        ])
        .unwrap();

        assert_eq!(cli.transport, TransportKind::Ws);
        assert_eq!(
            cli.server_config().delivery,
            DeliveryMode::Poll(Duration::from_millis(300))
        );
    }

    #[test]
    fn test_cli_zero_poll_ms_is_clamped() {
        let cli =
            Cli::try_parse_from(["parley-server", "--poll-ms", "0"]).unwrap();

        assert_eq!(
            cli.server_config().delivery,
            DeliveryMode::Poll(Duration::from_millis(1))
        );
    }

    #[test]
    fn test_cli_unknown_transport_rejected() {
        assert!(
            Cli::try_parse_from(["parley-server", "--transport", "udp"])
                .is_err()
        );
    }

    #[test]
    fn test_cli_custom_greeting() {
        let cli = Cli::try_parse_from([
            "parley-server",
            "--greeting",
            "Name please:",
        ])
        .unwrap();

        assert_eq!(cli.server_config().greeting, "Name please:");
    }
}
