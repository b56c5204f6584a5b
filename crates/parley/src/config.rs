//! Server configuration.

use std::time::Duration;

use parley_router::replies;

/// How often poll-mode delivery drains a mailbox unless configured
/// otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// How queued mail reaches a connected client.
///
/// Both modes read the same per-session mailbox; they only differ in when
/// the connection task looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// Flush as soon as something is enqueued.
    #[default]
    Push,
    /// Flush on a fixed interval.
    Poll(Duration),
}

impl DeliveryMode {
    /// Poll mode with [`DEFAULT_POLL_INTERVAL`].
    pub fn poll() -> Self {
        Self::Poll(DEFAULT_POLL_INTERVAL)
    }
}

/// Settings shared by every connection task.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Mail delivery strategy.
    pub delivery: DeliveryMode,

    /// Prompt sent as the first frame on every new connection.
    pub greeting: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryMode::Push,
            greeting: replies::ENTER_NICKNAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_pushes_and_prompts_for_nickname() {
        let config = ServerConfig::default();
        assert_eq!(config.delivery, DeliveryMode::Push);
        assert_eq!(config.greeting, "Enter your nickname:");
    }

    #[test]
    fn test_poll_uses_default_interval() {
        assert_eq!(
            DeliveryMode::poll(),
            DeliveryMode::Poll(Duration::from_millis(300))
        );
    }
}
