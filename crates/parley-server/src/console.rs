//! Operator console on stdin.
//!
//! `show` prints how many clients are logged in, then one nickname per
//! line in login order.

use std::sync::Arc;

use parley::prelude::SessionRegistry;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Reads commands from stdin until it closes.
pub async fn run(registry: Arc<SessionRegistry>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match line.trim() {
                "" => {}
                "show" => print!("{}", show(&registry.snapshot())),
                other => tracing::warn!(command = other, "unknown console command"),
            },
            Ok(None) => {
                tracing::debug!("console input closed");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "console read failed");
                return;
            }
        }
    }
}

fn show(nicknames: &[String]) -> String {
    let mut out = format!("number of clients logged in = {}\n", nicknames.len());
    for nickname in nicknames {
        out.push_str(nickname);
        out.push('\n');
    }
    out
}
