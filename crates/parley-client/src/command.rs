//! Console command grammar.
//!
//! ```text
//! (logged out)  <name> ...            → Handshake { name }
//! send <nick> <text...>               → Chat
//! broad <text...>                     → Broadcast
//! ls                                  → List
//! disconnect                          → Disconnect
//! ```
//!
//! Before login every non-empty line is a nickname attempt, so its first
//! word becomes the handshake name whatever it is.

use parley_protocol::Message;

use crate::CommandError;

/// Turns one console line into a request.
///
/// # Errors
/// [`CommandError::Empty`] for a blank line, [`CommandError::Malformed`]
/// for anything that is not a command (or lacks its arguments) once
/// logged in.
pub fn parse_command(line: &str, authenticated: bool) -> Result<Message, CommandError> {
    let (command, rest) = next_word(line).ok_or(CommandError::Empty)?;

    if !authenticated {
        return Ok(Message::Handshake {
            name: command.to_string(),
        });
    }

    match command {
        "send" => {
            let (destination, body) = next_word(rest).ok_or(CommandError::Malformed)?;
            let body = body.trim();
            if body.is_empty() {
                return Err(CommandError::Malformed);
            }
            Ok(Message::Chat {
                destination: destination.to_string(),
                body: body.to_string(),
            })
        }
        "broad" => {
            let body = rest.trim();
            if body.is_empty() {
                return Err(CommandError::Malformed);
            }
            Ok(Message::Broadcast {
                body: body.to_string(),
            })
        }
        "ls" => Ok(Message::List),
        "disconnect" => Ok(Message::Disconnect),
        _ => Err(CommandError::Malformed),
    }
}

/// Splits off the first whitespace-separated word.
fn next_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    Some(match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], &s[end..]),
        None => (s, ""),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_logged_out_first_word_is_name() {
        assert_eq!(
            parse_command("ann and some more", false),
            Ok(Message::Handshake { name: "ann".into() })
        );
    }

    #[test]
    fn test_parse_command_logged_out_keywords_are_names_too() {
        assert_eq!(
            parse_command("ls", false),
            Ok(Message::Handshake { name: "ls".into() })
        );
    }

    #[test]
    fn test_parse_command_blank_is_empty() {
        assert_eq!(parse_command("", false), Err(CommandError::Empty));
        assert_eq!(parse_command("   \t", true), Err(CommandError::Empty));
    }

    #[test]
    fn test_parse_command_send_keeps_body_spacing() {
        assert_eq!(
            parse_command("send bob hello   there ", true),
            Ok(Message::Chat {
                destination: "bob".into(),
                body: "hello   there".into(),
            })
        );
    }

    #[test]
    fn test_parse_command_send_without_body_is_malformed() {
        assert_eq!(parse_command("send bob", true), Err(CommandError::Malformed));
        assert_eq!(parse_command("send", true), Err(CommandError::Malformed));
    }

    #[test]
    fn test_parse_command_broad() {
        assert_eq!(
            parse_command("broad hi all", true),
            Ok(Message::Broadcast {
                body: "hi all".into()
            })
        );
        assert_eq!(parse_command("broad", true), Err(CommandError::Malformed));
    }

    #[test]
    fn test_parse_command_ls_and_disconnect() {
        assert_eq!(parse_command("ls", true), Ok(Message::List));
        assert_eq!(parse_command("  disconnect ", true), Ok(Message::Disconnect));
    }

    #[test]
    fn test_parse_command_unknown_is_malformed() {
        assert_eq!(parse_command("shout hi", true), Err(CommandError::Malformed));
    }
}
