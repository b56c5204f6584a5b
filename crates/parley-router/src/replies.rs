//! The exact texts the chat service sends back.
//!
//! Console clients print these verbatim and some match on them (a client
//! knows it is logged in once it sees [`NAME_SET_PREFIX`]), so they are
//! part of the protocol.

/// Prefix of the successful handshake reply: `"Name set: <name>"`.
pub const NAME_SET_PREFIX: &str = "Name set: ";

/// Reply to a rejected handshake (empty or taken nickname).
pub const INVALID_NAME: &str = "Invalid name, try again:";

/// Prefix of the list reply. Three spaces, as clients expect.
pub const ONLINE_USERS_PREFIX: &str = "Online users:   ";

/// Separator between nicknames in the list reply.
pub const ONLINE_USERS_SEPARATOR: &str = ",  ";

/// Reply to a chat whose destination was online.
pub const MESSAGE_SENT: &str = "Message sent";

/// Reply to a chat whose destination was not online.
pub const INVALID_RECIPIENT: &str = "Invalid recipient";

/// Reply to a broadcast.
pub const BROADCAST_SENT: &str = "Broadcast sent";

/// Greeting sent when a connection opens.
pub const ENTER_NICKNAME: &str = "Enter your nickname:";

pub fn name_set(nickname: &str) -> String {
    format!("{NAME_SET_PREFIX}{nickname}")
}

pub fn online_users(nicknames: &[String]) -> String {
    format!("{ONLINE_USERS_PREFIX}{}", nicknames.join(ONLINE_USERS_SEPARATOR))
}

/// Mailbox text for a direct message.
pub fn direct(sender: &str, body: &str) -> String {
    format!("User {sender} tells you: \"{body}\"")
}

/// Mailbox text for a broadcast.
pub fn broadcast(sender: &str, body: &str) -> String {
    format!("User {sender} broadcast to everybody: \"{body}\"")
}
