//! Server-to-client line rendering.
//!
//! Broadcast lines share one shape, `[<address>]<name>:<body>`, whether the
//! body is chat text or a presence notice. Private replies are bare text.

use std::fmt::Display;

/// Body of the broadcast sent when a session comes online.
pub const ONLINE: &str = "online";

/// Body of the broadcast sent when a session goes offline.
pub const OFFLINE: &str = "offline";

/// Reply to a `rename|` line with the wrong shape.
pub const RENAME_USAGE: &str = "usage: rename|<new name>";

/// Sent before disconnecting a client that exceeded the flood limit.
pub const EXCESS_FLOOD: &str = "excess flood";

/// Sent before disconnecting a client that stayed silent too long.
pub const IDLE_TIMEOUT: &str = "idle timeout";

/// A broadcast line attributed to a session.
pub fn chat(addr: impl Display, name: &str, body: &str) -> String {
    format!("[{addr}]{name}:{body}")
}

/// Body of the broadcast announcing a rename.
pub fn renamed(old: &str, new: &str) -> String {
    format!("[{old}] renamed to [{new}]")
}

/// First line of a `who` reply.
pub fn who_header(count: usize) -> String {
    format!("online users ({count}):")
}

/// One entry of a `who` reply.
pub fn who_entry(addr: impl Display, name: &str) -> String {
    format!("[{addr}]{name} online")
}

/// Private confirmation of a successful rename.
pub fn rename_ok(new: &str) -> String {
    format!("you are now known as {new}")
}

/// Private notice that the requested name belongs to someone else.
pub fn name_taken(name: &str) -> String {
    format!("name {name} is already taken")
}

/// Private notice that the requested name is reserved.
pub fn name_reserved(name: &str) -> String {
    format!("name {name} is reserved")
}

/// Private notice for a dropped oversized line.
pub fn line_too_long(limit: usize) -> String {
    format!("line too long (limit {limit} bytes)")
}

/// Private notice for a dropped line that was not UTF-8.
pub const INVALID_UTF8: &str = "line is not valid utf-8";
