//! Unified error handling for linechat.
//!
//! Command errors never end a session: each maps to a private notice for the
//! sender (or to nothing, for internal failures) and a metrics label.

use linechat_proto::notice;
use thiserror::Error;

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("malformed rename request")]
    MalformedRename,

    #[error("name is reserved: {0}")]
    ReservedName(String),

    #[error("name already taken: {0}")]
    NameTaken(String),

    #[error("broadcaster is not running")]
    BroadcasterClosed,

    #[error("no handler for command: {0}")]
    UnknownCommand(&'static str),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedRename => "malformed_rename",
            Self::ReservedName(_) => "reserved_name",
            Self::NameTaken(_) => "name_taken",
            Self::BroadcasterClosed => "broadcaster_closed",
            Self::UnknownCommand(_) => "unknown_command",
        }
    }

    /// Convert to the private notice sent back to the originating session.
    ///
    /// Returns `None` for errors that don't warrant a client-visible reply.
    pub fn to_reply(&self) -> Option<String> {
        match self {
            Self::MalformedRename => Some(notice::RENAME_USAGE.to_string()),
            Self::ReservedName(name) => Some(notice::name_reserved(name)),
            Self::NameTaken(name) => Some(notice::name_taken(name)),
            Self::BroadcasterClosed | Self::UnknownCommand(_) => None,
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
