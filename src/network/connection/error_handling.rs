//! Error handling utilities for connection management.
//!
//! Provides classification of codec errors and of handler errors into the
//! private notices sent back to the client.

use crate::handlers::HandlerError;
use linechat_proto::{ProtocolError, notice};

/// Classification of codec read errors for appropriate handling.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum ReadErrorAction {
    /// Recoverable: the line was dropped; tell the sender and continue.
    Reject { reply: String },
    /// I/O error - connection is broken, just log and disconnect.
    IoError,
}

/// Classify a codec error into an actionable category.
pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    match e {
        ProtocolError::LineTooLong { limit, .. } => ReadErrorAction::Reject {
            reply: notice::line_too_long(*limit),
        },
        ProtocolError::InvalidUtf8 { .. } => ReadErrorAction::Reject {
            reply: notice::INVALID_UTF8.to_string(),
        },
        // I/O, and anything the codec may report in future, ends the session
        _ => ReadErrorAction::IoError,
    }
}

/// What the read loop should do after a handler failed.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum HandlerErrorAction {
    /// Send this private notice and keep reading.
    Reply(String),
    /// Internal failure with nothing to tell the client; keep reading.
    Ignore,
    /// The broadcaster is gone; the server is going down.
    Disconnect,
}

pub(super) fn classify_handler_error(e: &HandlerError) -> HandlerErrorAction {
    if let Some(reply) = e.to_reply() {
        return HandlerErrorAction::Reply(reply);
    }
    match e {
        HandlerError::BroadcasterClosed => HandlerErrorAction::Disconnect,
        _ => HandlerErrorAction::Ignore,
    }
}
