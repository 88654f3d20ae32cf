//! Command handler context.

use crate::error::{HandlerError, HandlerResult};
use crate::state::{Broadcast, Matrix, Session};
use std::sync::Arc;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The session the line was read from.
    pub session: &'a Arc<Session>,
    /// Shared server state.
    pub matrix: &'a Matrix,
}

impl<'a> Context<'a> {
    pub fn new(session: &'a Arc<Session>, matrix: &'a Matrix) -> Self {
        Self { session, matrix }
    }

    /// Queue a private line for the invoking session only.
    pub fn reply(&self, text: impl Into<String>) {
        // A closed mailbox means the read loop is about to notice the
        // disconnect; nothing to do here.
        let _ = self.session.reply(text);
    }

    /// Hand a message to the broadcaster.
    pub fn broadcast(&self, message: Broadcast) -> HandlerResult {
        if self.matrix.broadcaster.send(message) {
            Ok(())
        } else {
            Err(HandlerError::BroadcasterClosed)
        }
    }
}
