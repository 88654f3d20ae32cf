//! Command dispatch.
//!
//! The `Dispatcher` maps each command kind to its handler and wraps every
//! invocation in a tracing span and a latency timer.

use super::context::Context;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{ChatHandler, RenameHandler, WhoHandler};
use crate::telemetry::CommandTimer;
use linechat_proto::Command;
use std::collections::HashMap;
use tracing::{Level, debug, span};

/// A command handler.
///
/// Handlers run on the connection's read task and must not block: they may
/// take the registry lock briefly and push into mailboxes, nothing more.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &Context<'_>, cmd: &Command<'_>) -> HandlerResult;
}

/// Registry of command handlers.
pub struct Dispatcher {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Dispatcher {
    /// Create a dispatcher with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();
        handlers.insert(Command::Who.name(), Box::new(WhoHandler));
        handlers.insert(Command::MalformedRename.name(), Box::new(RenameHandler));
        handlers.insert(Command::Chat("").name(), Box::new(ChatHandler));
        Self { handlers }
    }

    /// Classify one line and run its handler.
    ///
    /// Empty lines are ignored.
    pub fn dispatch(&self, ctx: &Context<'_>, line: &str) -> HandlerResult {
        let cmd = Command::parse(line);
        if cmd == Command::Empty {
            return Ok(());
        }

        let cmd_name = cmd.name();
        let handler = self
            .handlers
            .get(cmd_name)
            .ok_or(HandlerError::UnknownCommand(cmd_name))?;

        let cmd_span = span!(
            Level::DEBUG,
            "command",
            command = cmd_name,
            session = %ctx.session.id(),
            addr = %ctx.session.addr(),
        );
        let _entered = cmd_span.enter();
        let _timer = CommandTimer::new(cmd_name);

        let result = handler.handle(ctx, &cmd);
        if let Err(ref e) = result {
            crate::metrics::record_command_error(cmd_name, e.error_code());
            debug!(command = cmd_name, error = %e, "Command error");
        }
        result
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
