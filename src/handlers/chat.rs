//! Plain lines: broadcast to everyone.

use super::{Context, Handler, HandlerResult};
use crate::state::Broadcast;
use linechat_proto::Command;

/// Broadcasts the line under the sender's current name.
pub struct ChatHandler;

impl Handler for ChatHandler {
    fn handle(&self, ctx: &Context<'_>, cmd: &Command<'_>) -> HandlerResult {
        let Command::Chat(body) = cmd else {
            return Ok(());
        };
        ctx.broadcast(Broadcast::Chat {
            name: ctx.session.name(),
            addr: ctx.session.addr(),
            body: (*body).to_string(),
        })
    }
}
