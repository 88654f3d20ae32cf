//! `who`: private directory listing.

use super::{Context, Handler, HandlerResult};
use linechat_proto::{Command, notice};

/// Lists every online session to the requester only.
pub struct WhoHandler;

impl Handler for WhoHandler {
    fn handle(&self, ctx: &Context<'_>, _cmd: &Command<'_>) -> HandlerResult {
        // Copy out under the shared lock; the lock is gone before the reply
        // is queued.
        let entries = ctx.matrix.registry.snapshot();

        let mut listing = Vec::with_capacity(entries.len() + 1);
        listing.push(notice::who_header(entries.len()));
        listing.extend(entries.iter().map(|e| notice::who_entry(e.addr, &e.name)));

        // One mailbox entry keeps the listing contiguous even when broadcasts
        // are being delivered concurrently.
        ctx.reply(listing.join("\n"));
        Ok(())
    }
}
