//! `rename|<name>`: change the sender's display name.

use super::{Context, Handler, HandlerError, HandlerResult};
use crate::state::Broadcast;
use linechat_proto::{Command, notice};
use std::net::SocketAddr;
use tracing::info;

/// Renames the invoking session, atomically with respect to other renames.
pub struct RenameHandler;

impl Handler for RenameHandler {
    fn handle(&self, ctx: &Context<'_>, cmd: &Command<'_>) -> HandlerResult {
        let Command::Rename(new_name) = *cmd else {
            return Err(HandlerError::MalformedRename);
        };

        // Address-shaped names belong to freshly connected sessions.
        if new_name.parse::<SocketAddr>().is_ok() {
            return Err(HandlerError::ReservedName(new_name.to_string()));
        }

        let registry = &ctx.matrix.registry;
        // Cheap rejection under the shared lock; `rename` re-checks under the
        // exclusive one.
        if registry.lookup(new_name) {
            return Err(HandlerError::NameTaken(new_name.to_string()));
        }

        let old_name = ctx.session.name();
        if !registry.rename(&old_name, new_name) {
            crate::metrics::record_rename_conflict();
            return Err(HandlerError::NameTaken(new_name.to_string()));
        }

        info!(
            session = %ctx.session.id(),
            old = %old_name,
            new = %new_name,
            "Session renamed"
        );
        ctx.reply(notice::rename_ok(new_name));
        // The rename is already applied; with the broadcaster gone (shutdown)
        // the notice is lost but the directory stays consistent.
        ctx.broadcast(Broadcast::Renamed {
            old: old_name,
            new: new_name.to_string(),
            addr: ctx.session.addr(),
        })
    }
}
