//! Per-connection session state.
//!
//! A [`Session`] is shared between the registry, the broadcaster and the
//! connection that owns it. Its outbound side is a [`Mailbox`]: an unbounded
//! FIFO drained by the connection's writer task. Pushing never blocks, so a
//! stalled client costs memory instead of stalling the broadcaster.

use crate::state::SessionId;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One outbound line, shared between every mailbox it is delivered to.
pub type Line = Arc<str>;

/// Receiving end of a session's outbound queue.
pub type Mailbox = mpsc::UnboundedReceiver<Line>;

/// Server-side state for one connected client.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    addr: SocketAddr,
    /// Current display name. Written only by the registry while it holds
    /// its exclusive lock, so the registry key and this field never diverge
    /// for an observer going through the registry.
    name: Mutex<String>,
    mailbox: mpsc::UnboundedSender<Line>,
}

impl Session {
    /// Create a session and the mailbox its writer task will drain.
    ///
    /// The initial name is the remote address.
    pub fn new(id: SessionId, addr: SocketAddr) -> (Arc<Self>, Mailbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Arc::new(Self {
            id,
            addr,
            name: Mutex::new(addr.to_string()),
            mailbox: tx,
        });
        (session, rx)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Snapshot of the current display name.
    pub fn name(&self) -> String {
        self.name.lock().clone()
    }

    pub(super) fn set_name(&self, name: String) {
        *self.name.lock() = name;
    }

    /// Queue a line for this session's writer.
    ///
    /// Returns `false` if the writer is gone; the session is then already
    /// on its way offline and the line is dropped.
    pub fn deliver(&self, line: Line) -> bool {
        self.mailbox.send(line).is_ok()
    }

    /// Queue a private reply that no other session sees.
    pub fn reply(&self, text: impl Into<String>) -> bool {
        self.deliver(Line::from(text.into()))
    }

    /// Whether the writer side has hung up.
    pub fn is_closed(&self) -> bool {
        self.mailbox.is_closed()
    }
}
