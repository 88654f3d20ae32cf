//! State management module.
//!
//! Contains the Matrix (shared server state) and the session registry and
//! broadcast engine it is built from.

mod broadcaster;
mod matrix;
mod registry;
mod session;
mod uid;

pub use broadcaster::{Broadcast, BroadcastQueue, Broadcaster, fan_out};
pub use matrix::{Matrix, ServerInfo};
pub use registry::{DirectoryEntry, Registry};
pub use session::{Line, Mailbox, Session};
pub use uid::{SessionId, SessionIdGenerator};
