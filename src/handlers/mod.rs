//! Command handlers.
//!
//! A received line is classified by [`linechat_proto::Command::parse`] and
//! routed through the [`Dispatcher`] to one handler. Handlers only touch the
//! registry and the broadcaster; all connection I/O stays in the network
//! layer.

mod chat;
mod core;
mod rename;
mod who;

pub use self::core::{Context, Dispatcher, Handler};
pub use crate::error::{HandlerError, HandlerResult};
pub use chat::ChatHandler;
pub use rename::RenameHandler;
pub use who::WhoHandler;
