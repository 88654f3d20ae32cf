//! Core handler infrastructure: the per-line context and the dispatcher.

mod context;
mod dispatch;

pub use context::Context;
pub use dispatch::{Dispatcher, Handler};
