//! # linechat-proto
//!
//! Wire protocol for the linechat broadcast service.
//!
//! The protocol is plain newline-delimited UTF-8 text. There is no framing
//! header and no length prefix: one line is one command from the client, and
//! one line is one message to the client.
//!
//! ## Features
//!
//! - [`LineCodec`]: a `tokio_util` codec for bounded, newline-terminated lines
//! - [`Command`]: classification of a received line into a client intent
//! - [`notice`]: rendering of everything the server writes back
//!
//! ## Quick Start
//!
//! ```rust
//! use linechat_proto::Command;
//!
//! assert_eq!(Command::parse("who"), Command::Who);
//! assert_eq!(Command::parse("rename|alice"), Command::Rename("alice"));
//! assert_eq!(Command::parse("hello"), Command::Chat("hello"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod notice;

pub use self::command::Command;
pub use self::error::ProtocolError;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
