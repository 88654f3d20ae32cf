//! Line-based codec for tokio.
//!
//! This module provides a codec that reads newline-terminated UTF-8 lines
//! and writes them back with a single `\n` terminator.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Default maximum line length in bytes, excluding the terminator.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// One decoded frame.
///
/// Oversized or badly encoded lines are delivered as `Err` items rather than
/// as stream errors, because a framed stream stops after its first error and
/// those lines should only cost the sender a reply, not the connection.
pub type Frame = Result<String, ProtocolError>;

/// Line-based codec that handles newline-terminated messages.
///
/// Accepts both `\n` and `\r\n` terminators. Lines longer than the
/// configured limit are discarded up to their terminator and reported once.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Set while skipping the rest of an oversized line
    discarding: bool,
    /// Bytes skipped so far for the current oversized line
    discarded: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl LineCodec {
    /// Create a new codec with the default line limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
            discarded: 0,
        }
    }

    /// The configured maximum line length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Turn raw line bytes (terminator already removed) into a frame.
    fn finish_line(&self, raw: &[u8]) -> Frame {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.len() > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual: raw.len(),
                limit: self.max_len,
            });
        }
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|e| ProtocolError::InvalidUtf8 {
                byte_pos: e.valid_up_to(),
            })
    }

    fn overflow(&mut self) -> Frame {
        let actual = self.discarded;
        self.discarding = false;
        self.discarded = 0;
        Err(ProtocolError::LineTooLong {
            actual,
            limit: self.max_len,
        })
    }
}

impl Decoder for LineCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Frame>> {
        if self.discarding {
            return match src.iter().position(|b| *b == b'\n') {
                Some(offset) => {
                    self.discarded += offset;
                    src.advance(offset + 1);
                    Ok(Some(self.overflow()))
                }
                None => {
                    self.discarded += src.len();
                    src.clear();
                    Ok(None)
                }
            };
        }

        // Look for newline starting from where we left off
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;
            return Ok(Some(self.finish_line(&line[..line.len() - 1])));
        }

        // One byte of slack for a `\r` whose `\n` has not arrived yet
        if src.len() > self.max_len + 1 {
            // Partial line already exceeds the limit: drop it and skip ahead
            self.discarding = true;
            self.discarded = src.len();
            self.next_index = 0;
            src.clear();
        } else {
            self.next_index = src.len();
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<Frame>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if self.discarding {
            return Ok(Some(self.overflow()));
        }
        if src.is_empty() {
            return Ok(None);
        }
        // Unterminated trailing line before close
        let line = src.split_to(src.len());
        self.next_index = 0;
        Ok(Some(self.finish_line(&line)))
    }
}

impl<T: AsRef<str>> Encoder<T> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> error::Result<()> {
        let line = line.as_ref();
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
