//! Error types for the linechat protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum length.
    ///
    /// The offending bytes have already been discarded; the stream can keep
    /// being read.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Number of bytes seen before the line was rejected.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A line was not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
    },
}

impl ProtocolError {
    /// Whether the connection can keep reading after this error.
    ///
    /// Oversized and badly encoded lines are dropped and reported to the
    /// sender; I/O errors end the connection.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::LineTooLong { .. } | Self::InvalidUtf8 { .. })
    }
}
