//! Per-connection limits configuration.

use serde::Deserialize;

/// Per-connection limits configuration.
///
/// Mailboxes are unbounded, so these limits only govern what a client may
/// send, never what the server queues for it.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum accepted line length in bytes, excluding the terminator
    /// (default: 4096). Longer lines are dropped with a private notice.
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Lines per second a client may sustain (default: 0, disabled).
    #[serde(default)]
    pub message_rate: u32,
    /// Burst capacity of the flood limiter (default: 20).
    #[serde(default = "default_message_burst")]
    pub message_burst: u32,
}

impl LimitsConfig {
    /// Whether the per-connection flood limiter is enabled.
    pub fn flood_limit_enabled(&self) -> bool {
        self.message_rate > 0
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            message_rate: 0,
            message_burst: default_message_burst(),
        }
    }
}

fn default_max_line_length() -> usize {
    linechat_proto::line::DEFAULT_MAX_LINE_LENGTH
}

fn default_message_burst() -> u32 {
    20
}
