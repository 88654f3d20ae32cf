//! Per-connection flood limiting.
//!
//! Wraps `governor`'s direct (unkeyed) rate limiter: each connection owns
//! one, so there is no shared state to key by session.

use crate::config::LimitsConfig;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;

/// Type alias for governor's direct rate limiter.
type DirectRateLimiter = governor::DefaultDirectRateLimiter;

/// Token-bucket limiter over the lines one client sends.
#[derive(Debug)]
pub struct FloodLimiter {
    limiter: DirectRateLimiter,
}

impl FloodLimiter {
    /// Build a limiter from `[limits]`, or `None` when flood limiting is off.
    ///
    /// A zero burst falls back to one second's worth of lines; validation
    /// rejects that configuration before it gets here.
    pub fn from_limits(limits: &LimitsConfig) -> Option<Self> {
        let rate = NonZeroU32::new(limits.message_rate)?;
        let burst = NonZeroU32::new(limits.message_burst).unwrap_or(rate);
        let quota = Quota::per_second(rate).allow_burst(burst);
        Some(Self {
            limiter: RateLimiter::direct(quota),
        })
    }

    /// Consume one token.
    ///
    /// Returns `true` if the line is allowed, `false` if the client is
    /// flooding.
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}
