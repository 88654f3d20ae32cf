//! Prometheus metrics collection for linechat.
//!
//! Metrics live in process-wide `OnceLock`s so recording never needs a
//! handle. Recording before [`init`] is a silent no-op, which keeps unit
//! tests free of setup.
//!
//! - `linechat_connected_sessions` - Sessions currently online (gauge)
//! - `linechat_command_total{command}` - Commands processed by type
//! - `linechat_command_duration_seconds{command}` - Command latency histogram
//! - `linechat_command_errors_total{command,error}` - Failed commands
//! - `linechat_broadcasts_total{kind}` - Broadcasts fanned out by kind
//! - `linechat_broadcast_fanout` - Recipients per broadcast (histogram)
//! - `linechat_deliveries_dropped_total` - Lines pushed into closed mailboxes
//! - `linechat_rename_conflicts_total` - Renames lost to a concurrent rename

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Gauges
// ========================================================================

/// Sessions currently online.
pub static CONNECTED_SESSIONS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Commands
// ========================================================================

/// Commands processed by type (WHO, RENAME, CHAT).
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command processing latency by command type.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Command errors by type and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Renames that passed the pre-check but lost the atomic move.
pub static RENAME_CONFLICTS: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Broadcast
// ========================================================================

/// Broadcasts fanned out, by kind.
pub static BROADCASTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Recipients per broadcast.
pub static BROADCAST_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Lines that could not be queued because the recipient's writer was gone.
pub static DELIVERIES_DROPPED: OnceLock<IntCounter> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at server startup. Later calls are harmless.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(CONNECTED_SESSIONS, IntGauge::new("linechat_connected_sessions", "Sessions currently online"));

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("linechat_command_total", "Commands processed by type"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("linechat_command_duration_seconds", "Command latency by type")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("linechat_command_errors_total", "Command errors by type"), &["command", "error"]));
    register!(RENAME_CONFLICTS, IntCounter::new("linechat_rename_conflicts_total", "Renames lost to a concurrent rename"));

    register!(BROADCASTS, IntCounterVec::new(Opts::new("linechat_broadcasts_total", "Broadcasts fanned out by kind"), &["kind"]));
    register!(BROADCAST_FANOUT, Histogram::with_opts(
        HistogramOpts::new("linechat_broadcast_fanout", "Recipients per broadcast")
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0])));
    register!(DELIVERIES_DROPPED, IntCounter::new("linechat_deliveries_dropped_total", "Lines pushed into closed mailboxes"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

#[inline]
pub fn inc_connected_sessions() {
    if let Some(g) = CONNECTED_SESSIONS.get() {
        g.inc();
    }
}

#[inline]
pub fn dec_connected_sessions() {
    if let Some(g) = CONNECTED_SESSIONS.get() {
        g.dec();
    }
}

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

#[inline]
pub fn record_rename_conflict() {
    if let Some(c) = RENAME_CONFLICTS.get() {
        c.inc();
    }
}

/// Record one fanned-out broadcast and how many mailboxes took it.
#[inline]
pub fn record_broadcast(kind: &str, recipients: usize) {
    if let Some(c) = BROADCASTS.get() {
        c.with_label_values(&[kind]).inc();
    }
    if let Some(h) = BROADCAST_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

#[inline]
pub fn record_dropped_delivery() {
    if let Some(c) = DELIVERIES_DROPPED.get() {
        c.inc();
    }
}
