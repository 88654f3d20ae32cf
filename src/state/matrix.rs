//! The Matrix - shared state handed to every connection.
//!
//! Bundles the registry, the broadcaster and the configuration-derived
//! settings so collaborators receive one explicit value instead of reaching
//! for globals. Built once at startup; lives for the process lifetime.

use crate::config::{Config, LimitsConfig};
use crate::state::{BroadcastQueue, Broadcaster, Registry, SessionIdGenerator};
use std::sync::Arc;
use std::time::Duration;

/// This server's identity.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
}

/// Central shared state container.
pub struct Matrix {
    /// This server's identity.
    pub server_info: ServerInfo,
    /// Online sessions by display name.
    pub registry: Arc<Registry>,
    /// Producer handle of the ordered broadcast pipe.
    pub broadcaster: Broadcaster,
    /// Per-connection limits.
    pub limits: LimitsConfig,
    /// Disconnect clients silent for this long.
    pub idle_timeout: Option<Duration>,
    /// Id generator for accepted connections.
    pub session_ids: SessionIdGenerator,
}

impl Matrix {
    /// Build the shared state.
    ///
    /// The returned queue is the broadcaster's consumer side; the caller
    /// decides where it runs (normally [`BroadcastQueue::spawn`] with
    /// [`Matrix::registry`]).
    pub fn new(config: &Config) -> (Self, BroadcastQueue) {
        let (broadcaster, queue) = Broadcaster::new();
        let matrix = Self {
            server_info: ServerInfo {
                name: config.server.name.clone(),
            },
            registry: Arc::new(Registry::new()),
            broadcaster,
            limits: config.limits.clone(),
            idle_timeout: config.server.idle_timeout(),
            session_ids: SessionIdGenerator::new(),
        };
        (matrix, queue)
    }
}
