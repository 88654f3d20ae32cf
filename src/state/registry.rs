//! Directory of online sessions keyed by display name.
//!
//! Every mutation and every iteration goes through one reader/writer lock.
//! The lock is a `parking_lot` lock, so it cannot be held across an
//! `.await`: callers copy what they need out of a [`Registry::snapshot`] or
//! [`Registry::sessions`] and do their I/O after the guard is gone.

use crate::state::Session;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::error;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub addr: SocketAddr,
}

/// Concurrent directory of active sessions.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a session visible under its current name.
    ///
    /// The name must be free. Initial names are remote addresses, which are
    /// unique among live connections, and renames may not take an
    /// address-shaped name, so a collision here is a bug.
    pub fn register(&self, session: Arc<Session>) {
        let name = session.name();
        let previous = self.sessions.write().insert(name.clone(), session);
        if let Some(previous) = previous {
            error!(
                name = %name,
                displaced = %previous.id(),
                "Registered over an existing session"
            );
        }
    }

    /// Remove `session` from the directory.
    ///
    /// Only the entry that still points at this very session is removed; an
    /// absent name, or a name now held by a different session, is a no-op.
    /// Returns whether an entry was removed.
    pub fn unregister(&self, session: &Session) -> bool {
        let mut sessions = self.sessions.write();
        let name = session.name();
        match sessions.get(&name) {
            Some(current) if current.id() == session.id() => {
                sessions.remove(&name);
                true
            }
            _ => false,
        }
    }

    /// Whether `name` is currently taken.
    pub fn lookup(&self, name: &str) -> bool {
        self.sessions.read().contains_key(name)
    }

    /// Fetch the session registered under `name`.
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(name).cloned()
    }

    /// Move the session at `old` to `new` in one critical section.
    ///
    /// Fails without touching anything if `new` is taken or `old` is not
    /// registered. Doing the check and the move under one exclusive guard
    /// means two sessions racing for the same name cannot both win.
    pub fn rename(&self, old: &str, new: &str) -> bool {
        let mut sessions = self.sessions.write();
        if sessions.contains_key(new) {
            return false;
        }
        let Some(session) = sessions.remove(old) else {
            return false;
        };
        session.set_name(new.to_string());
        sessions.insert(new.to_string(), session);
        true
    }

    /// Copy out `(name, address)` for every session, sorted by name.
    pub fn snapshot(&self) -> Vec<DirectoryEntry> {
        let mut entries: Vec<DirectoryEntry> = self
            .sessions
            .read()
            .iter()
            .map(|(name, session)| DirectoryEntry {
                name: name.clone(),
                addr: session.addr(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Copy out handles to every session for fan-out.
    pub fn sessions(&self) -> Vec<Arc<Session>> {
        self.sessions.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
