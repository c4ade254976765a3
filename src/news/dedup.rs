// src/news/dedup.rs
use std::collections::HashSet;
use std::sync::Mutex;

/// Process-lifetime record of emitted article identities.
///
/// Shared between the scheduled push and on-demand requests behind an `Arc`; the
/// mutex serializes check-and-insert so two concurrent runs cannot both admit the
/// same identity. Never evicted, never persisted.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: Mutex<HashSet<String>>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True (and recorded) the first time `identity` is offered, false afterwards.
    pub fn admit(&self, identity: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|p| p.into_inner());
        if seen.contains(identity) {
            return false;
        }
        seen.insert(identity.to_string())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(identity)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
