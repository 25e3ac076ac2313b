use crate::domain::ports::{LoanLedger, Version};
use crate::error::{LendingError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory versioned ledger.
///
/// Uses `Arc<RwLock<HashMap>>` so clones share the same state. The
/// compare-and-swap check in `write` runs under the write guard, which makes
/// it atomic with respect to concurrent writers. Ideal for tests and for
/// running without persistence.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    entries: Arc<RwLock<HashMap<String, (u64, Vec<u8>)>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoanLedger for InMemoryLedger {
    async fn read(&self, key: &str) -> Result<Option<(Vec<u8>, Version)>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .map(|(version, value)| (value.clone(), Version(*version))))
    }

    async fn write(&self, key: &str, value: Vec<u8>, expected: Option<Version>) -> Result<Version> {
        let mut entries = self.entries.write().await;
        let stored = entries.get(key).map(|(version, _)| *version);
        let next = match (stored, expected) {
            (None, None) => 1,
            (Some(stored), Some(Version(seen))) if stored == seen => stored + 1,
            _ => return Err(LendingError::Conflict(key.to_owned())),
        };
        entries.insert(key.to_owned(), (next, value));
        Ok(Version(next))
    }
}
