use crate::error::Result;
use async_trait::async_trait;

/// Opaque version token handed out by `read` and checked by `write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(pub u64);

/// Versioned key-value accessor backing the loan ledger.
///
/// `write` commits only if the stored version still matches `expected`
/// (`None` meaning the key must be absent), and fails with
/// `LendingError::Conflict` otherwise. This compare-and-swap contract is the
/// engine's only serialization point; the engine itself takes no locks.
#[async_trait]
pub trait LoanLedger: Send + Sync {
    /// Reads the current value and version stored at `key`.
    async fn read(&self, key: &str) -> Result<Option<(Vec<u8>, Version)>>;

    /// Conditionally writes `value` at `key`, returning the new version.
    async fn write(&self, key: &str, value: Vec<u8>, expected: Option<Version>) -> Result<Version>;
}

pub type LoanLedgerBox = Box<dyn LoanLedger>;
