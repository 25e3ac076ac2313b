use crate::domain::ports::{LoanLedger, Version};
use crate::error::{LendingError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for storing loan records.
pub const CF_LOANS: &str = "loans";

/// A persistent versioned ledger backed by RocksDB.
///
/// Each stored value carries an 8-byte big-endian version prefix followed by
/// the record payload. The version check and the subsequent put are
/// serialized behind `write_gate`, giving the same compare-and-swap contract
/// as the in-memory ledger within a single process.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbLedger {
    db: Arc<DB>,
    write_gate: Arc<Mutex<()>>,
}

impl RocksDbLedger {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the "loans" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_loans = ColumnFamilyDescriptor::new(CF_LOANS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_loans])
            .map_err(|e| LendingError::Storage(Box::new(e)))?;

        Ok(Self {
            db: Arc::new(db),
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_LOANS).ok_or_else(|| {
            LendingError::Storage(Box::new(std::io::Error::other(
                "loans column family not found",
            )))
        })
    }
}

fn encode(version: u64, value: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + value.len());
    buf.extend_from_slice(&version.to_be_bytes());
    buf.extend_from_slice(value);
    buf
}

fn decode(stored: &[u8]) -> Result<(u64, Vec<u8>)> {
    if stored.len() < 8 {
        return Err(LendingError::Storage(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "stored value shorter than its version prefix",
        ))));
    }
    let (prefix, payload) = stored.split_at(8);
    let mut version = [0u8; 8];
    version.copy_from_slice(prefix);
    Ok((u64::from_be_bytes(version), payload.to_vec()))
}

#[async_trait]
impl LoanLedger for RocksDbLedger {
    async fn read(&self, key: &str) -> Result<Option<(Vec<u8>, Version)>> {
        let cf = self.cf()?;
        let stored = self
            .db
            .get_cf(cf, key.as_bytes())
            .map_err(|e| LendingError::Storage(Box::new(e)))?;

        match stored {
            Some(bytes) => {
                let (version, payload) = decode(&bytes)?;
                Ok(Some((payload, Version(version))))
            }
            None => Ok(None),
        }
    }

    async fn write(&self, key: &str, value: Vec<u8>, expected: Option<Version>) -> Result<Version> {
        let cf = self.cf()?;
        let _gate = self.write_gate.lock().map_err(|_| {
            LendingError::Storage(Box::new(std::io::Error::other("write gate poisoned")))
        })?;

        let stored = self
            .db
            .get_cf(cf, key.as_bytes())
            .map_err(|e| LendingError::Storage(Box::new(e)))?;
        let stored = match stored {
            Some(bytes) => Some(decode(&bytes)?.0),
            None => None,
        };

        let next = match (stored, expected) {
            (None, None) => 1,
            (Some(stored), Some(Version(seen))) if stored == seen => stored + 1,
            _ => return Err(LendingError::Conflict(key.to_owned())),
        };

        self.db
            .put_cf(cf, key.as_bytes(), encode(next, &value))
            .map_err(|e| LendingError::Storage(Box::new(e)))?;

        Ok(Version(next))
    }
}
