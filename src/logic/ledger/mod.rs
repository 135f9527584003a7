//! Prediction Ledger - durable, append-only record of every verdict
//!
//! The ledger is the one mutable shared resource in the core. Multiple
//! pipeline instances (even in separate processes) may hold it open at
//! once; appends must never lose a record under concurrency.
//!
//! - `store.rs` - SQLite (WAL) backed implementation

pub mod store;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::verdict::Label;

pub use store::SqliteLedger;

// ============================================================================
// RECORD
// ============================================================================

/// One prediction, immutable once written.
///
/// `features` holds the original input: the raw URL for URL predictions,
/// or the JSON-serialized vector for direct-vector predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub features: String,
    pub prediction: Label,
}

impl LogRecord {
    /// New record stamped with the current time
    pub fn now(features: String, prediction: Label) -> Self {
        Self {
            timestamp: Utc::now(),
            features,
            prediction,
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone)]
pub enum LedgerError {
    /// Underlying file/database I/O failed
    Io(String),
    /// SQLite reported a storage error
    Storage(String),
    /// The store stayed locked through all retries
    Busy,
    /// A persisted row could not be read back
    Corrupt(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Ledger IO error: {}", e),
            Self::Storage(e) => write!(f, "Ledger storage error: {}", e),
            Self::Busy => write!(f, "Ledger busy: lock contention exhausted retries"),
            Self::Corrupt(e) => write!(f, "Ledger corrupt: {}", e),
        }
    }
}

impl std::error::Error for LedgerError {}

// ============================================================================
// LEDGER CONTRACT
// ============================================================================

/// Append-only prediction store.
///
/// Implementations must guarantee that two concurrent `append` calls both
/// land, in some total order consistent with completion time. A batch
/// append is atomic: all records as one contiguous block, or none.
pub trait PredictionLedger: Send + Sync {
    /// Append one record
    fn append(&self, record: &LogRecord) -> Result<(), LedgerError>;

    /// Append a batch as one atomic, contiguous block
    fn append_batch(&self, records: &[LogRecord]) -> Result<(), LedgerError>;

    /// All records, in append order
    fn read_all(&self) -> Result<Vec<LogRecord>, LedgerError>;

    /// Number of records
    fn len(&self) -> Result<u64, LedgerError>;

    fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }
}
