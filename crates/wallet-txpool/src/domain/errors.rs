//! Error types for the wallet transaction pool.
//!
//! Verification failures are not errors: they surface as
//! [`AddOutcome::Rejected`](super::AddOutcome::Rejected).

use thiserror::Error;

/// Failures reported by a `KeyValueStore` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Backend I/O failure.
    #[error("Storage I/O error: {message}")]
    Io { message: String },

    /// Iteration over a key range failed part way.
    #[error("Storage scan failed: {message}")]
    Scan { message: String },

    /// The persistence writer is no longer running.
    #[error("Persistence writer closed")]
    WriterClosed,
}

/// Wallet pool errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Storage fault. Non-fatal for in-memory state.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A durable record could not be encoded or decoded.
    #[error("Record encoding error: {message}")]
    Encoding { message: String },

    /// Snapshot envelope carries an unsupported version.
    #[error("Unsupported snapshot version: expected {expected}, got {actual}")]
    SnapshotVersion { expected: u32, actual: u32 },

    /// Snapshot envelope carries the wrong type tag.
    #[error("Unexpected snapshot type: expected {expected}, got {actual}")]
    SnapshotType {
        expected: &'static str,
        actual: String,
    },
}

impl From<bincode::Error> for PoolError {
    fn from(err: bincode::Error) -> Self {
        Self::Encoding {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PoolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding {
            message: err.to_string(),
        }
    }
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
