//! # Domain Layer - Wallet Transaction Pool
//!
//! Pure pool logic. Storage, ownership and time are reached only through the
//! outbound ports.
//!
//! ## Components
//!
//! - `entities`: OutPoint, UnspentEntry, PoolConfig, AddOutcome
//! - `transaction`: WalletTransaction, the shipped `PoolTransaction`
//! - `pool`: WalletTxPool ingestion engine and orphan resolver
//! - `orphans`: OrphanIndex multimap
//! - `query`: read-only views and balance aggregation
//! - `snapshot`: versioned export / import envelope
//! - `errors`: PoolError and StorageError
//!
//! ## Data Types
//!
//! - Hash: `[u8; 32]` (double SHA-256 transaction hash)
//! - Timestamp: seconds since the Unix epoch, 0 meaning "unconfirmed"
//! - U256: output values and balance

pub mod entities;
pub mod errors;
pub mod orphans;
pub mod pool;
pub mod query;
pub mod snapshot;
pub mod transaction;

pub use entities::*;
pub use errors::*;
pub use orphans::*;
pub use pool::*;
pub use query::*;
pub use snapshot::*;
pub use transaction::*;
