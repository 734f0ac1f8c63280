//! Core entities for the wallet transaction pool.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use primitive_types::{U256, U512};

/// 32-byte transaction hash.
pub type Hash = [u8; 32];

/// Seconds since the Unix epoch. A confirmation timestamp of 0 means pending.
pub type Timestamp = u64;

/// How long an unconfirmed transaction is retained after it was first seen.
pub const DEFAULT_PENDING_RETENTION_SECS: u64 = 2 * 24 * 60 * 60;

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// Reference to a transaction output: `(transaction hash, output index)`.
///
/// Displayed as `<hex hash>/<index>`, which is the key used by both the
/// unspent index and the orphan index.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", hex::encode(self.hash), self.index)
    }
}

/// Entry of the unspent index: the owning transaction and the output index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnspentEntry {
    pub tx_hash: Hash,
    pub index: u32,
}

impl UnspentEntry {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.tx_hash, self.index)
    }
}

/// Result of a single ingestion call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// New transaction with wallet-owned outputs, fully processed.
    Added,
    /// New transaction without wallet-owned outputs. Inputs were consumed
    /// or registered as orphans, nothing was produced.
    SpendOnly,
    /// Hash already known and confirmation unchanged.
    Duplicate,
    /// Hash already known; the stored record picked up `ts` and block.
    Confirmed,
    /// An input failed verification. The transaction stays registered but
    /// its effects were not applied.
    Rejected,
    /// Unconfirmed and past the retention window; pruned instead of ingested.
    Expired,
}

impl AddOutcome {
    /// True for `Added` only.
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added)
    }

    /// True when the call did not register a new transaction.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Duplicate | Self::Confirmed)
    }

    /// True when verification or staleness kept the transaction out.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected | Self::Expired)
    }
}

/// Pool configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Wallet key-space prefix. Records live under `<prefix>tx/<hex hash>`.
    pub key_prefix: String,
    /// Retention window for unconfirmed transactions (seconds).
    pub pending_retention_secs: u64,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            key_prefix: String::new(),
            pending_retention_secs: DEFAULT_PENDING_RETENTION_SECS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// Config scoped to one wallet's key space.
    pub fn for_wallet(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Creates a minimal config for testing.
    pub fn for_testing() -> Self {
        Self {
            key_prefix: "test/".to_string(),
            event_capacity: 64,
            ..Default::default()
        }
    }

    /// Prefix shared by all transaction records of this wallet.
    pub fn record_prefix(&self) -> String {
        format!("{}tx/", self.key_prefix)
    }

    /// Storage key for a single transaction record.
    pub fn record_key(&self, hash: &Hash) -> Vec<u8> {
        format!("{}{}", self.record_prefix(), hex::encode(hash)).into_bytes()
    }

    /// Inclusive key range covering every record of this wallet.
    pub fn record_range(&self) -> (Vec<u8>, Vec<u8>) {
        let prefix = self.record_prefix();
        let end = format!("{}z", prefix);
        (prefix.into_bytes(), end.into_bytes())
    }
}
