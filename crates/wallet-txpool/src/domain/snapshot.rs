//! Versioned export / import of the whole pool.
//!
//! ```json
//! { "v": 1, "type": "tx-pool", "txs": [ ... ] }
//! ```
//!
//! Import replays every transaction through ingestion with persistence
//! enabled. A wrong version or type tag aborts before anything is ingested.

use super::entities::AddOutcome;
use super::errors::{PoolError, PoolResult};
use super::pool::WalletTxPool;
use crate::ports::{PoolTransaction, WalletMatcher};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const SNAPSHOT_VERSION: u32 = 1;
pub const SNAPSHOT_TYPE: &str = "tx-pool";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot<T> {
    pub v: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub txs: Vec<T>,
}

impl<T> PoolSnapshot<T> {
    pub fn new(txs: Vec<T>) -> Self {
        Self {
            v: SNAPSHOT_VERSION,
            kind: SNAPSHOT_TYPE.to_string(),
            txs,
        }
    }

    /// Checks the version and type tags.
    pub fn validate(&self) -> PoolResult<()> {
        if self.v != SNAPSHOT_VERSION {
            return Err(PoolError::SnapshotVersion {
                expected: SNAPSHOT_VERSION,
                actual: self.v,
            });
        }
        if self.kind != SNAPSHOT_TYPE {
            return Err(PoolError::SnapshotType {
                expected: SNAPSHOT_TYPE,
                actual: self.kind.clone(),
            });
        }
        Ok(())
    }
}

impl<T: PoolTransaction, W: WalletMatcher<T>> WalletTxPool<T, W> {
    /// Snapshot of every registered transaction, in insertion order.
    pub fn export(&self) -> PoolSnapshot<T> {
        PoolSnapshot::new(self.all.values().cloned().collect())
    }

    /// Replays `snapshot` through [`add`](Self::add), persisting each record.
    pub fn import(&mut self, snapshot: PoolSnapshot<T>) -> PoolResult<Vec<AddOutcome>> {
        snapshot.validate()?;
        let count = snapshot.txs.len();
        let outcomes: Vec<AddOutcome> = snapshot
            .txs
            .into_iter()
            .map(|tx| self.add(tx, false))
            .collect();
        info!("[txpool] Imported {} transactions", count);
        Ok(outcomes)
    }

    pub fn export_json(&self) -> PoolResult<String> {
        Ok(serde_json::to_string(&self.export())?)
    }

    pub fn import_json(&mut self, json: &str) -> PoolResult<Vec<AddOutcome>> {
        let snapshot: PoolSnapshot<T> = serde_json::from_str(json)?;
        self.import(snapshot)
    }
}
