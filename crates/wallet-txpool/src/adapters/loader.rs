//! # Loader
//!
//! Rebuilds a pool from its durable records.
//!
//! Records under `<prefix>tx/` are streamed in key order and replayed through
//! ingestion with persistence suppressed. The first scan or decode failure
//! publishes `PoolEvent::Error` and stops the replay; records already
//! ingested stay in memory and the pool is left not loaded.

use super::PersistenceAdapter;
use crate::domain::{PoolConfig, PoolError, PoolResult, Timestamp, WalletTxPool};
use crate::events::PoolEvent;
use crate::ports::{KeyValueStore, PoolTransaction, WalletMatcher};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{info, warn};

/// Decodes a durable transaction record.
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> PoolResult<T> {
    Ok(bincode::deserialize(bytes)?)
}

impl<T: PoolTransaction, W: WalletMatcher<T>> WalletTxPool<T, W> {
    /// Replays every stored record and marks the pool loaded.
    ///
    /// Returns the resulting `last_ts`, which is also carried by the
    /// `Ready` event. A pool without storage is already loaded and returns
    /// immediately.
    pub async fn load(&mut self) -> PoolResult<Timestamp> {
        let Some(store) = self.persistence.as_ref().map(PersistenceAdapter::store) else {
            self.loaded = true;
            return Ok(self.last_ts);
        };
        let (start, end) = self.config.record_range();

        let mut records = store.scan(&start, &end);
        let mut replayed = 0usize;

        while let Some(record) = records.next().await {
            let tx = match record
                .map_err(PoolError::from)
                .and_then(|bytes| decode_record::<T>(&bytes))
            {
                Ok(tx) => tx,
                Err(err) => {
                    warn!(
                        "[txpool] Load of {} stopped after {} records: {}",
                        self.config.record_prefix(),
                        replayed,
                        err
                    );
                    self.events.publish(PoolEvent::Error {
                        message: err.to_string(),
                    });
                    return Err(err);
                }
            };
            self.add(tx, true);
            replayed += 1;
        }

        self.loaded = true;
        info!(
            "[txpool] Loaded {} records from {} (last_ts={})",
            replayed,
            self.config.record_prefix(),
            self.last_ts
        );
        self.events.publish(PoolEvent::Ready {
            last_ts: self.last_ts,
        });
        Ok(self.last_ts)
    }

    /// Creates a storage-backed pool and loads it.
    ///
    /// On a failed load the pool, and whatever it had replayed, is dropped
    /// with the error. Callers that want the partial state should use
    /// [`with_storage`](Self::with_storage) followed by [`load`](Self::load).
    pub async fn open(
        wallet: W,
        config: PoolConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> PoolResult<Self> {
        let mut pool = Self::with_storage(wallet, config, store);
        pool.load().await?;
        Ok(pool)
    }
}
