//! # Wallet Transaction Pool - Ingestion Engine
//!
//! Owns the pool state and applies incoming transactions to it.
//!
//! ## Data Structures
//!
//! - `all`: every registered transaction, in insertion order
//! - `unspent`: wallet-owned outputs not yet consumed
//! - `orphans`: spends waiting for an output that has not been observed
//!
//! ## Ingestion Steps
//!
//! 1. Prune stale pending transactions (unconfirmed past the retention window)
//! 2. Deduplicate, upgrading confirmation data in place
//! 3. Register in `all`
//! 4. Classify owned inputs / outputs
//! 5. Consume unspent inputs (verified) or park them as orphans
//! 6. Stop early for transactions without owned outputs
//! 7. Produce owned outputs, letting waiting orphans claim them first
//! 8. Update `last_ts`, notify, persist
//!
//! ## Known Quirks
//!
//! Pruning only touches `unspent` and storage. A pruned or rejected
//! transaction stays in `all` and keeps showing up in `pending()`. A
//! verification failure also leaves keys consumed by earlier inputs of the
//! same transaction consumed.

use super::entities::{AddOutcome, Hash, OutPoint, PoolConfig, Timestamp, UnspentEntry};
use super::orphans::{OrphanIndex, OrphanSpend};
use crate::adapters::PersistenceAdapter;
use crate::events::{PoolEvent, PoolEventBus};
use crate::ports::{KeyValueStore, PoolTransaction, SystemTimeSource, TimeSource, WalletMatcher};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Wallet-scoped transaction pool.
///
/// One instance per wallet. All mutation happens synchronously inside
/// [`add`](Self::add); durable writes are queued to the persistence adapter
/// and never awaited here.
pub struct WalletTxPool<T: PoolTransaction, W: WalletMatcher<T>> {
    pub(crate) config: PoolConfig,
    pub(crate) wallet: W,
    pub(crate) time: Arc<dyn TimeSource>,
    pub(crate) events: Arc<PoolEventBus>,
    pub(crate) persistence: Option<PersistenceAdapter>,

    /// All registered transactions indexed by hash.
    pub(crate) all: IndexMap<Hash, T>,

    /// Wallet-owned unconsumed outputs.
    pub(crate) unspent: HashMap<OutPoint, UnspentEntry>,

    /// Spends waiting for their output.
    pub(crate) orphans: OrphanIndex,

    /// Highest confirmation timestamp seen.
    pub(crate) last_ts: Timestamp,

    pub(crate) loaded: bool,
}

impl<T: PoolTransaction, W: WalletMatcher<T>> WalletTxPool<T, W> {
    /// Creates a pool without storage. It is loaded immediately.
    pub fn new(wallet: W, config: PoolConfig) -> Self {
        let events = Arc::new(PoolEventBus::with_capacity(config.event_capacity));
        Self {
            config,
            wallet,
            time: Arc::new(SystemTimeSource),
            events,
            persistence: None,
            all: IndexMap::new(),
            unspent: HashMap::new(),
            orphans: OrphanIndex::new(),
            last_ts: 0,
            loaded: true,
        }
    }

    /// Creates a pool backed by `store`. Call [`load`](Self::load) to replay
    /// stored records; until then the pool reports `is_loaded() == false`.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime (the persistence writer is
    /// spawned here).
    pub fn with_storage(wallet: W, config: PoolConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let mut pool = Self::new(wallet, config);
        pool.persistence = Some(PersistenceAdapter::spawn(
            pool.config.clone(),
            store,
            pool.events.clone(),
        ));
        pool.loaded = false;
        pool
    }

    /// Replaces the clock used for stale-pending checks.
    pub fn with_time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Subscribes to pool notifications.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<PoolEvent> {
        self.events.subscribe()
    }

    pub fn event_bus(&self) -> Arc<PoolEventBus> {
        self.events.clone()
    }

    /// Waits for queued durable writes to settle. No-op without storage.
    pub async fn flush(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.flush().await;
        }
    }

    /// Ingests a transaction.
    ///
    /// With `suppress_persist` set, no durable write or delete is issued
    /// (used when replaying records that are already stored).
    pub fn add(&mut self, tx: T, suppress_persist: bool) -> AddOutcome {
        let hash = tx.hash();

        if self.is_stale(&tx) {
            debug!(
                "[txpool] Pruning stale pending tx {} (first seen {})",
                hex::encode(hash),
                tx.ps()
            );
            self.prune(&hash, tx.output_count(), suppress_persist);
            return AddOutcome::Expired;
        }

        if let Some(existing) = self.all.get_mut(&hash) {
            if tx.ts() != 0 && existing.ts() == 0 {
                existing.set_confirmation(tx.ts(), tx.block());
                debug!(
                    "[txpool] Confirmed tx {} at {}",
                    hex::encode(hash),
                    tx.ts()
                );
                self.persist(&hash, suppress_persist);
                return AddOutcome::Confirmed;
            }
            return AddOutcome::Duplicate;
        }

        let ts = tx.ts();
        let prevouts = tx.prevouts();
        let output_count = tx.output_count();
        let owned_inputs = self.wallet.owned_inputs(&tx);
        let owned_outputs = self.wallet.owned_outputs(&tx);
        self.all.insert(hash, tx);

        let mut updated = false;

        for (input_index, prevout) in prevouts.iter().enumerate() {
            if self.unspent.contains_key(prevout) {
                if !self.bind_and_verify(&hash, input_index, prevout) {
                    warn!(
                        "[txpool] Input {} of tx {} failed verification against {}",
                        input_index,
                        hex::encode(hash),
                        prevout
                    );
                    return AddOutcome::Rejected;
                }
                self.unspent.remove(prevout);
                updated = true;
                continue;
            }

            // Only track orphans this wallet cares about.
            if owned_outputs.is_empty() && !owned_inputs.contains(&input_index) {
                continue;
            }

            debug!(
                "[txpool] Tx {} input {} awaits unseen output {}",
                hex::encode(hash),
                input_index,
                prevout
            );
            self.orphans.insert(
                *prevout,
                OrphanSpend {
                    tx_hash: hash,
                    input_index,
                },
            );
        }

        if owned_outputs.is_empty() {
            if updated {
                self.events.publish(PoolEvent::Updated {
                    last_ts: self.last_ts,
                    tx_hash: hash,
                });
            }
            // Spend-only records are kept so the spend survives a reload.
            if !owned_inputs.is_empty() {
                self.persist(&hash, suppress_persist);
            }
            return AddOutcome::SpendOnly;
        }

        if self.produce_outputs(&hash, output_count, &owned_outputs, suppress_persist) {
            updated = true;
        }

        self.last_ts = self.last_ts.max(ts);
        if updated {
            self.events.publish(PoolEvent::Updated {
                last_ts: self.last_ts,
                tx_hash: hash,
            });
        }

        self.persist(&hash, suppress_persist);
        self.events.publish(PoolEvent::Received { tx_hash: hash });

        AddOutcome::Added
    }

    /// Adds owned outputs of `hash` to the unspent index unless a waiting
    /// orphan claims them. Returns true if anything was added.
    fn produce_outputs(
        &mut self,
        hash: &Hash,
        output_count: usize,
        owned_outputs: &[usize],
        suppress_persist: bool,
    ) -> bool {
        let mut updated = false;
        for index in 0..output_count {
            if !owned_outputs.contains(&index) {
                continue;
            }
            let key = OutPoint::new(*hash, index as u32);

            // The waiting list is cleared whatever the resolution outcome.
            let waiting = self.orphans.take(&key);
            let spent = !waiting.is_empty() && self.resolve_orphans(&key, waiting, suppress_persist);

            if !spent {
                self.unspent.insert(
                    key,
                    UnspentEntry {
                        tx_hash: *hash,
                        index: index as u32,
                    },
                );
                updated = true;
            }
        }
        updated
    }

    /// Lets waiting spends claim `output`. The first spend that verifies wins;
    /// spends that fail verification get their transaction pruned.
    fn resolve_orphans(
        &mut self,
        output: &OutPoint,
        waiting: Vec<OrphanSpend>,
        suppress_persist: bool,
    ) -> bool {
        for orphan in waiting {
            if self.bind_and_verify(&orphan.tx_hash, orphan.input_index, output) {
                debug!(
                    "[txpool] Orphan tx {} resolved against {}",
                    hex::encode(orphan.tx_hash),
                    output
                );
                return true;
            }

            warn!(
                "[txpool] Orphan tx {} failed verification against {}, pruning",
                hex::encode(orphan.tx_hash),
                output
            );
            let output_count = self
                .all
                .get(&orphan.tx_hash)
                .map_or(0, |tx| tx.output_count());
            self.prune(&orphan.tx_hash, output_count, suppress_persist);
        }
        false
    }

    /// Binds the output at `source` to input `input_index` of `spender` and
    /// verifies it. Missing transactions or outputs count as failure.
    fn bind_and_verify(&mut self, spender: &Hash, input_index: usize, source: &OutPoint) -> bool {
        let Some(previous) = self
            .all
            .get(&source.hash)
            .and_then(|tx| tx.output(source.index as usize))
            .cloned()
        else {
            return false;
        };
        match self.all.get_mut(spender) {
            Some(tx) => {
                tx.bind_previous_output(input_index, previous);
                tx.verify_input(input_index)
            }
            None => false,
        }
    }

    fn is_stale(&self, tx: &T) -> bool {
        tx.ts() == 0
            && tx
                .ps()
                .saturating_add(self.config.pending_retention_secs)
                < self.time.now()
    }

    /// Drops the unspent outputs contributed by `hash` and its durable record.
    /// The `all` entry is left in place.
    fn prune(&mut self, hash: &Hash, output_count: usize, suppress_persist: bool) {
        for index in 0..output_count {
            self.unspent.remove(&OutPoint::new(*hash, index as u32));
        }
        if suppress_persist {
            return;
        }
        if let Some(persistence) = &self.persistence {
            persistence.remove_tx(hash);
        }
    }

    fn persist(&self, hash: &Hash, suppress_persist: bool) {
        if suppress_persist {
            return;
        }
        if let (Some(persistence), Some(tx)) = (&self.persistence, self.all.get(hash)) {
            persistence.store_tx(hash, tx);
        }
    }
}
