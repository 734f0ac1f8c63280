//! Read-only views over the pool state.
//!
//! Ownership is re-checked against the wallet on every call; nothing here is
//! cached.

use super::entities::{Hash, OutPoint, Timestamp, U256, U512};
use super::orphans::OrphanIndex;
use super::pool::WalletTxPool;
use crate::ports::{PoolTransaction, WalletMatcher};

/// An unspent wallet output together with the transaction holding it.
#[derive(Debug, Clone, Copy)]
pub struct UnspentOutput<'a, T> {
    pub tx: &'a T,
    pub index: u32,
}

impl<'a, T: PoolTransaction> UnspentOutput<'a, T> {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.tx.hash(), self.index)
    }

    pub fn value(&self) -> U256 {
        self.tx.output_value(self.index as usize).unwrap_or_default()
    }
}

impl<T: PoolTransaction, W: WalletMatcher<T>> WalletTxPool<T, W> {
    /// Registered transactions touching the wallet through an input or an
    /// output, in insertion order.
    pub fn all(&self) -> Vec<&T> {
        self.all
            .values()
            .filter(|tx| {
                !self.wallet.owned_inputs(tx).is_empty()
                    || !self.wallet.owned_outputs(tx).is_empty()
            })
            .collect()
    }

    /// Unspent outputs still owned by the wallet, ordered by outpoint.
    pub fn unspent(&self) -> Vec<UnspentOutput<'_, T>> {
        let mut outputs: Vec<UnspentOutput<'_, T>> = self
            .unspent
            .values()
            .filter_map(|entry| {
                let tx = self.all.get(&entry.tx_hash)?;
                self.wallet
                    .owns_output(tx, entry.index as usize)
                    .then_some(UnspentOutput {
                        tx,
                        index: entry.index,
                    })
            })
            .collect();
        outputs.sort_by_key(|output| (output.tx.hash(), output.index));
        outputs
    }

    /// Every registered transaction without a confirmation timestamp.
    ///
    /// Not filtered by ownership, so rejected and pruned transactions still
    /// appear here.
    pub fn pending(&self) -> Vec<&T> {
        self.all.values().filter(|tx| tx.ts() == 0).collect()
    }

    /// Sum of the values of [`unspent`](Self::unspent).
    ///
    /// Accumulated in 512 bits: each output value is a full `U256`, so the
    /// total of two outputs can already exceed it.
    pub fn balance(&self) -> U512 {
        self.unspent()
            .iter()
            .fold(U512::zero(), |acc, output| acc + U512::from(output.value()))
    }

    pub fn get(&self, hash: &Hash) -> Option<&T> {
        self.all.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.all.contains_key(hash)
    }

    /// Number of registered transactions, relevant or not.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Highest confirmation timestamp ingested so far.
    pub fn last_ts(&self) -> Timestamp {
        self.last_ts
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn orphans(&self) -> &OrphanIndex {
        &self.orphans
    }

    /// Number of outpoints that spends are waiting for.
    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    pub fn has_orphans(&self, outpoint: &OutPoint) -> bool {
        self.orphans.contains(outpoint)
    }
}
