//! # Inbound Port - WalletPoolApi
//!
//! Driving port used by the wallet. Object safe, so a wallet can hold a
//! `Box<dyn WalletPoolApi<T>>` without naming its matcher type.
//!
//! Views return owned values; the borrowing views on `WalletTxPool` itself
//! avoid the clones.

use crate::domain::{AddOutcome, Hash, OutPoint, PoolResult, PoolSnapshot, Timestamp, U512, WalletTxPool};
use crate::ports::{PoolTransaction, WalletMatcher};

/// Primary API of a wallet transaction pool.
///
/// # Example
///
/// ```rust,ignore
/// fn on_block_tx(pool: &mut dyn WalletPoolApi<WalletTransaction>, tx: WalletTransaction) {
///     if pool.add(tx, false).is_added() {
///         println!("balance now {}", pool.balance());
///     }
/// }
/// ```
pub trait WalletPoolApi<T: PoolTransaction>: Send + Sync {
    /// Ingests a transaction. See [`AddOutcome`] for the possible results.
    fn add(&mut self, tx: T, suppress_persist: bool) -> AddOutcome;

    /// Transactions with a wallet-owned input or output.
    fn all(&self) -> Vec<T>;

    /// Outpoints of the wallet's unspent outputs.
    fn unspent(&self) -> Vec<OutPoint>;

    /// Unconfirmed transactions.
    fn pending(&self) -> Vec<T>;

    /// Sum of unspent output values.
    fn balance(&self) -> U512;

    fn export(&self) -> PoolSnapshot<T>;

    /// Replays a snapshot. Fails without ingesting anything on a bad envelope.
    fn import(&mut self, snapshot: PoolSnapshot<T>) -> PoolResult<Vec<AddOutcome>>;

    fn get(&self, hash: &Hash) -> Option<T>;

    fn contains(&self, hash: &Hash) -> bool;

    fn last_ts(&self) -> Timestamp;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool;
}

impl<T: PoolTransaction, W: WalletMatcher<T>> WalletPoolApi<T> for WalletTxPool<T, W> {
    fn add(&mut self, tx: T, suppress_persist: bool) -> AddOutcome {
        WalletTxPool::add(self, tx, suppress_persist)
    }

    fn all(&self) -> Vec<T> {
        WalletTxPool::all(self).into_iter().cloned().collect()
    }

    fn unspent(&self) -> Vec<OutPoint> {
        WalletTxPool::unspent(self)
            .iter()
            .map(|output| output.outpoint())
            .collect()
    }

    fn pending(&self) -> Vec<T> {
        WalletTxPool::pending(self).into_iter().cloned().collect()
    }

    fn balance(&self) -> U512 {
        WalletTxPool::balance(self)
    }

    fn export(&self) -> PoolSnapshot<T> {
        WalletTxPool::export(self)
    }

    fn import(&mut self, snapshot: PoolSnapshot<T>) -> PoolResult<Vec<AddOutcome>> {
        WalletTxPool::import(self, snapshot)
    }

    fn get(&self, hash: &Hash) -> Option<T> {
        WalletTxPool::get(self, hash).cloned()
    }

    fn contains(&self, hash: &Hash) -> bool {
        WalletTxPool::contains(self, hash)
    }

    fn last_ts(&self) -> Timestamp {
        WalletTxPool::last_ts(self)
    }

    fn len(&self) -> usize {
        WalletTxPool::len(self)
    }

    fn is_empty(&self) -> bool {
        WalletTxPool::is_empty(self)
    }
}
