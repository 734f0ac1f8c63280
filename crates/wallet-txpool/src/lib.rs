//! # Wallet Transaction Pool
//!
//! Maintains a wallet's local UTXO index from a stream of transactions that may
//! arrive out of order, unconfirmed, or spending outputs that have not been seen
//! yet.
//!
//! ## Purpose
//!
//! Reported balance and spendability stay correct while:
//!
//! - spends that reference unknown outputs are parked as orphans and resolved
//!   once the parent output shows up,
//! - every consumption of a wallet output is gated on input verification,
//! - confirmations update existing records in place,
//! - the in-memory index is mirrored to a key-value store on a best-effort,
//!   non-transactional basis.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Every unspent entry references a known transaction | `domain/pool.rs` - `add()` |
//! | A key is never both unspent and awaited by orphans | `domain/pool.rs` - `produce_outputs()` |
//! | `ts` only moves from 0 to nonzero | `domain/pool.rs` - dedup branch of `add()` |
//! | Balance equals the sum of `unspent()` values | `domain/query.rs` - `balance()` |
//!
//! ## Ingestion Outcomes
//!
//! ```text
//!                 ┌── stale pending ──────────→ Expired   (pruned)
//!                 ├── known hash ─────────────→ Duplicate / Confirmed
//! add(tx) ────────┼── input fails verify ─────→ Rejected  (kept in `all`)
//!                 ├── no owned outputs ───────→ SpendOnly
//!                 └── owned outputs ──────────→ Added
//! ```
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - persistence writer, loader, in-memory store,       │
//! │              key wallet                                         │
//! │  events.rs - PoolEvent broadcast bus                            │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - WalletPoolApi trait                        │
//! │  ports/outbound.rs - PoolTransaction, WalletMatcher,            │
//! │                      KeyValueStore, TimeSource traits           │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs    - OutPoint, PoolConfig, AddOutcome       │
//! │  domain/transaction.rs - WalletTransaction (ed25519 inputs)     │
//! │  domain/pool.rs        - WalletTxPool ingestion engine          │
//! │  domain/orphans.rs     - OrphanIndex                            │
//! │  domain/query.rs       - all / unspent / pending / balance      │
//! │  domain/snapshot.rs    - versioned export / import              │
//! │  domain/errors.rs      - PoolError, StorageError                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use wallet_txpool::{KeyWallet, PoolConfig, WalletTxPool, InMemoryKVStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryKVStore::new());
//! let mut pool = WalletTxPool::with_storage(wallet, PoolConfig::for_wallet("w1/"), store);
//! let mut events = pool.subscribe();
//! pool.load().await?;
//!
//! pool.add(tx, false);
//! println!("balance: {}", pool.balance());
//! ```

pub mod adapters;
pub mod domain;
pub mod events;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_utils;

pub use adapters::*;
pub use domain::*;
pub use events::{PoolEvent, PoolEventBus};
pub use ports::*;
