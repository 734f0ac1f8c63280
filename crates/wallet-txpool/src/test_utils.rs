//! Shared fixtures for unit tests.

use crate::adapters::KeyWallet;
use crate::domain::{OutPoint, PoolConfig, Timestamp, TxInput, TxOutput, WalletTransaction, WalletTxPool};
use crate::ports::{MockTimeSource, PoolTransaction};
use ed25519_dalek::SigningKey;
use std::sync::Arc;

pub type TestPool = WalletTxPool<WalletTransaction, KeyWallet>;

/// Fixed "now" for deterministic staleness checks.
pub const NOW: Timestamp = 1_700_000_000;

pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

pub fn public_key(key: &SigningKey) -> [u8; 32] {
    key.verifying_key().to_bytes()
}

pub fn wallet(keys: &[&SigningKey]) -> KeyWallet {
    KeyWallet::from_keys(keys.iter().map(|k| public_key(k)))
}

/// Storage-less pool owning `keys`, clock pinned at `NOW`.
pub fn test_pool(keys: &[&SigningKey]) -> TestPool {
    WalletTxPool::new(wallet(keys), PoolConfig::for_testing())
        .with_time_source(Arc::new(MockTimeSource::new(NOW)))
}

/// Coinbase-like transaction paying `value` to `owner`. `nonce` varies the hash.
pub fn funding_tx(owner: &SigningKey, value: u64, nonce: u32) -> WalletTransaction {
    WalletTransaction::new(vec![], vec![TxOutput::new(value, public_key(owner))])
        .with_lock_time(nonce)
        .seen_at(NOW)
}

/// Spends `parent`'s output `index`, signed by `signer`.
pub fn spend_tx(
    parent: &WalletTransaction,
    index: u32,
    signer: &SigningKey,
    outputs: &[(u64, &SigningKey)],
) -> WalletTransaction {
    let outputs = outputs
        .iter()
        .map(|(value, to)| TxOutput::new(*value, public_key(to)))
        .collect();
    let mut tx = WalletTransaction::new(
        vec![TxInput::unsigned(OutPoint::new(parent.hash(), index))],
        outputs,
    )
    .seen_at(NOW);
    tx.sign_input(0, signer);
    tx
}
