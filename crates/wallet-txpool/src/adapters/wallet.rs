//! Key-set wallet matcher.
//!
//! Ownership is decided by public key: an output is the wallet's when it locks
//! to one of the wallet's keys, and an input is the wallet's when it is signed
//! with one of them.

use crate::domain::{PublicKey, WalletTransaction};
use crate::ports::WalletMatcher;
use std::collections::HashSet;

#[derive(Clone, Debug, Default)]
pub struct KeyWallet {
    keys: HashSet<PublicKey>,
}

impl KeyWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: impl IntoIterator<Item = PublicKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, key: PublicKey) -> bool {
        self.keys.insert(key)
    }

    pub fn owns_key(&self, key: &PublicKey) -> bool {
        self.keys.contains(key)
    }
}

impl WalletMatcher<WalletTransaction> for KeyWallet {
    fn owned_inputs(&self, tx: &WalletTransaction) -> Vec<usize> {
        tx.inputs()
            .iter()
            .enumerate()
            .filter(|(_, input)| self.keys.contains(&input.public_key))
            .map(|(index, _)| index)
            .collect()
    }

    fn owned_outputs(&self, tx: &WalletTransaction) -> Vec<usize> {
        tx.outputs()
            .iter()
            .enumerate()
            .filter(|(_, output)| self.keys.contains(&output.lock))
            .map(|(index, _)| index)
            .collect()
    }

    fn owns_output(&self, tx: &WalletTransaction, index: usize) -> bool {
        tx.outputs()
            .get(index)
            .map_or(false, |output| self.keys.contains(&output.lock))
    }
}
