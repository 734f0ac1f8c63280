//! # Wallet Transaction
//!
//! The `PoolTransaction` shipped with the crate.
//!
//! - Outputs lock to an ed25519 public key.
//! - Inputs carry the spender's public key and a signature over the
//!   transaction hash.
//! - The hash is a double SHA-256 over lock time, outpoints and outputs, so
//!   signatures (and confirmation metadata) do not change it.
//!
//! An input verifies when the bound previous output locks to the input's key
//! and the signature is valid for that key.

use super::entities::{Hash, OutPoint, Timestamp, U256};
use crate::ports::PoolTransaction;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 32-byte ed25519 public key.
pub type PublicKey = [u8; 32];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Output being spent.
    pub prevout: OutPoint,
    /// Key the spent output is expected to lock to.
    pub public_key: PublicKey,
    /// ed25519 signature over the transaction hash (64 bytes when signed).
    pub signature: Vec<u8>,
}

impl TxInput {
    /// Input with no key or signature yet.
    pub fn unsigned(prevout: OutPoint) -> Self {
        Self {
            prevout,
            public_key: [0; 32],
            signature: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: U256,
    /// Public key allowed to spend this output.
    pub lock: PublicKey,
}

impl TxOutput {
    pub fn new(value: impl Into<U256>, lock: PublicKey) -> Self {
        Self {
            value: value.into(),
            lock,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletTransaction {
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    lock_time: u32,
    /// Confirmation timestamp (0 = pending).
    ts: Timestamp,
    /// First-seen timestamp.
    ps: Timestamp,
    block: Option<Hash>,
    // Previous outputs bound for verification, one slot per input.
    #[serde(skip)]
    bound: Vec<Option<TxOutput>>,
}

impl WalletTransaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            inputs,
            outputs,
            lock_time: 0,
            ts: 0,
            ps: 0,
            block: None,
            bound: Vec::new(),
        }
    }

    pub fn with_lock_time(mut self, lock_time: u32) -> Self {
        self.lock_time = lock_time;
        self
    }

    /// Marks the transaction as first seen at `ps`.
    pub fn seen_at(mut self, ps: Timestamp) -> Self {
        self.ps = ps;
        self
    }

    /// Marks the transaction as confirmed at `ts` in `block`.
    pub fn confirmed(mut self, ts: Timestamp, block: Hash) -> Self {
        self.ts = ts;
        self.block = Some(block);
        self
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.lock_time
    }

    /// Signs input `index` with `key`, setting its public key and signature.
    ///
    /// Returns false if the input does not exist.
    pub fn sign_input(&mut self, index: usize, key: &SigningKey) -> bool {
        let hash = self.compute_hash();
        match self.inputs.get_mut(index) {
            Some(input) => {
                input.public_key = key.verifying_key().to_bytes();
                input.signature = key.sign(&hash).to_bytes().to_vec();
                true
            }
            None => false,
        }
    }

    fn compute_hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.lock_time.to_le_bytes());
        hasher.update((self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            hasher.update(input.prevout.hash);
            hasher.update(input.prevout.index.to_le_bytes());
        }
        hasher.update((self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            let mut value = [0u8; 32];
            output.value.to_big_endian(&mut value);
            hasher.update(value);
            hasher.update(output.lock);
        }
        let first = hasher.finalize();
        Sha256::digest(first).into()
    }
}

impl PoolTransaction for WalletTransaction {
    type Output = TxOutput;

    fn hash(&self) -> Hash {
        self.compute_hash()
    }

    fn ts(&self) -> Timestamp {
        self.ts
    }

    fn ps(&self) -> Timestamp {
        self.ps
    }

    fn block(&self) -> Option<Hash> {
        self.block
    }

    fn set_confirmation(&mut self, ts: Timestamp, block: Option<Hash>) {
        self.ts = ts;
        self.block = block;
    }

    fn prevouts(&self) -> Vec<OutPoint> {
        self.inputs.iter().map(|input| input.prevout).collect()
    }

    fn output_count(&self) -> usize {
        self.outputs.len()
    }

    fn output(&self, index: usize) -> Option<&TxOutput> {
        self.outputs.get(index)
    }

    fn output_value(&self, index: usize) -> Option<U256> {
        self.outputs.get(index).map(|output| output.value)
    }

    fn bind_previous_output(&mut self, input_index: usize, output: TxOutput) {
        if input_index >= self.inputs.len() {
            return;
        }
        if self.bound.len() < self.inputs.len() {
            self.bound.resize(self.inputs.len(), None);
        }
        self.bound[input_index] = Some(output);
    }

    fn verify_input(&self, input_index: usize) -> bool {
        let (Some(input), Some(Some(previous))) =
            (self.inputs.get(input_index), self.bound.get(input_index))
        else {
            return false;
        };
        if previous.lock != input.public_key {
            return false;
        }
        let Ok(key) = VerifyingKey::from_bytes(&input.public_key) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&input.signature) else {
            return false;
        };
        key.verify(&self.compute_hash(), &signature).is_ok()
    }
}
