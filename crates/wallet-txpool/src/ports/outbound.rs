//! Outbound (Driven) ports for the wallet transaction pool.
//!
//! These traits define the external collaborators the pool consumes: the
//! transaction codec and verifier, the wallet's ownership matcher, the
//! key-value store and a clock.

use crate::domain::{Hash, OutPoint, StorageError, Timestamp, U256};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Transaction capability.
///
/// The pool never inspects scripts. It reads hashes, outpoints and values,
/// binds previous outputs to inputs and asks for a per-input verdict.
/// Snapshot / restore is serde: the same encoding backs durable records and
/// the export envelope.
pub trait PoolTransaction: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Output type handed to `bind_previous_output`.
    type Output: Clone + Send + Sync;

    /// Content hash identifying the transaction.
    fn hash(&self) -> Hash;

    /// Confirmation timestamp, 0 while pending.
    fn ts(&self) -> Timestamp;

    /// First-seen timestamp.
    fn ps(&self) -> Timestamp;

    /// Block the transaction was confirmed in.
    fn block(&self) -> Option<Hash>;

    /// Records confirmation data on an existing record.
    fn set_confirmation(&mut self, ts: Timestamp, block: Option<Hash>);

    /// Outputs referenced by each input, in input order.
    fn prevouts(&self) -> Vec<OutPoint>;

    /// Number of outputs.
    fn output_count(&self) -> usize;

    /// Output at `index`.
    fn output(&self, index: usize) -> Option<&Self::Output>;

    /// Value of the output at `index`.
    fn output_value(&self, index: usize) -> Option<U256>;

    /// Attaches the output spent by input `input_index` so it can be verified.
    fn bind_previous_output(&mut self, input_index: usize, output: Self::Output);

    /// Verifies input `input_index` against its bound previous output.
    ///
    /// Returns false when nothing is bound.
    fn verify_input(&self, input_index: usize) -> bool;
}

/// Wallet ownership capability.
pub trait WalletMatcher<T: PoolTransaction>: Send + Sync {
    /// Indices of inputs that spend the wallet's outputs.
    fn owned_inputs(&self, tx: &T) -> Vec<usize>;

    /// Indices of outputs paying the wallet.
    fn owned_outputs(&self, tx: &T) -> Vec<usize>;

    /// Membership test for a single output.
    fn owns_output(&self, tx: &T, index: usize) -> bool {
        self.owned_outputs(tx).contains(&index)
    }
}

/// Abstract interface for key-value database operations.
///
/// All writes are awaited by the persistence writer only, never by
/// ingestion.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Put a single key-value pair.
    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.
    async fn delete(&self, key: &[u8]) -> Result<(), StorageError>;

    /// Stream the values of every key in `start..=end`, in key order.
    ///
    /// An `Err` item ends the useful part of the stream.
    fn scan(&self, start: &[u8], end: &[u8]) -> BoxStream<'static, Result<Vec<u8>, StorageError>>;
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in seconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Controllable time source for tests and replay tooling.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    time: std::sync::atomic::AtomicU64,
}

impl MockTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: std::sync::atomic::AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.time
            .fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, std::sync::atomic::Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_source() {
        let source = SystemTimeSource;
        let now = source.now();

        // Should be a reasonable timestamp (after year 2020)
        assert!(now > 1_577_836_800);
    }

    #[test]
    fn test_mock_time_source() {
        let source = MockTimeSource::new(1000);
        assert_eq!(source.now(), 1000);

        source.advance(500);
        assert_eq!(source.now(), 1500);

        source.set(3000);
        assert_eq!(source.now(), 3000);
    }

    fn _assert_store_object_safe(_: &dyn KeyValueStore) {}
    fn _assert_time_object_safe(_: &dyn TimeSource) {}
}
