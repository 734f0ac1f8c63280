use crate::domain::StorageError;
use crate::ports::KeyValueStore;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory key-value store.
///
/// Ordered like a real LSM store so range scans return keys in order.
/// Faults can be injected to exercise the error paths of persistence and
/// loading.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    fail_writes: AtomicBool,
    fail_scan_after: Mutex<Option<usize>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent put / delete fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes scans yield `count` values and then an error.
    pub fn fail_scan_after(&self, count: Option<usize>) {
        *self.fail_scan_after.lock() = count;
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.data.read().contains_key(key)
    }

    /// Inserts directly, bypassing fault injection.
    pub fn insert_raw(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.data.write().insert(key.into(), value.into());
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                message: "injected write failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKVStore {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.check_writable()?;
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.check_writable()?;
        self.data.write().remove(key);
        Ok(())
    }

    fn scan(&self, start: &[u8], end: &[u8]) -> BoxStream<'static, Result<Vec<u8>, StorageError>> {
        if start > end {
            return stream::empty().boxed();
        }
        let values: Vec<Vec<u8>> = self
            .data
            .read()
            .range(start.to_vec()..=end.to_vec())
            .map(|(_, v)| v.clone())
            .collect();

        match *self.fail_scan_after.lock() {
            Some(count) => {
                let failure = StorageError::Scan {
                    message: format!("injected scan failure after {} records", count),
                };
                stream::iter(values.into_iter().take(count).map(Ok))
                    .chain(stream::once(async move { Err(failure) }))
                    .boxed()
            }
            None => stream::iter(values.into_iter().map(Ok)).boxed(),
        }
    }
}
