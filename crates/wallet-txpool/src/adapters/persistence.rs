//! # Persistence Adapter
//!
//! Best-effort durable mirror of the pool.
//!
//! Ingestion never awaits storage. Each write or delete is queued to a
//! background writer task which applies operations in submission order and
//! reports failures as `PoolEvent::Error`. A failed write is not retried and
//! does not roll back the in-memory mutation that triggered it.
//!
//! ```text
//! add() ──store()/remove()──→ [mpsc queue] ──→ writer task ──→ KeyValueStore
//!                                                  │
//!                                                  └── failure ──→ PoolEvent::Error
//! ```

use crate::domain::{Hash, PoolConfig, PoolResult, StorageError};
use crate::events::{PoolEvent, PoolEventBus};
use crate::ports::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum WriteOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget writer for transaction records.
pub struct PersistenceAdapter {
    config: PoolConfig,
    store: Arc<dyn KeyValueStore>,
    events: Arc<PoolEventBus>,
    queue: mpsc::UnboundedSender<WriteOp>,
}

impl PersistenceAdapter {
    /// Starts the writer task.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn spawn(
        config: PoolConfig,
        store: Arc<dyn KeyValueStore>,
        events: Arc<PoolEventBus>,
    ) -> Self {
        let (queue, ops) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store.clone(), ops, events.clone()));
        Self {
            config,
            store,
            events,
            queue,
        }
    }

    /// The backing store, used by the loader for range scans.
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Queues a write of `tx` under its record key.
    pub fn store_tx<T: Serialize>(&self, hash: &Hash, tx: &T) {
        let value = match encode_record(tx) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "[txpool] Failed to encode record {}: {}",
                    hex::encode(hash),
                    err
                );
                self.events.publish(PoolEvent::Error {
                    message: err.to_string(),
                });
                return;
            }
        };
        self.submit(WriteOp::Put {
            key: self.config.record_key(hash),
            value,
        });
    }

    /// Queues deletion of the record for `hash`.
    pub fn remove_tx(&self, hash: &Hash) {
        self.submit(WriteOp::Delete {
            key: self.config.record_key(hash),
        });
    }

    /// Waits until every operation queued before this call has been applied
    /// (or has failed).
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.queue.send(WriteOp::Flush(ack)).is_err() {
            return;
        }
        let _ = done.await;
    }

    fn submit(&self, op: WriteOp) {
        if self.queue.send(op).is_err() {
            warn!("[txpool] Persistence writer is gone, dropping write");
            self.events.publish(PoolEvent::Error {
                message: StorageError::WriterClosed.to_string(),
            });
        }
    }
}

pub(crate) fn encode_record<T: Serialize>(tx: &T) -> PoolResult<Vec<u8>> {
    Ok(bincode::serialize(tx)?)
}

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    mut ops: mpsc::UnboundedReceiver<WriteOp>,
    events: Arc<PoolEventBus>,
) {
    while let Some(op) = ops.recv().await {
        let (action, key, result) = match op {
            WriteOp::Put { key, value } => {
                let result = store.put(&key, &value).await;
                ("put", key, result)
            }
            WriteOp::Delete { key } => {
                let result = store.delete(&key).await;
                ("delete", key, result)
            }
            WriteOp::Flush(ack) => {
                let _ = ack.send(());
                continue;
            }
        };
        if let Err(err) = result {
            warn!(
                "[txpool] Storage {} failed for {}: {}",
                action,
                String::from_utf8_lossy(&key),
                err
            );
            events.publish(PoolEvent::Error {
                message: err.to_string(),
            });
        }
    }
    debug!("[txpool] Persistence writer stopped");
}
