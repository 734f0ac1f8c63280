//! Adapters Layer
//!
//! Concrete implementations of the outbound ports plus the storage-facing
//! parts of the pool (persistence writer and bulk loader).

pub mod loader;
pub mod persistence;
pub mod storage;
pub mod wallet;

pub use loader::decode_record;
pub use persistence::PersistenceAdapter;
pub use storage::InMemoryKVStore;
pub use wallet::KeyWallet;
