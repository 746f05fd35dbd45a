// Re-export the storage trait
pub use crate::storage_traits::{Record, RecordIterator, RecordStore};

// Export implementations
mod memory;
pub use memory::{MemoryStore, MemoryStoreIterator};

#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteStore, SqliteStoreIterator};

#[cfg(feature = "rocksdb")]
mod rocksdb;
#[cfg(feature = "rocksdb")]
pub use rocksdb::RocksDbStore;
