use crate::error::StorageError;
use crate::storage::{MemoryStore, RecordStore};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default module name, also used as router and querier key
pub const DEFAULT_MODULE_NAME: &str = "surprise";

/// Default human readable prefix for account addresses
pub const DEFAULT_ADDRESS_PREFIX: &str = "sand";

/// Where the module keeps its records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Records live only as long as the process
    Memory,
    /// SQLite database file
    Sqlite { path: PathBuf },
    /// RocksDB directory
    RocksDb { path: PathBuf },
}

/// Module configuration, built once by the host and handed to the keeper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Name used in events and as the logging target suffix
    pub module_name: String,
    /// Route key messages are dispatched on
    pub router_key: String,
    /// Route key queries are dispatched on
    pub querier_route: String,
    /// Prefix used when rendering account addresses
    pub address_prefix: String,
    pub store: StoreConfig,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            router_key: DEFAULT_MODULE_NAME.to_string(),
            querier_route: DEFAULT_MODULE_NAME.to_string(),
            address_prefix: DEFAULT_ADDRESS_PREFIX.to_string(),
            store: StoreConfig::Memory,
        }
    }
}

impl ModuleConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Logging target for this module, e.g. `x/surprise`
    pub fn log_target(&self) -> String {
        format!("x/{}", self.module_name)
    }

    /// Open the configured record store
    pub fn open_store(&self) -> Result<Box<dyn RecordStore>, StorageError> {
        match &self.store {
            StoreConfig::Memory => Ok(Box::new(MemoryStore::new())),
            #[cfg(feature = "sqlite")]
            StoreConfig::Sqlite { path } => Ok(Box::new(crate::storage::SqliteStore::new(path)?)),
            #[cfg(not(feature = "sqlite"))]
            StoreConfig::Sqlite { .. } => Err(StorageError::Other(
                "built without the `sqlite` feature".to_string(),
            )),
            #[cfg(feature = "rocksdb")]
            StoreConfig::RocksDb { path } => Ok(Box::new(crate::storage::RocksDbStore::new(path)?)),
            #[cfg(not(feature = "rocksdb"))]
            StoreConfig::RocksDb { .. } => Err(StorageError::Other(
                "built without the `rocksdb` feature".to_string(),
            )),
        }
    }
}
