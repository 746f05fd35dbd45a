use crate::error::StorageError;
use crate::storage_traits::{RecordIterator, RecordStore};
use anyhow::Context;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::Arc,
};

// Column family holding one record per branded token slug
const CF_RECORDS: &str = "records";

/// RocksDB implementation of the record store
pub struct RocksDbStore {
    db: Arc<DB>,
    db_path: PathBuf,
}

impl RocksDbStore {
    /// Opens (or creates) a RocksDB store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db_path = path.as_ref().to_path_buf();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_records = ColumnFamilyDescriptor::new(CF_RECORDS, Options::default());

        let db = DB::open_cf_descriptors(&opts, &db_path, vec![cf_records])
            .with_context(|| format!("Failed to open RocksDB database at {:?}", db_path))?;

        log::debug!("opened rocksdb record store at {:?}", db_path);

        Ok(Self {
            db: Arc::new(db),
            db_path,
        })
    }

    fn records_cf(&self) -> Result<&ColumnFamily, StorageError> {
        self.db.cf_handle(CF_RECORDS).ok_or_else(|| {
            StorageError::Database("Records column family not found".to_string())
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

impl RecordStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let cf = self.records_cf()?;
        Ok(self.db.get_cf(cf, key)?)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let cf = self.records_cf()?;
        self.db
            .put_cf(cf, key, value)
            .with_context(|| {
                format!("Failed to store record {:?}", String::from_utf8_lossy(key))
            })?;
        Ok(())
    }

    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        let cf = self.records_cf()?;
        Ok(self.db.get_pinned_cf(cf, key)?.is_some())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        let cf = self.records_cf()?;
        self.db
            .delete_cf(cf, key)
            .with_context(|| {
                format!("Failed to delete record {:?}", String::from_utf8_lossy(key))
            })?;
        Ok(())
    }

    fn scan(&self) -> Box<dyn RecordIterator + '_> {
        let cf = match self.records_cf() {
            Ok(cf) => cf,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };

        Box::new(
            self.db
                .iterator_cf(cf, IteratorMode::Start)
                .map(|item| {
                    item.map(|(key, value)| (key.into_vec(), value.into_vec()))
                        .map_err(StorageError::from)
                }),
        )
    }
}

impl Debug for RocksDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksDbStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}
