use crate::error::StorageError;
use crate::storage_traits::{Record, RecordIterator, RecordStore};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Records = BTreeMap<Vec<u8>, Vec<u8>>;

/// In-process ordered record store
///
/// Cloning the store yields another handle onto the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Records>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>, StorageError> {
        self.records
            .read()
            .map_err(|e| StorageError::Database(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>, StorageError> {
        self.records
            .write()
            .map_err(|e| StorageError::Database(format!("Failed to acquire write lock: {}", e)))
    }
}

/// Cursor over a [`MemoryStore`]
///
/// The lock is only held while a single step is taken, so writers are never
/// blocked by a pending iteration. Each step resumes strictly after the last
/// key returned.
pub struct MemoryStoreIterator<'a> {
    store: &'a MemoryStore,
    last_key: Option<Vec<u8>>,
    done: bool,
}

impl Iterator for MemoryStoreIterator<'_> {
    type Item = Result<Record, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let records = match self.store.read() {
            Ok(records) => records,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let lower = match &self.last_key {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Unbounded,
        };

        match records.range((lower, Bound::Unbounded)).next() {
            Some((key, value)) => {
                self.last_key = Some(key.clone());
                Some(Ok((key.clone(), value.clone())))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.write()?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.read()?.contains_key(key))
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.write()?.remove(key);
        Ok(())
    }

    fn scan(&self) -> Box<dyn RecordIterator + '_> {
        Box::new(MemoryStoreIterator {
            store: self,
            last_key: None,
            done: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_storage_operations() {
        let store = MemoryStore::new();

        assert_eq!(store.get(b"alpha").unwrap(), None);
        assert!(!store.has(b"alpha").unwrap());

        store.set(b"alpha", b"1").unwrap();
        assert_eq!(store.get(b"alpha").unwrap(), Some(b"1".to_vec()));
        assert!(store.has(b"alpha").unwrap());

        store.set(b"alpha", b"2").unwrap();
        assert_eq!(store.get(b"alpha").unwrap(), Some(b"2".to_vec()));

        store.delete(b"alpha").unwrap();
        assert!(!store.has(b"alpha").unwrap());

        // Deleting again is fine
        store.delete(b"alpha").unwrap();
    }

    #[test]
    fn test_scan_is_ordered_and_restartable() {
        let store = MemoryStore::new();
        for key in ["charlie", "alpha", "bravo"] {
            store.set(key.as_bytes(), b"x").unwrap();
        }

        let keys: Vec<Vec<u8>> = store.scan().map(|r| r.unwrap().0).collect();
        assert_eq!(
            keys,
            vec![b"alpha".to_vec(), b"bravo".to_vec(), b"charlie".to_vec()]
        );

        // A fresh call yields a fresh pass
        assert_eq!(store.scan().count(), 3);
    }

    #[test]
    fn test_scan_does_not_block_writers() {
        let store = MemoryStore::new();
        store.set(b"a", b"1").unwrap();
        store.set(b"c", b"3").unwrap();

        let mut iter = store.scan();
        assert_eq!(iter.next().unwrap().unwrap().0, b"a".to_vec());

        // Writes between steps are visible to the remainder of the pass
        store.set(b"b", b"2").unwrap();
        assert_eq!(iter.next().unwrap().unwrap().0, b"b".to_vec());
        assert_eq!(iter.next().unwrap().unwrap().0, b"c".to_vec());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_clones_share_records() {
        let store = MemoryStore::new();
        let handle = store.clone();

        handle.set(b"k", b"v").unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert!(!store.is_empty().unwrap());
    }
}
