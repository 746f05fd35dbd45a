use crate::error::StorageError;
use std::iter::Iterator;

/// A raw key/value pair as held by the record store
pub type Record = (Vec<u8>, Vec<u8>);

/// Iterator for traversing records in key order
pub trait RecordIterator: Iterator<Item = Result<Record, StorageError>> {}

impl<T> RecordIterator for T where T: Iterator<Item = Result<Record, StorageError>> {}

/// Ordered byte-keyed store supplied by the host
///
/// Implementations carry no business logic. Methods take `&self`; backends
/// synchronise internally so that a store handle can be shared between the
/// keeper and whatever host component owns the underlying database.
pub trait RecordStore {
    /// Get a record by its key
    ///
    /// # Returns
    /// Some(bytes) if found, None otherwise
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a record, replacing any previous value under the same key
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Check whether a key is present
    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove a record. Removing a missing key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), StorageError>;

    /// Create an iterator over every record in ascending key order
    ///
    /// Each call starts a fresh pass over the store.
    fn scan(&self) -> Box<dyn RecordIterator + '_>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        (**self).has(key)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        (**self).delete(key)
    }

    fn scan(&self) -> Box<dyn RecordIterator + '_> {
        (**self).scan()
    }
}
