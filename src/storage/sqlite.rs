use crate::error::StorageError;
use crate::storage_traits::{Record, RecordIterator, RecordStore};
use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::{
    collections::VecDeque,
    fmt::Debug,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};
use tokio::runtime::Runtime;

/// Number of rows fetched per round trip while scanning
const SCAN_PAGE_SIZE: i64 = 128;

/// A SQLite-backed record store using sqlx.
///
/// sqlx is async; the store owns a current-thread tokio runtime and blocks on
/// it so that callers see a plain synchronous interface.
pub struct SqliteStore {
    pool: SqlitePool,
    rt: Arc<Runtime>,
    db_path: PathBuf,
}

/// Iterator implementation for SQLite storage
///
/// Pages through the table by key so that the pass stays ordered without
/// holding a cursor open between steps.
pub struct SqliteStoreIterator {
    pool: SqlitePool,
    rt: Arc<Runtime>,
    last_key: Option<Vec<u8>>,
    buffer: VecDeque<Record>,
    exhausted: bool,
}

impl SqliteStore {
    /// Creates a new SQLite store at the given path, creating the file if needed
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db_path = path.as_ref().to_path_buf();
        let db_url = format!("sqlite:{}", db_path.to_string_lossy());

        // Create a runtime for async operations
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create runtime")?;
        let rt = Arc::new(rt);

        let options = SqliteConnectOptions::from_str(&db_url)
            .with_context(|| format!("Invalid database URL: {}", db_url))?
            .create_if_missing(true);

        let pool = rt
            .block_on(async {
                SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await
            })
            .with_context(|| format!("Failed to connect to database at {:?}", db_path))?;

        rt.block_on(Self::initialize_schema(&pool))
            .context("Failed to initialize database schema")?;

        log::debug!("opened sqlite record store at {:?}", db_path);

        Ok(Self { pool, rt, db_path })
    }

    /// Creates the records table
    async fn initialize_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS records (
                key BLOB PRIMARY KEY,
                value BLOB NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

impl SqliteStoreIterator {
    fn fetch_page(&mut self) -> Result<(), StorageError> {
        let pool = &self.pool;
        let last_key = self.last_key.clone();

        let rows = self.rt.block_on(async {
            match last_key {
                Some(key) => {
                    sqlx::query(
                        "SELECT key, value FROM records WHERE key > ? ORDER BY key LIMIT ?",
                    )
                    .bind(key)
                    .bind(SCAN_PAGE_SIZE)
                    .fetch_all(pool)
                    .await
                }
                None => {
                    sqlx::query("SELECT key, value FROM records ORDER BY key LIMIT ?")
                        .bind(SCAN_PAGE_SIZE)
                        .fetch_all(pool)
                        .await
                }
            }
        })?;

        if (rows.len() as i64) < SCAN_PAGE_SIZE {
            self.exhausted = true;
        }

        for row in rows {
            let key: Vec<u8> = row.get(0);
            let value: Vec<u8> = row.get(1);
            self.last_key = Some(key.clone());
            self.buffer.push_back((key, value));
        }

        Ok(())
    }
}

impl Iterator for SqliteStoreIterator {
    type Item = Result<Record, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }

        self.buffer.pop_front().map(Ok)
    }
}

impl RecordStore for SqliteStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.rt.block_on(async {
            let row = sqlx::query("SELECT value FROM records WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| {
                    format!("Failed to fetch record {:?}", String::from_utf8_lossy(key))
                })?;

            Ok::<_, StorageError>(row.map(|row| row.get::<Vec<u8>, _>(0)))
        })
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.rt.block_on(async {
            sqlx::query("INSERT OR REPLACE INTO records (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(value)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("Failed to store record {:?}", String::from_utf8_lossy(key))
                })?;

            Ok::<_, StorageError>(())
        })
    }

    fn has(&self, key: &[u8]) -> Result<bool, StorageError> {
        self.rt.block_on(async {
            let row = sqlx::query("SELECT 1 FROM records WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

            Ok::<_, StorageError>(row.is_some())
        })
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.rt.block_on(async {
            sqlx::query("DELETE FROM records WHERE key = ?")
                .bind(key)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("Failed to delete record {:?}", String::from_utf8_lossy(key))
                })?;

            Ok::<_, StorageError>(())
        })
    }

    fn scan(&self) -> Box<dyn RecordIterator + '_> {
        Box::new(SqliteStoreIterator {
            pool: self.pool.clone(),
            rt: self.rt.clone(),
            last_key: None,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }
}

impl Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_basic_storage_operations() {
        let temp_dir = tempdir().unwrap();
        let store = SqliteStore::new(temp_dir.path().join("records.db")).unwrap();

        assert_eq!(store.get(b"brand").unwrap(), None);
        assert!(!store.has(b"brand").unwrap());

        store.set(b"brand", &[1, 2, 3]).unwrap();
        assert_eq!(store.get(b"brand").unwrap(), Some(vec![1, 2, 3]));
        assert!(store.has(b"brand").unwrap());

        store.set(b"brand", &[4]).unwrap();
        assert_eq!(store.get(b"brand").unwrap(), Some(vec![4]));

        store.delete(b"brand").unwrap();
        assert!(!store.has(b"brand").unwrap());
    }

    #[test]
    fn test_scan_operations() {
        let temp_dir = tempdir().unwrap();
        let store = SqliteStore::new(temp_dir.path().join("scan.db")).unwrap();

        // Enough rows to cross a page boundary
        let total = SCAN_PAGE_SIZE as usize + 5;
        for i in (0..total).rev() {
            let key = format!("token-{:04}", i);
            store.set(key.as_bytes(), &[i as u8]).unwrap();
        }

        let keys: Vec<Vec<u8>> = store.scan().map(|r| r.unwrap().0).collect();
        assert_eq!(keys.len(), total);
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(keys[0], b"token-0000".to_vec());
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("reopen.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.set(b"kept", b"value").unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.get(b"kept").unwrap(), Some(b"value".to_vec()));
    }
}
