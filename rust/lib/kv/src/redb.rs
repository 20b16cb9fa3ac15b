use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust embedded
/// key-value database.
///
/// redb serializes write transactions, so `compare_and_swap` is atomic with
/// respect to every other writer sharing this handle. The database file is
/// locked by redb while open, which keeps a second process from opening it.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(KVError::storage)?;
            }
        }
        let db = Database::create(path).map_err(KVError::storage)?;

        // Ensure the table exists by doing a write transaction.
        let write_txn = db.begin_write().map_err(KVError::storage)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
        }
        write_txn.commit().map_err(KVError::storage)?;

        debug!("RedbStore: opened {:?}", path);
        Ok(Self { db: Arc::new(db) })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(KVError::storage)?;
        let table = read_txn.open_table(TABLE).map_err(KVError::storage)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(KVError::storage(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
            table.insert(key, value).map_err(KVError::storage)?;
        }
        write_txn.commit().map_err(KVError::storage)?;
        Ok(())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        let swapped = {
            let mut table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
            let current = table
                .get(key)
                .map_err(KVError::storage)?
                .map(|v| v.value().to_vec());

            if current.as_deref() == expected {
                table.insert(key, new).map_err(KVError::storage)?;
                true
            } else {
                false
            }
        };

        if swapped {
            write_txn.commit().map_err(KVError::storage)?;
        } else {
            write_txn.abort().map_err(KVError::storage)?;
            debug!("RedbStore: compare_and_swap lost on key {}", key);
        }
        Ok(swapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, RedbStore) {
        let tmp = TempDir::new().unwrap();
        let store = RedbStore::open(&tmp.path().join("test.redb")).unwrap();
        (tmp, store)
    }

    #[test]
    fn set_then_get() {
        let (_tmp, store) = open_tmp();
        assert_eq!(store.get("seq:counters").unwrap(), None);

        store.set("seq:counters", b"{}").unwrap();
        assert_eq!(store.get("seq:counters").unwrap(), Some(b"{}".to_vec()));

        store.set("seq:counters", br#"{"100":1}"#).unwrap();
        assert_eq!(store.get("seq:counters").unwrap(), Some(br#"{"100":1}"#.to_vec()));
    }

    #[test]
    fn compare_and_swap_absent_key() {
        let (_tmp, store) = open_tmp();
        assert!(store.compare_and_swap("k", None, b"v1").unwrap());
        // Key now exists, expecting absence must fail.
        assert!(!store.compare_and_swap("k", None, b"v2").unwrap());
        assert_eq!(store.get("k").unwrap(), Some(b"v1".to_vec()));
    }

    #[test]
    fn compare_and_swap_stale_expectation() {
        let (_tmp, store) = open_tmp();
        store.set("k", b"v1").unwrap();
        assert!(store.compare_and_swap("k", Some(b"v1"), b"v2").unwrap());
        assert!(!store.compare_and_swap("k", Some(b"v1"), b"v3").unwrap());
        assert_eq!(store.get("k").unwrap(), Some(b"v2".to_vec()));
    }

    #[test]
    fn reopen_keeps_data() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("test.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.set("k", b"durable").unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"durable".to_vec()));
    }
}
