//! RocksDB-backed store
//!
//! RocksDB calls block, so every operation runs on the blocking pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{DB, Options};
use tracing::info;

use super::{KvStore, StoreError, StoreResult};

/// Persistent key-value store on a local RocksDB instance
pub struct RockStore {
    db: Arc<DB>,
}

impl RockStore {
    /// Open the database at `path`, creating it if missing
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path).map_err(|e| StoreError::Backend {
            message: format!("failed to open RocksDB at {}: {}", path.display(), e),
        })?;
        info!("RocksDB opened at {}", path.display());

        Ok(Self { db: Arc::new(db) })
    }
}

fn join_error(e: tokio::task::JoinError) -> StoreError {
    StoreError::Task {
        message: e.to_string(),
    }
}

fn backend_error(e: rocksdb::Error) -> StoreError {
    StoreError::Backend {
        message: e.to_string(),
    }
}

#[async_trait]
impl KvStore for RockStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || -> StoreResult<Option<String>> {
            let Some(bytes) = db.get(key.as_bytes()).map_err(backend_error)? else {
                return Ok(None);
            };
            String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StoreError::InvalidUtf8 { key })
        })
        .await
        .map_err(join_error)?
    }

    async fn put(&self, key: &str, value: String) -> StoreResult<()> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            db.put(key.as_bytes(), value.as_bytes())
                .map_err(backend_error)
        })
        .await
        .map_err(join_error)?
    }

    fn backend(&self) -> &'static str {
        "rocksdb"
    }
}
