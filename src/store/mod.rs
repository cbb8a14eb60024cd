//! Key-value store backends
//!
//! The service only ever needs two operations: read a value by key and
//! overwrite a value by key. Backends decide durability; concurrent writers
//! race and the last write wins.

mod memory;
mod rocks;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{KvBackend, KvConfig};

pub use memory::MemoryStore;
pub use rocks::RockStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,

    #[error("storage backend error: {message}")]
    Backend { message: String },

    #[error("value under key '{key}' is not valid UTF-8")]
    InvalidUtf8 { key: String },

    #[error("storage task failed: {message}")]
    Task { message: String },

    #[error("storage path is not configured")]
    MissingPath,
}

/// Minimal key-value interface used by the request handlers
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Read the value stored under `key`, `None` if it was never written
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace whatever is stored under `key`
    async fn put(&self, key: &str, value: String) -> StoreResult<()>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// Open the backend described by `config`
pub fn open(config: &KvConfig) -> StoreResult<Arc<dyn KvStore>> {
    match config.backend {
        KvBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        KvBackend::Rocksdb => {
            let path = config.data_path.as_deref().ok_or(StoreError::MissingPath)?;
            Ok(Arc::new(RockStore::open(path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_backend() {
        let config = KvConfig {
            backend: KvBackend::Memory,
            data_path: None,
        };
        let store = open(&config).unwrap();
        assert_eq!(store.backend(), "memory");
        assert_eq!(store.get("products").await.unwrap(), None);
    }

    #[test]
    fn test_open_rocksdb_requires_path() {
        let config = KvConfig {
            backend: KvBackend::Rocksdb,
            data_path: None,
        };
        assert!(matches!(open(&config), Err(StoreError::MissingPath)));
    }

    #[tokio::test]
    async fn test_open_rocksdb_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = KvConfig {
            backend: KvBackend::Rocksdb,
            data_path: Some(dir.path().to_string_lossy().into_owned()),
        };
        let store = open(&config).unwrap();
        assert_eq!(store.backend(), "rocksdb");
    }
}
