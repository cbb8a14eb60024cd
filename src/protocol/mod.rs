//! Products HTTP protocol
//!
//! This module turns a request into a [`Command`], runs it against the
//! store and renders the [`Reply`] with the fixed CORS headers.

pub mod command;
pub mod list;
pub mod replace;
pub mod response;

pub use command::Command;
pub use response::Reply;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::server::AppState;
    use crate::store::{KvStore, MemoryStore, StoreError, StoreResult};

    /// Admin secret used only by tests
    pub const TEST_ADMIN_KEY: &str = "test-admin-key";

    /// Store whose every call fails
    pub struct FailingStore;

    #[async_trait]
    impl KvStore for FailingStore {
        async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Backend {
                message: "disk unavailable".to_string(),
            })
        }

        async fn put(&self, _key: &str, _value: String) -> StoreResult<()> {
            Err(StoreError::Backend {
                message: "disk unavailable".to_string(),
            })
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    pub fn test_state(with_store: bool) -> AppState {
        let store: Option<Arc<dyn KvStore>> = if with_store {
            Some(Arc::new(MemoryStore::new()))
        } else {
            None
        };
        AppState::new(store, TEST_ADMIN_KEY, 64 * 1024)
    }
}
