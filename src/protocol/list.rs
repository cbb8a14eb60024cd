use axum::http::StatusCode;
use serde_json::Value;
use tracing::error;

use crate::product::PRODUCTS_KEY;
use crate::protocol::response::Reply;
use crate::store::KvStore;

pub const FETCH_FAILED: &str = "Failed to fetch products";

/// GET: return the stored collection as-is
#[derive(Debug, Clone, PartialEq)]
pub struct ListCmd;

impl ListCmd {
    /// Execute the GET command
    pub async fn execute(&self, store: &dyn KvStore) -> Reply {
        let raw = match store.get(PRODUCTS_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to read '{}' from {}: {}", PRODUCTS_KEY, store.backend(), e);
                return Reply::error(StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED);
            }
        };

        let products = match raw.as_deref() {
            None | Some("") => Value::Array(Vec::new()),
            Some(text) => match serde_json::from_str::<Value>(text) {
                Ok(value) => value,
                Err(e) => {
                    error!("Stored '{}' is not valid JSON: {}", PRODUCTS_KEY, e);
                    return Reply::error(StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED);
                }
            },
        };

        Reply::json(products).no_store()
    }
}
