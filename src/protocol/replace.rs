use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::product::{PRODUCTS_KEY, Product, ProductCollection};
use crate::protocol::response::Reply;
use crate::store::KvStore;

/// Header carrying the shared admin secret
pub const ADMIN_KEY_HEADER: HeaderName = HeaderName::from_static("x-admin-key");

pub const UNAUTHORIZED: &str = "Unauthorized - Invalid admin key";

/// PUT: replace the whole collection after checking the admin key
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceCmd {
    /// Value of `X-Admin-Key` decoded as UTF-8, `None` if absent or undecodable
    pub provided_key: Option<String>,
}

impl ReplaceCmd {
    /// Create a new PUT command
    pub fn new(provided_key: Option<String>) -> Self {
        Self { provided_key }
    }

    /// Parse PUT command from request headers
    pub fn parse(headers: &HeaderMap) -> Self {
        let provided_key = headers
            .get(&ADMIN_KEY_HEADER)
            .and_then(|v| String::from_utf8(v.as_bytes().to_vec()).ok());
        Self::new(provided_key)
    }

    /// Exact comparison; an empty header never authorizes
    fn is_authorized(&self, admin_key: &str) -> bool {
        matches!(self.provided_key.as_deref(), Some(key) if !key.is_empty() && key == admin_key)
    }

    /// Execute the PUT command.
    ///
    /// `body` is read only once the key matched, and nothing is written
    /// unless every product is valid.
    pub async fn execute(
        &self,
        store: &dyn KvStore,
        admin_key: &str,
        body: Body,
        max_body_bytes: usize,
    ) -> Reply {
        if !self.is_authorized(admin_key) {
            warn!("Rejected product write: invalid admin key");
            return Reply::error(StatusCode::UNAUTHORIZED, UNAUTHORIZED);
        }

        let bytes = match axum::body::to_bytes(body, max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(e) => return save_failed(e),
        };

        let value: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => return save_failed(e),
        };

        let products = match ProductCollection::from_json(value) {
            Ok(products) => products,
            Err(e) => return Reply::error(StatusCode::BAD_REQUEST, e.to_string()),
        };

        let blob = match products.to_json() {
            Ok(blob) => blob,
            Err(e) => return save_failed(e),
        };

        debug!(
            "Saving product ids: {:?}",
            products.iter().map(Product::id).collect::<Vec<_>>()
        );
        if let Err(e) = store.put(PRODUCTS_KEY, blob).await {
            error!("Failed to write '{}' to {}: {}", PRODUCTS_KEY, store.backend(), e);
            return save_failed(e);
        }

        let count = products.len();
        if products.is_empty() {
            info!("Cleared product collection");
        } else {
            info!("Saved {} products", count);
        }
        Reply::json(json!({
            "ok": true,
            "count": count,
            "message": format!("Successfully saved {} products", count),
        }))
    }
}

fn save_failed(e: impl std::fmt::Display) -> Reply {
    Reply::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to save products: {}", e),
    )
}
