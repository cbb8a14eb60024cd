use axum::body::Body;
use axum::http::{HeaderMap, Method, StatusCode};
use tracing::{debug, warn};

use crate::protocol::list::ListCmd;
use crate::protocol::replace::ReplaceCmd;
use crate::protocol::response::Reply;
use crate::server::AppState;
use crate::store::KvStore;

pub const KV_NOT_CONFIGURED: &str = "KV binding PRODUCTS_KV is not configured";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// Requests understood by the products route
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// OPTIONS
    Preflight,
    /// GET
    List(ListCmd),
    /// PUT
    Replace(ReplaceCmd),
    /// Any other method
    Unsupported(Method),
}

impl Command {
    /// Parse a request line and headers into a Command
    pub fn parse(method: &Method, headers: &HeaderMap) -> Self {
        match *method {
            Method::OPTIONS => Command::Preflight,
            Method::GET => Command::List(ListCmd),
            Method::PUT => Command::Replace(ReplaceCmd::parse(headers)),
            _ => Command::Unsupported(method.clone()),
        }
    }

    /// Execute the command against the shared state.
    ///
    /// Preflight is answered before the store binding is checked; every
    /// other method needs the binding first.
    pub async fn execute(self, state: &AppState, body: Body) -> Reply {
        match self {
            Command::Preflight => Reply::preflight(),
            Command::List(cmd) => match bound_store(state) {
                Ok(store) => cmd.execute(store).await,
                Err(reply) => reply,
            },
            Command::Replace(cmd) => match bound_store(state) {
                Ok(store) => {
                    cmd.execute(store, &state.admin_key, body, state.max_body_bytes)
                        .await
                }
                Err(reply) => reply,
            },
            Command::Unsupported(method) => match bound_store(state) {
                Ok(_) => {
                    debug!("Unsupported method {}", method);
                    Reply::error(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
                }
                Err(reply) => reply,
            },
        }
    }
}

/// The configured store, or the configuration error reply
fn bound_store(state: &AppState) -> Result<&dyn KvStore, Reply> {
    state.store.as_deref().ok_or_else(|| {
        warn!("Rejecting request: store binding is not configured");
        Reply::error(StatusCode::INTERNAL_SERVER_ERROR, KV_NOT_CONFIGURED)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::replace::ADMIN_KEY_HEADER;
    use crate::protocol::test_support::{TEST_ADMIN_KEY, test_state};
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_parse_methods() {
        let headers = HeaderMap::new();
        assert_eq!(Command::parse(&Method::OPTIONS, &headers), Command::Preflight);
        assert_eq!(Command::parse(&Method::GET, &headers), Command::List(ListCmd));
        assert_eq!(
            Command::parse(&Method::DELETE, &headers),
            Command::Unsupported(Method::DELETE)
        );
    }

    #[test]
    fn test_parse_put_reads_admin_key() {
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_KEY_HEADER, HeaderValue::from_static("k"));

        match Command::parse(&Method::PUT, &headers) {
            Command::Replace(cmd) => assert_eq!(cmd.provided_key.as_deref(), Some("k")),
            other => panic!("Expected PUT command, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let state = test_state(true);
        for method in [Method::DELETE, Method::POST, Method::PATCH] {
            let reply = Command::Unsupported(method).execute(&state, Body::empty()).await;
            assert_eq!(reply.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(reply.body(), Some(&json!({"error": METHOD_NOT_ALLOWED})));
        }
    }

    #[tokio::test]
    async fn test_missing_store_binding() {
        let state = test_state(false);

        let preflight = Command::Preflight.execute(&state, Body::empty()).await;
        assert_eq!(preflight, Reply::preflight());

        for cmd in [
            Command::List(ListCmd),
            Command::Replace(ReplaceCmd::new(Some(TEST_ADMIN_KEY.to_string()))),
            Command::Unsupported(Method::DELETE),
        ] {
            let reply = cmd.execute(&state, Body::from("[]")).await;
            assert_eq!(reply.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(reply.body(), Some(&json!({"error": KV_NOT_CONFIGURED})));
        }
    }

    #[tokio::test]
    async fn test_replace_then_list() {
        let state = test_state(true);
        let products = json!([{"id": "a", "tags": ["x"]}, {"id": "a", "price": 1.5}]);

        let put = Command::Replace(ReplaceCmd::new(Some(TEST_ADMIN_KEY.to_string())))
            .execute(&state, Body::from(products.to_string()))
            .await;
        assert_eq!(put.status(), StatusCode::OK);

        let get = Command::List(ListCmd).execute(&state, Body::empty()).await;
        assert_eq!(get.body(), Some(&products));
    }
}
