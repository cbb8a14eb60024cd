use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

/// CORS headers attached to every response
pub const CORS_HEADERS: [(header::HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, PUT, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, X-Admin-Key"),
];

const NO_STORE: &str = "no-cache, no-store, must-revalidate";

/// A finished response for the products route
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    body: Option<Value>,
    no_store: bool,
}

impl Reply {
    /// Empty 200 carrying only the CORS headers
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
            no_store: false,
        }
    }

    /// 200 with a JSON body
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
            no_store: false,
        }
    }

    /// Error envelope `{"error": msg}`
    pub fn error(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(json!({ "error": msg.into() })),
            no_store: false,
        }
    }

    /// Forbid clients and proxies from caching this response
    pub fn no_store(mut self) -> Self {
        self.no_store = true;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => {
                let mut response = body.to_string().into_response();
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                response
            }
            None => ().into_response(),
        };
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        if self.no_store {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
        }
        for (name, value) in CORS_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }

        response
    }
}
