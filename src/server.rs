use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::routing::any;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::protocol::{Command, Reply};
use crate::store::KvStore;

/// Route serving the product collection
pub const PRODUCTS_PATH: &str = "/api/products";

/// Shared state threaded through the products handler
#[derive(Clone)]
pub struct AppState {
    /// Store binding, `None` when not configured
    pub store: Option<Arc<dyn KvStore>>,
    /// Secret expected in `X-Admin-Key`
    pub admin_key: Arc<str>,
    /// Largest accepted PUT body
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Option<Arc<dyn KvStore>>,
        admin_key: impl Into<Arc<str>>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            store,
            admin_key: admin_key.into(),
            max_body_bytes,
        }
    }
}

/// Build the router; every method on the products path reaches one handler
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(PRODUCTS_PATH, any(handle_products))
        .with_state(state)
}

async fn handle_products(State(state): State<AppState>, request: Request) -> Reply {
    let (parts, body) = request.into_parts();

    let reply = Command::parse(&parts.method, &parts.headers)
        .execute(&state, body)
        .await;
    debug!("{} {} -> {}", parts.method, parts.uri, reply.status());
    reply
}

/// HTTP server
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: AppState,
}

impl Server {
    /// Create and bind the HTTP server to the specified address
    pub async fn bind(addr: &str, state: AppState) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            state,
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests until Ctrl+C or SIGTERM
    pub async fn run(self) -> std::io::Result<()> {
        match &self.state.store {
            Some(store) => info!("Serving {} from {} store", PRODUCTS_PATH, store.backend()),
            None => info!("Serving {} without a store binding", PRODUCTS_PATH),
        }

        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
