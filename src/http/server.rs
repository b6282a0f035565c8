//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the item handler on every path
//! - Wire up middleware (timeout, request ID, tracing)
//! - Bind server to listener with graceful shutdown
//! - Admit, identify and dispatch each request to its lifecycle

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServoConfig;
use crate::fsm::{drive, ItemRequest, Lifecycle};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestMeta};
use crate::http::response::render_status;
use crate::identity;
use crate::security::{check_access, Access};
use crate::store::Datastore;

/// Application state injected into handlers.
pub struct AppState<D> {
    pub config: Arc<ServoConfig>,
    pub store: D,
}

impl<D: Clone> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            store: self.store.clone(),
        }
    }
}

/// HTTP server for the item store.
pub struct HttpServer {
    router: Router,
    config: Arc<ServoConfig>,
}

impl HttpServer {
    /// Create a new HTTP server over `store`.
    pub fn new<D: Datastore>(config: ServoConfig, store: D) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            store,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<D: Datastore>(config: &ServoConfig, state: AppState<D>) -> Router {
        Router::new()
            .route("/{*path}", any(item_handler::<D>))
            .route("/", any(item_handler::<D>))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a value arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            public_mode = self.config.access.public_mode,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServoConfig {
        &self.config
    }
}

/// Every path is an item key; the root is the console.
async fn item_handler<D: Datastore>(State(state): State<AppState<D>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let meta = RequestMeta::from_parts(&parts);

    if let Access::Deny { status, message } = check_access(&meta, &state.config.access) {
        return render_status(status, Some(message)).into_response();
    }

    let client = identity::resolve(meta.client_header.as_deref(), meta.client_cookie.as_deref());
    let body = buffer_body(body, state.config.limits.max_size()).await;

    let request = ItemRequest::from_meta(&meta, body);
    let lifecycle = Lifecycle::new(state.config.clone(), client.client_id.clone(), request);
    let reply = drive(lifecycle, state.store.session()).await;

    tracing::debug!(
        request_id = meta.request_id.as_deref().unwrap_or("-"),
        method = %meta.method,
        path = %meta.path,
        status = reply.status,
        "request finished"
    );

    let mut response = reply.into_response();
    identity::echo(&client, response.headers_mut(), state.config.session.ttl_secs);
    response
}

/// Buffer at most `limit` bytes; `None` when the body is larger.
async fn buffer_body(body: Body, limit: usize) -> Option<axum::body::Bytes> {
    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::warn!(limit, error = %err, "request body not buffered");
            None
        }
    }
}
