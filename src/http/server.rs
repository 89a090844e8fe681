//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy and health handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Dispatch requests to the routing engine
//! - Forward requests to the resolved backend
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxySettings;
use crate::http::forwarder::Forwarder;
use crate::http::health::health_handler;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::observability::metrics::MetricsSink;
use crate::routing::Router as ProxyRouter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub forwarder: Forwarder,
    pub metrics: Arc<dyn MetricsSink>,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the given routing state.
    ///
    /// The connector's connect timeout comes from the active cluster at
    /// construction time.
    pub fn new(router: Arc<ProxyRouter>, settings: &ProxySettings, metrics: Arc<dyn MetricsSink>) -> Self {
        let connect_timeout = router
            .current()
            .topology
            .active_cluster()
            .and_then(|c| c.connect_timeout);
        let forwarder = Forwarder::new(connect_timeout, settings.max_response_bytes);

        let state = AppState {
            router,
            forwarder,
            metrics,
        };

        Self {
            router: Self::build_router(settings, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(settings: &ProxySettings, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(settings.request_timeout)),
            )
    }

    /// The configured Axum router, for serving or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Resolves the backend and forwards the request to it.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request).to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let resolution = match state.router.resolve(&request) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Request not routed");
            state.metrics.record_request(&method, e.status().as_u16(), "", start_time);
            return e.into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        backend = %resolution.backend,
        selection = ?resolution.selection,
        generation = resolution.generation,
        "Proxying request"
    );

    match state.forwarder.forward(request, resolution.target).await {
        Ok(response) => {
            let status = response.status().as_u16();
            state.metrics.record_request(&method, status, &resolution.backend, start_time);
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                backend = %resolution.backend,
                status,
                latency_ms = start_time.elapsed().as_millis() as u64,
                "Request forwarded"
            );
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                backend = %resolution.backend,
                error = %e,
                "Upstream error"
            );
            state.metrics.record_request(&method, e.status().as_u16(), &resolution.backend, start_time);
            e.into_response()
        }
    }
}
