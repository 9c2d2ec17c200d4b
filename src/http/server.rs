//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap application routes with the protocol middleware
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener and drain on shutdown

use std::time::Duration;

use axum::{extract::Request, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::middleware::with_inertia;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, X_REQUEST_ID};
use crate::http::state::InertiaState;
use crate::lifecycle::Shutdown;

/// HTTP server for an Inertia application.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Wrap `routes` with the protocol middleware and the HTTP layers.
    pub fn new(routes: Router, state: InertiaState) -> Self {
        let request_secs = state.settings().config.timeouts.request_secs;
        let router = Self::build_router(routes, state, Duration::from_secs(request_secs));
        Self { router }
    }

    #[allow(deprecated)]
    fn build_router(routes: Router, state: InertiaState, timeout: Duration) -> Router {
        with_inertia(routes, state)
            .layer(TimeoutLayer::new(timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
