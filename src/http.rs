//! HTTP server for the Prometheus metrics endpoint.

use axum::{Router, routing::get};
use std::net::SocketAddr;
use tracing::{error, info};

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Router serving `/metrics`.
pub fn router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serve metrics on `addr` (see `ServerConfig::metrics_addr`).
///
/// Long-running; spawn it in the background. Bind failures are logged and
/// leave the guard running without the endpoint.
pub async fn run_http_server(addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind metrics endpoint");
            return;
        }
    };
    info!(%addr, "Metrics endpoint listening");

    if let Err(e) = axum::serve(listener, router()).await {
        error!(error = %e, "Metrics endpoint stopped");
    }
}
