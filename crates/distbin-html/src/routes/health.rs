//! Health check endpoint.

use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Public health check endpoint.
///
/// Returns basic service health for load balancer probes. The backend is not
/// contacted.
pub fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "distbin-html",
        version: env!("CARGO_PKG_VERSION"),
    })
}
