// src/routes/health.rs
//! Liveness and readiness endpoints.
//!
//! - `/health` answers as long as the process is serving HTTP; it never
//!   touches the store.
//! - `/ready` performs one cheap store read, so an orchestrator can hold
//!   traffic back while the database is unreachable.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::models::{ListFilter, PropertyGroup};
use crate::store::SharedStore;

/// JSON response body for the health endpoints.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

impl HealthResponse {
    fn new(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::new("ok"))
}

/// Handle `GET /ready`.
///
/// Lists property groups (the smallest collection) to prove the backend
/// answers. Returns 503 with `status: "unavailable"` otherwise.
async fn ready(State(store): State<SharedStore>) -> (StatusCode, Json<HealthResponse>) {
    // ---
    match store.fetch_all::<PropertyGroup>(ListFilter::All).await {
        Ok(_) => (StatusCode::OK, Json(HealthResponse::new("ok"))),
        Err(e) => {
            tracing::warn!("readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::new("unavailable")),
            )
        }
    }
}

pub fn router() -> Router<SharedStore> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}
