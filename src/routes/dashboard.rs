//! Portfolio dashboard.

use axum::{extract::State, routing::get, Json, Router};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::store::SharedStore;
use crate::views::{self, Dashboard};

// ---

pub fn router() -> Router<SharedStore> {
    Router::new().route("/dashboard", get(handler))
}

async fn handler(State(store): State<SharedStore>) -> Result<Json<Dashboard>, ApiError> {
    // ---
    info!("GET /dashboard");
    let dashboard = views::dashboard(store.as_ref()).await?;
    debug!(
        "GET /dashboard - {} properties need attention, compliance {}%",
        dashboard.properties.len(),
        dashboard.stats.compliance_rate
    );
    Ok(Json(dashboard))
}
