//! Property routes.
//!
//! Every `{id}` here accepts any property identifier form (`7`, `"7"`,
//! `prop-007`). An id that does not resolve, or resolves to nothing, is a
//! 404; no placeholder property is ever produced.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{debug, info};

use super::records::{self, check_references};
use crate::aggregate::{aggregate_alerts, AlertCounts};
use crate::error::ApiError;
use crate::ident::{resolve, PropertyId};
use crate::models::{
    Alert, Document, Entity, Inspection, ListFilter, MaintenanceRecord, Property, PropertyPatch,
    Sensor, Validate, WorkOrder,
};
use crate::store::{Repository, SharedStore, Store};
use crate::views::{self, PropertyDetail, PropertySummary};

// ---

pub fn router() -> Router<SharedStore> {
    // ---
    Router::new()
        .route("/properties", get(list).post(records::create::<Property>))
        .route("/properties/{id}", get(detail).patch(update).delete(remove))
        .route("/properties/{id}/alert-counts", get(alert_counts))
        .route("/properties/{id}/sensors", get(owned::<Sensor>))
        .route("/properties/{id}/alerts", get(owned::<Alert>))
        .route("/properties/{id}/documents", get(owned::<Document>))
        .route("/properties/{id}/inspections", get(owned::<Inspection>))
        .route("/properties/{id}/maintenance", get(owned::<MaintenanceRecord>))
        .route("/properties/{id}/work-orders", get(owned::<WorkOrder>))
}

/// Resolve a path id, mapping failure to 404.
fn resolve_path(raw: &str) -> Result<PropertyId, ApiError> {
    resolve(raw).ok_or_else(|| ApiError::not_found(format!("property {raw}")))
}

async fn list(State(store): State<SharedStore>) -> Result<Json<Vec<PropertySummary>>, ApiError> {
    // ---
    info!("GET /properties");
    let rows = views::property_summaries(store.as_ref()).await?;
    debug!("GET /properties - returning {} rows", rows.len());
    Ok(Json(rows))
}

async fn detail(
    State(store): State<SharedStore>,
    Path(raw): Path<String>,
) -> Result<Json<PropertyDetail>, ApiError> {
    // ---
    info!("GET /properties/{}", raw);
    let id = resolve_path(&raw)?;
    views::property_detail(store.as_ref(), id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("property {raw}")))
}

async fn update(
    State(store): State<SharedStore>,
    Path(raw): Path<String>,
    Json(patch): Json<PropertyPatch>,
) -> Result<Json<Property>, ApiError> {
    // ---
    info!("PATCH /properties/{}", raw);
    let id = resolve_path(&raw)?;
    patch.validate()?;
    check_references(store.as_ref(), &Property::patch_references(&patch)).await?;

    store
        .modify::<Property>(id.get(), patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("property {raw}")))
}

async fn remove(
    State(store): State<SharedStore>,
    Path(raw): Path<String>,
) -> Result<StatusCode, ApiError> {
    // ---
    info!("DELETE /properties/{}", raw);
    let id = resolve_path(&raw)?;
    if store.remove::<Property>(id.get()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("property {raw}")))
    }
}

/// Alert histogram only. Unresolvable ids read as all zeros.
async fn alert_counts(
    State(store): State<SharedStore>,
    Path(raw): Path<String>,
) -> Result<Json<AlertCounts>, ApiError> {
    // ---
    Ok(Json(aggregate_alerts(store.as_ref(), &raw).await?))
}

/// Records of kind `E` belonging to one property.
async fn owned<E>(
    State(store): State<SharedStore>,
    Path(raw): Path<String>,
) -> Result<Json<Vec<E>>, ApiError>
where
    E: Entity,
    dyn Store: Repository<E>,
{
    // ---
    let id = resolve_path(&raw)?;
    if !store.exists::<Property>(id.get()).await? {
        return Err(ApiError::not_found(format!("property {raw}")));
    }
    let records = store.fetch_all::<E>(ListFilter::Property(id)).await?;
    debug!("GET /properties/{}/{} -> {}", raw, E::KIND, records.len());
    Ok(Json(records))
}
