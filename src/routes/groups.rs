//! Property group membership.
//!
//! Group CRUD itself comes from the generic record routes; this adds the
//! member listing and bulk assignment.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::records::{check_references, not_found};
use crate::error::ApiError;
use crate::ident::PropertyId;
use crate::models::{ListFilter, Property, PropertyGroup, PropertyPatch, Reference};
use crate::store::SharedStore;

// ---

pub fn router() -> Router<SharedStore> {
    Router::new().route("/groups/{id}/properties", get(members).post(assign))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AssignMembers {
    property_ids: Vec<PropertyId>,
}

async fn members(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Property>>, ApiError> {
    // ---
    if !store.exists::<PropertyGroup>(id).await? {
        return Err(not_found::<PropertyGroup>(id));
    }
    Ok(Json(store.fetch_all::<Property>(ListFilter::Group(id)).await?))
}

/// Move the listed properties into the group. All ids are checked before
/// any property is changed.
async fn assign(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(body): Json<AssignMembers>,
) -> Result<Json<Vec<Property>>, ApiError> {
    // ---
    info!("POST /groups/{}/properties ({} ids)", id, body.property_ids.len());
    if !store.exists::<PropertyGroup>(id).await? {
        return Err(not_found::<PropertyGroup>(id));
    }
    let refs: Vec<Reference> = body
        .property_ids
        .iter()
        .copied()
        .map(Reference::Property)
        .collect();
    check_references(store.as_ref(), &refs).await?;

    let mut updated = Vec::with_capacity(body.property_ids.len());
    for pid in body.property_ids {
        let patch = PropertyPatch {
            group_id: Some(Some(id)),
            ..Default::default()
        };
        // A property deleted between the check and the write is skipped.
        if let Some(p) = store.modify::<Property>(pid.get(), patch).await? {
            updated.push(p);
        }
    }
    Ok(Json(updated))
}
