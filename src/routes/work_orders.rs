//! Work order staffing and cost roll-up.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::records::{check_references, not_found};
use crate::error::ApiError;
use crate::models::{ListFilter, Reference, WorkOrder, WorkOrderCost, WorkOrderPatch};
use crate::store::SharedStore;

// ---

pub fn router() -> Router<SharedStore> {
    Router::new()
        .route("/work-orders/{id}/assign", post(assign))
        .route("/work-orders/{id}/costs", get(costs))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AssignStaff {
    staff_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CostSummary {
    work_order_id: i64,
    costs: Vec<WorkOrderCost>,
    total: f64,
}

async fn assign(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(body): Json<AssignStaff>,
) -> Result<Json<WorkOrder>, ApiError> {
    // ---
    info!("POST /work-orders/{}/assign staff {}", id, body.staff_id);
    if !store.exists::<WorkOrder>(id).await? {
        return Err(not_found::<WorkOrder>(id));
    }
    check_references(store.as_ref(), &[Reference::Staff(body.staff_id)]).await?;

    let patch = WorkOrderPatch {
        assigned_staff_id: Some(Some(body.staff_id)),
        ..Default::default()
    };
    store
        .modify::<WorkOrder>(id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<WorkOrder>(id))
}

async fn costs(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<Json<CostSummary>, ApiError> {
    // ---
    if !store.exists::<WorkOrder>(id).await? {
        return Err(not_found::<WorkOrder>(id));
    }
    let costs: Vec<WorkOrderCost> = store.fetch_all(ListFilter::WorkOrder(id)).await?;
    let total: f64 = costs.iter().map(|c| c.amount).sum();
    Ok(Json(CostSummary {
        work_order_id: id,
        costs,
        total,
    }))
}
