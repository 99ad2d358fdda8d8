use axum::Router;

use crate::models::{
    Alert, Document, Inspection, MaintenanceRecord, PropertyGroup, Sensor, Staff, WorkOrder,
    WorkOrderCost,
};
use crate::store::SharedStore;

mod dashboard;
mod groups;
mod health;
mod properties;
mod records;
mod work_orders;

// ---

pub fn router(store: SharedStore) -> Router {
    // ---
    Router::new()
        .merge(dashboard::router())
        .merge(properties::router())
        .merge(records::router::<Sensor>("/sensors"))
        .merge(records::router::<Alert>("/alerts"))
        .merge(records::router::<Document>("/documents"))
        .merge(records::router::<Inspection>("/inspections"))
        .merge(records::router::<MaintenanceRecord>("/maintenance"))
        .merge(records::router::<WorkOrder>("/work-orders"))
        .merge(records::router::<WorkOrderCost>("/work-order-costs"))
        .merge(records::router::<Staff>("/staff"))
        .merge(records::router::<PropertyGroup>("/groups"))
        .merge(groups::router())
        .merge(work_orders::router())
        .merge(health::router())
        .with_state(store)
}
