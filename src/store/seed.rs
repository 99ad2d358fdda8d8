//! Demo portfolio for local development (`SEED_DEMO_DATA=true`).
//!
//! Written through the [`Store`] API so it works against either backend.
//! Does nothing when the store already holds properties.

use chrono::{Duration, Utc};
use serde_json::json;

use super::Store;
use crate::error::{StoreError, StoreResult};
use crate::ident::PropertyId;
use crate::models::{
    Alert, Inspection, ListFilter, Property, PropertyGroup, Sensor, Staff, WorkOrder,
    WorkOrderCost,
};

// ---

/// Populate an empty store. Returns the number of properties created.
pub async fn seed_demo_data(store: &dyn Store) -> StoreResult<usize> {
    // ---
    let existing: Vec<Property> = store.fetch_all(ListFilter::All).await?;
    if !existing.is_empty() {
        tracing::info!("Store already has {} properties, skipping seed", existing.len());
        return Ok(0);
    }

    let north: PropertyGroup = store
        .insert::<PropertyGroup>(input(json!({
            "name": "North district",
            "description": "Council-managed blocks north of the river"
        }))?)
        .await?;

    let properties = [
        json!({
            "name": "Riverside Apartments",
            "address": "1 Quay Street",
            "description": "Six-storey block with recurring damp complaints",
            "status": "non-compliant",
            "riskLevel": "high",
            "riskReason": "Persistent moisture above 80% in basement units",
            "propertyType": "apartment",
            "units": 48,
            "yearBuilt": 1968,
            "groupId": north.id
        }),
        json!({
            "name": "Maple Court",
            "address": "12 Maple Road",
            "status": "compliant",
            "riskLevel": "low",
            "propertyType": "terrace",
            "units": 6,
            "yearBuilt": 1994,
            "groupId": north.id
        }),
        json!({
            "name": "Elm House",
            "address": "3 Elm Close",
            "status": "pending-review",
            "riskLevel": "medium",
            "riskReason": "Awaiting ventilation survey",
            "propertyType": "detached",
            "units": 1,
            "yearBuilt": 1921
        }),
        json!({
            "name": "Harbour View",
            "address": "88 Harbour Parade",
            "status": "compliant",
            "riskLevel": "none",
            "propertyType": "apartment",
            "units": 24,
            "yearBuilt": 2015
        }),
    ];

    let mut ids: Vec<PropertyId> = Vec::with_capacity(properties.len());
    for body in properties {
        let p: Property = store.insert::<Property>(input(body)?).await?;
        ids.push(p.id);
    }

    let sensors = [
        (ids[0], "moisture", "Basement flat 1", "85"),
        (ids[0], "temperature", "Stairwell", "21"),
        (ids[0], "air-quality", "Bin store", "55"),
        (ids[1], "temperature", "Living room", "19.5"),
        (ids[1], "moisture", "Bathroom", "64"),
        (ids[2], "temperature", "Hallway", "11"),
        (ids[2], "air-quality", "Kitchen", "28"),
        (ids[3], "moisture", "Plant room", "40"),
    ];
    for (property, kind, location, reading) in sensors {
        store
            .insert::<Sensor>(input(json!({
                "propertyId": property,
                "type": kind,
                "location": location,
                "currentReading": reading,
                "batteryLevel": 87
            }))?)
            .await?;
    }

    let now = Utc::now();
    for (property, days_ago, outcome) in [
        (ids[0], 40, "failed"),
        (ids[0], 200, "follow-up"),
        (ids[1], 90, "passed"),
        (ids[3], 15, "passed"),
    ] {
        store
            .insert::<Inspection>(input(json!({
                "propertyId": property,
                "inspector": "R. Okafor",
                "inspectedAt": now - Duration::days(days_ago),
                "outcome": outcome
            }))?)
            .await?;
    }

    let staff: Staff = store
        .insert::<Staff>(input(json!({
            "name": "Dana Whitfield",
            "email": "dana.whitfield@example.org",
            "role": "maintenance lead"
        }))?)
        .await?;

    let order: WorkOrder = store
        .insert::<WorkOrder>(input(json!({
            "propertyId": ids[0],
            "title": "Install basement dehumidifiers",
            "priority": "high",
            "assignedStaffId": staff.id,
            "dueDate": now + Duration::days(14)
        }))?)
        .await?;

    for (description, amount) in [("Dehumidifier units", 1240.0), ("Installation labour", 380.0)] {
        store
            .insert::<WorkOrderCost>(input(json!({
                "workOrderId": order.id,
                "description": description,
                "amount": amount
            }))?)
            .await?;
    }

    store
        .insert::<Alert>(input(json!({
            "propertyId": ids[0],
            "sensorId": 1,
            "severity": "high",
            "message": "Basement moisture above 80%"
        }))?)
        .await?;

    tracing::info!("Seeded {} demo properties", ids.len());
    Ok(ids.len())
}

fn input<T: serde::de::DeserializeOwned>(v: serde_json::Value) -> StoreResult<T> {
    serde_json::from_value(v).map_err(StoreError::from)
}
