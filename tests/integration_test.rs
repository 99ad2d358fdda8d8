use std::sync::Arc;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use property_compliance::{app, store::seed::seed_demo_data, MemoryStore, SharedStore};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Alerts {
    high: u32,
    medium: u32,
    low: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyRow {
    id: i64,
    name: String,
    risk_level: String,
    status: String,
    alerts: Alerts,
    sensors_count: u32,
    last_inspection: Option<String>,
}

/// Serve the app on an ephemeral port and return its base URL.
async fn spawn_app(seed: bool) -> Result<String> {
    // ---
    let store: SharedStore = Arc::new(MemoryStore::new());
    if seed {
        seed_demo_data(store.as_ref()).await?;
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, app(store)).await });

    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn health_and_ready() -> Result<()> {
    // ---
    let base = spawn_app(false).await?;
    let client = Client::new();

    for path in ["health", "ready"] {
        let res = client.get(format!("{}/{}", base, path)).send().await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        assert_eq!(body["status"], "ok");
    }
    Ok(())
}

#[tokio::test]
async fn properties_list_carries_alert_histograms() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let rows: Vec<PropertyRow> = Client::new()
        .get(format!("{}/properties", base))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(rows.len(), 4);

    let riverside = &rows[0];
    assert_eq!(riverside.id, 1);
    assert_eq!(riverside.name, "Riverside Apartments");
    assert_eq!(riverside.risk_level, "high");
    assert_eq!(riverside.status, "non-compliant");
    assert_eq!(riverside.sensors_count, 3);
    // moisture 85 -> high, temperature 21 -> none, air-quality 55 -> medium
    assert_eq!(
        (riverside.alerts.high, riverside.alerts.medium, riverside.alerts.low),
        (1, 1, 0)
    );
    assert!(riverside.last_inspection.is_some());

    let elm = &rows[2];
    // temperature 11 -> medium, air-quality 28 -> none
    assert_eq!((elm.alerts.high, elm.alerts.medium, elm.alerts.low), (0, 1, 0));
    assert!(elm.last_inspection.is_none());
    Ok(())
}

#[tokio::test]
async fn dashboard_stats_and_attention_list() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let body: Value = Client::new()
        .get(format!("{}/dashboard", base))
        .send()
        .await?
        .json()
        .await?;

    let stats = &body["stats"];
    assert_eq!(stats["totalProperties"], 4);
    assert_eq!(stats["highRiskProperties"], 1);
    assert_eq!(stats["complianceRate"], 50);
    assert_eq!(stats["highRiskAndNonCompliantCount"], 1);
    assert_eq!(stats["activeSensors"], 8);
    assert_eq!(stats["activeSensorRate"], 100);

    let ids: Vec<i64> = body["properties"]
        .as_array()
        .expect("properties array")
        .iter()
        .filter_map(|p| p["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![1, 3]);
    Ok(())
}

#[tokio::test]
async fn empty_dashboard_is_fully_compliant() -> Result<()> {
    // ---
    let base = spawn_app(false).await?;
    let body: Value = Client::new()
        .get(format!("{}/dashboard", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["stats"]["complianceRate"], 100);
    assert_eq!(body["stats"]["activeSensorRate"], 100);
    assert_eq!(body["properties"], json!([]));
    Ok(())
}

#[tokio::test]
async fn property_detail_accepts_every_id_form() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let client = Client::new();

    for id in ["1", "prop-001", "prop-1", "prop-0000001"] {
        let res = client.get(format!("{}/properties/{}", base, id)).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "id form {id}");
        let body: Value = res.json().await?;
        assert_eq!(body["id"], 1);
        assert_eq!(body["legacyId"], "prop-001");
        assert_eq!(body["alertCounts"]["high"], 1);
        assert_eq!(body["sensorsCount"], 3);
        assert_eq!(body["group"]["name"], "North district");
        assert_eq!(body["requiresAttention"], true);
    }
    Ok(())
}

#[tokio::test]
async fn unresolvable_or_missing_property_is_404() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let client = Client::new();

    for id in ["prop-xyz", "unit-4", "999", "prop-999"] {
        let res = client.get(format!("{}/properties/{}", base, id)).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "id {id}");
        let body: Value = res.json().await?;
        assert!(body["error"].as_str().unwrap_or_default().contains("not found"));
    }

    // Nothing was fabricated along the way.
    let rows: Vec<Value> = client
        .get(format!("{}/properties", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(rows.len(), 4);
    Ok(())
}

#[tokio::test]
async fn alert_counts_for_unknown_id_are_zero() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let body: Value = Client::new()
        .get(format!("{}/properties/garbage/alert-counts", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body, json!({"high": 0, "medium": 0, "low": 0}));
    Ok(())
}

#[tokio::test]
async fn create_sensor_validates_input() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let client = Client::new();
    let url = format!("{}/sensors", base);

    let res = client
        .post(&url)
        .json(&json!({"propertyId": "prop-002", "type": "moisture", "location": "Loft", "currentReading": "72"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let sensor: Value = res.json().await?;
    assert_eq!(sensor["propertyId"], 2);

    let counts: Value = client
        .get(format!("{}/properties/2/alert-counts", base))
        .send()
        .await?
        .json()
        .await?;
    // bathroom moisture 64 -> low, loft moisture 72 -> medium
    assert_eq!(counts, json!({"high": 0, "medium": 1, "low": 1}));

    // Dangling property reference
    let res = client
        .post(&url)
        .json(&json!({"propertyId": 42, "type": "moisture", "location": "Loft"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown field
    let res = client
        .post(&url)
        .json(&json!({"propertyId": 2, "type": "moisture", "location": "Loft", "owner": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Battery out of range
    let res = client
        .post(&url)
        .json(&json!({"propertyId": 2, "type": "moisture", "location": "Loft", "batteryLevel": 150}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn reading_update_changes_histogram() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let client = Client::new();

    // Sensor 2 is Riverside's stairwell thermometer reading 21.
    let res = client
        .patch(format!("{}/sensors/2", base))
        .json(&json!({"currentReading": "8.5"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let counts: Value = client
        .get(format!("{}/properties/prop-001/alert-counts", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(counts, json!({"high": 2, "medium": 1, "low": 0}));
    Ok(())
}

#[tokio::test]
async fn deleting_property_cascades() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let client = Client::new();

    let res = client.delete(format!("{}/properties/prop-001", base)).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let sensors: Vec<Value> = client
        .get(format!("{}/sensors?propertyId=1", base))
        .send()
        .await?
        .json()
        .await?;
    assert!(sensors.is_empty());

    let orders: Vec<Value> = client
        .get(format!("{}/work-orders", base))
        .send()
        .await?
        .json()
        .await?;
    assert!(orders.is_empty());

    let res = client.get(format!("{}/properties/1", base)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.delete(format!("{}/properties/1", base)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(format!("{}/properties/1/sensors", base)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn work_order_assignment_and_costs() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let client = Client::new();

    let summary: Value = client
        .get(format!("{}/work-orders/1/costs", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(summary["costs"].as_array().map(Vec::len), Some(2));
    assert_eq!(summary["total"], 1620.0);

    let staff: Value = client
        .post(format!("{}/staff", base))
        .json(&json!({"name": "Sam Ortiz", "email": "sam@example.org", "role": "surveyor"}))
        .send()
        .await?
        .json()
        .await?;
    let staff_id = staff["id"].as_i64().expect("staff id");

    let order: Value = client
        .post(format!("{}/work-orders/1/assign", base))
        .json(&json!({"staffId": staff_id}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(order["assignedStaffId"], staff_id);

    let res = client
        .post(format!("{}/work-orders/1/assign", base))
        .json(&json!({"staffId": 999}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn group_membership() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let client = Client::new();

    let res = client
        .post(format!("{}/groups/1/properties", base))
        .json(&json!({"propertyIds": ["prop-003", 4]}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let members: Vec<Value> = client
        .get(format!("{}/groups/1/properties", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(members.len(), 4);

    let res = client.delete(format!("{}/groups/1", base)).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let detail: Value = client
        .get(format!("{}/properties/3", base))
        .send()
        .await?
        .json()
        .await?;
    assert!(detail["groupId"].is_null());
    assert!(detail["group"].is_null());
    Ok(())
}

#[tokio::test]
async fn list_filter_must_fit_the_kind() -> Result<()> {
    // ---
    let base = spawn_app(true).await?;
    let client = Client::new();

    let res = client.get(format!("{}/sensors?groupId=1", base)).send().await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert!(body["error"].as_str().unwrap_or_default().contains("groupId"));

    let res = client.get(format!("{}/staff?propertyId=1", base)).send().await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let costs: Vec<Value> = client
        .get(format!("{}/work-order-costs?workOrderId=1", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(costs.len(), 2);

    let sensors: Vec<Value> = client
        .get(format!("{}/sensors?propertyId=prop-003", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(sensors.len(), 2);
    Ok(())
}
