//! Builders shared by the unit tests.

use chrono::{TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::ident::PropertyId;
use crate::models::{
    ComplianceStatus, Entity, NewProperty, NewSensor, Property, RiskLevel, Sensor, SensorStatus,
    SensorType,
};

/// Deserialize an input type from JSON, as the HTTP layer would.
pub fn new_value<T: DeserializeOwned>(v: Value) -> T {
    serde_json::from_value(v).expect("test input must deserialize")
}

pub fn new_property(name: &str) -> NewProperty {
    new_value(json!({ "name": name, "address": format!("{name} Street") }))
}

pub fn new_sensor(property: PropertyId, sensor_type: SensorType, reading: &str) -> NewSensor {
    NewSensor {
        property_id: property,
        sensor_type,
        location: "Living room".to_string(),
        status: SensorStatus::Active,
        current_reading: reading.to_string(),
        battery_level: 90,
    }
}

pub fn property(id: i64, risk: RiskLevel, status: ComplianceStatus) -> Property {
    let mut p = Property::build(
        id,
        Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap(),
        new_property(&format!("Property {id}")),
    );
    p.risk_level = risk;
    p.status = status;
    p
}

pub fn sensor(id: i64, property: i64, sensor_type: SensorType, reading: &str) -> Sensor {
    Sensor::build(
        id,
        Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap(),
        new_sensor(PropertyId::new(property), sensor_type, reading),
    )
}
