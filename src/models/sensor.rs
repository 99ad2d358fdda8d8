//! Environmental sensors and the alerts raised against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, require_text, require_text_opt, Entity, EntityKind, Reference, Validate};
use crate::error::ValidationError;
use crate::ident::PropertyId;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensorType {
    Temperature,
    Moisture,
    AirQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    // ---
    pub id: i64,
    pub property_id: PropertyId,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub location: String,
    pub status: SensorStatus,
    /// Unit-less, numeric-bearing reading as reported by telemetry.
    pub current_reading: String,
    pub battery_level: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_sensor_status() -> SensorStatus {
    SensorStatus::Active
}

fn default_battery() -> u8 {
    100
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewSensor {
    pub property_id: PropertyId,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub location: String,
    #[serde(default = "default_sensor_status")]
    pub status: SensorStatus,
    #[serde(default)]
    pub current_reading: String,
    #[serde(default = "default_battery")]
    pub battery_level: u8,
}

impl Validate for NewSensor {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("location", &self.location)?;
        check_battery(self.battery_level)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SensorPatch {
    pub location: Option<String>,
    pub status: Option<SensorStatus>,
    pub current_reading: Option<String>,
    pub battery_level: Option<u8>,
}

impl Validate for SensorPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_opt("location", self.location.as_ref())?;
        self.battery_level.map_or(Ok(()), check_battery)
    }
}

fn check_battery(level: u8) -> Result<(), ValidationError> {
    if level > 100 {
        return Err(ValidationError::new(format!(
            "batteryLevel {level} must be between 0 and 100"
        )));
    }
    Ok(())
}

impl Entity for Sensor {
    const KIND: EntityKind = EntityKind::Sensor;
    type New = NewSensor;
    type Patch = SensorPatch;

    fn build(id: i64, now: DateTime<Utc>, new: NewSensor) -> Self {
        Sensor {
            id,
            property_id: new.property_id,
            sensor_type: new.sensor_type,
            location: new.location,
            status: new.status,
            current_reading: new.current_reading,
            battery_level: new.battery_level,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: SensorPatch) {
        // ---
        if let Some(v) = patch.location {
            self.location = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.current_reading {
            self.current_reading = v;
        }
        if let Some(v) = patch.battery_level {
            self.battery_level = v;
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn property_id(&self) -> Option<PropertyId> {
        Some(self.property_id)
    }

    fn references(new: &NewSensor) -> Vec<Reference> {
        vec![Reference::Property(new.property_id)]
    }
}

// ---

/// Severity of a stored alert. A stored alert is never `none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    pub property_id: PropertyId,
    pub sensor_id: Option<i64>,
    pub severity: AlertSeverity,
    pub message: String,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_alert_status() -> AlertStatus {
    AlertStatus::Active
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewAlert {
    pub property_id: PropertyId,
    #[serde(default)]
    pub sensor_id: Option<i64>,
    pub severity: AlertSeverity,
    pub message: String,
    #[serde(default = "default_alert_status")]
    pub status: AlertStatus,
}

impl Validate for NewAlert {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("message", &self.message)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AlertPatch {
    pub severity: Option<AlertSeverity>,
    pub message: Option<String>,
    pub status: Option<AlertStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub sensor_id: Option<Option<i64>>,
}

impl Validate for AlertPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_opt("message", self.message.as_ref())
    }
}

impl Entity for Alert {
    const KIND: EntityKind = EntityKind::Alert;
    type New = NewAlert;
    type Patch = AlertPatch;

    fn build(id: i64, now: DateTime<Utc>, new: NewAlert) -> Self {
        Alert {
            id,
            property_id: new.property_id,
            sensor_id: new.sensor_id,
            severity: new.severity,
            message: new.message,
            status: new.status,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: AlertPatch) {
        if let Some(v) = patch.severity {
            self.severity = v;
        }
        if let Some(v) = patch.message {
            self.message = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.sensor_id {
            self.sensor_id = v;
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn property_id(&self) -> Option<PropertyId> {
        Some(self.property_id)
    }

    fn references(new: &NewAlert) -> Vec<Reference> {
        vec![Reference::Property(new.property_id)]
    }
}
