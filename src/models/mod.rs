//! Entity records managed by the store.
//!
//! Every record kind implements [`Entity`], which tells the store how to
//! build a record from its validated input, how to merge a patch, and which
//! foreign keys it carries. The store itself stays generic over `Entity`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::ident::PropertyId;

mod property;
mod records;
mod sensor;
mod work;

pub use property::{
    ComplianceStatus, NewProperty, NewPropertyGroup, Property, PropertyGroup, PropertyGroupPatch,
    PropertyPatch, RiskLevel,
};
pub use records::{
    Document, DocumentPatch, Inspection, InspectionOutcome, InspectionPatch, MaintenancePatch,
    MaintenanceRecord, NewDocument, NewInspection, NewMaintenance,
};
pub use sensor::{
    Alert, AlertPatch, AlertSeverity, AlertStatus, NewAlert, NewSensor, Sensor, SensorPatch,
    SensorStatus, SensorType,
};
pub use work::{
    NewStaff, NewWorkOrder, NewWorkOrderCost, Staff, StaffPatch, WorkOrder, WorkOrderCost,
    WorkOrderCostPatch, WorkOrderPatch, WorkOrderPriority, WorkOrderStatus,
};

// ---

/// Discriminant for every stored record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Property,
    Sensor,
    Alert,
    Document,
    Inspection,
    Maintenance,
    WorkOrder,
    WorkOrderCost,
    Staff,
    PropertyGroup,
}

impl EntityKind {
    /// Stable key used by persistent backends.
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Property => "property",
            EntityKind::Sensor => "sensor",
            EntityKind::Alert => "alert",
            EntityKind::Document => "document",
            EntityKind::Inspection => "inspection",
            EntityKind::Maintenance => "maintenance",
            EntityKind::WorkOrder => "work_order",
            EntityKind::WorkOrderCost => "work_order_cost",
            EntityKind::Staff => "staff",
            EntityKind::PropertyGroup => "property_group",
        }
    }

    /// Human label for error messages.
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Property => "property",
            EntityKind::Sensor => "sensor",
            EntityKind::Alert => "alert",
            EntityKind::Document => "document",
            EntityKind::Inspection => "inspection",
            EntityKind::Maintenance => "maintenance record",
            EntityKind::WorkOrder => "work order",
            EntityKind::WorkOrderCost => "work order cost",
            EntityKind::Staff => "staff member",
            EntityKind::PropertyGroup => "property group",
        }
    }

    /// Kinds removed together with their owning property.
    pub const PROPERTY_OWNED: [EntityKind; 6] = [
        EntityKind::Sensor,
        EntityKind::Alert,
        EntityKind::Document,
        EntityKind::Inspection,
        EntityKind::Maintenance,
        EntityKind::WorkOrder,
    ];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A foreign key carried by an input, checked before the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Property(PropertyId),
    WorkOrder(i64),
    Staff(i64),
    Group(i64),
}

/// Record selection for `list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    All,
    Property(PropertyId),
    WorkOrder(i64),
    Group(i64),
}

impl ListFilter {
    /// Whether records of `kind` carry the key this filter selects on.
    pub fn applies_to(&self, kind: EntityKind) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Property(_) => {
                kind == EntityKind::Property || EntityKind::PROPERTY_OWNED.contains(&kind)
            }
            ListFilter::WorkOrder(_) => kind == EntityKind::WorkOrderCost,
            ListFilter::Group(_) => kind == EntityKind::Property,
        }
    }

    pub fn matches<E: Entity>(&self, record: &E) -> bool {
        match *self {
            ListFilter::All => true,
            ListFilter::Property(id) => record.property_id() == Some(id),
            ListFilter::WorkOrder(id) => record.work_order_id() == Some(id),
            ListFilter::Group(id) => record.group_id() == Some(id),
        }
    }
}

/// Input checks that need no store access.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A stored record kind.
pub trait Entity:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Validated creation input.
    type New: Validate + DeserializeOwned + fmt::Debug + Send + 'static;

    /// Partial update; absent fields are left untouched.
    type Patch: Validate + DeserializeOwned + fmt::Debug + Send + 'static;

    fn build(id: i64, now: DateTime<Utc>, new: Self::New) -> Self;

    fn apply(&mut self, patch: Self::Patch);

    fn id(&self) -> i64;

    fn touch(&mut self, now: DateTime<Utc>);

    fn property_id(&self) -> Option<PropertyId> {
        None
    }

    fn work_order_id(&self) -> Option<i64> {
        None
    }

    fn group_id(&self) -> Option<i64> {
        None
    }

    fn references(_new: &Self::New) -> Vec<Reference> {
        Vec::new()
    }

    fn patch_references(_patch: &Self::Patch) -> Vec<Reference> {
        Vec::new()
    }
}

// ---

/// Deserialize a nullable patch field so that an explicit `null` becomes
/// `Some(None)` while an absent field stays `None` (via `#[serde(default)]`).
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!("{field} must not be empty")));
    }
    Ok(())
}

pub(crate) fn require_text_opt(field: &str, value: Option<&String>) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| require_text(field, v))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "nullable")]
        group_id: Option<Option<i64>>,
    }

    #[test]
    fn test_nullable_distinguishes_absent_from_null() {
        // ---
        let absent: Probe = serde_json::from_str("{}").unwrap();
        let null: Probe = serde_json::from_str(r#"{"group_id": null}"#).unwrap();
        let set: Probe = serde_json::from_str(r#"{"group_id": 3}"#).unwrap();

        assert_eq!(absent.group_id, None);
        assert_eq!(null.group_id, Some(None));
        assert_eq!(set.group_id, Some(Some(3)));
    }

    #[test]
    fn test_require_text() {
        // ---
        assert!(require_text("name", "Maple Court").is_ok());
        let err = require_text("name", "   ").unwrap_err();
        assert_eq!(err.to_string(), "name must not be empty");
    }
}
