//! Properties and property groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, require_text, require_text_opt, Entity, EntityKind, Reference, Validate};
use crate::error::ValidationError;
use crate::ident::PropertyId;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    PendingReview,
}

/// Property-level risk classification. Independent of [`ComplianceStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    // ---
    pub id: PropertyId,
    pub name: String,
    pub address: String,
    pub description: String,
    pub status: ComplianceStatus,
    pub risk_level: RiskLevel,
    pub risk_reason: String,
    pub property_type: String,
    pub units: u32,
    pub year_built: Option<i32>,
    pub group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Medium or high risk, or out of compliance.
    pub fn requires_attention(&self) -> bool {
        matches!(self.risk_level, RiskLevel::Medium | RiskLevel::High)
            || self.status == ComplianceStatus::NonCompliant
    }
}

fn default_status() -> ComplianceStatus {
    ComplianceStatus::PendingReview
}

fn default_risk() -> RiskLevel {
    RiskLevel::None
}

fn default_property_type() -> String {
    "residential".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewProperty {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_status")]
    pub status: ComplianceStatus,
    #[serde(default = "default_risk")]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_reason: String,
    #[serde(default = "default_property_type")]
    pub property_type: String,
    #[serde(default)]
    pub units: u32,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub group_id: Option<i64>,
}

impl Validate for NewProperty {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("address", &self.address)?;
        check_year(self.year_built)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub status: Option<ComplianceStatus>,
    pub risk_level: Option<RiskLevel>,
    pub risk_reason: Option<String>,
    pub property_type: Option<String>,
    pub units: Option<u32>,
    #[serde(default, deserialize_with = "nullable")]
    pub year_built: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub group_id: Option<Option<i64>>,
}

impl Validate for PropertyPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_opt("name", self.name.as_ref())?;
        require_text_opt("address", self.address.as_ref())?;
        check_year(self.year_built.flatten())
    }
}

fn check_year(year: Option<i32>) -> Result<(), ValidationError> {
    match year {
        Some(y) if !(1600..=2100).contains(&y) => Err(ValidationError::new(format!(
            "yearBuilt {y} is out of range"
        ))),
        _ => Ok(()),
    }
}

impl Entity for Property {
    const KIND: EntityKind = EntityKind::Property;
    type New = NewProperty;
    type Patch = PropertyPatch;

    fn build(id: i64, now: DateTime<Utc>, new: NewProperty) -> Self {
        Property {
            id: PropertyId::new(id),
            name: new.name,
            address: new.address,
            description: new.description,
            status: new.status,
            risk_level: new.risk_level,
            risk_reason: new.risk_reason,
            property_type: new.property_type,
            units: new.units,
            year_built: new.year_built,
            group_id: new.group_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: PropertyPatch) {
        // ---
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.address {
            self.address = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.risk_level {
            self.risk_level = v;
        }
        if let Some(v) = patch.risk_reason {
            self.risk_reason = v;
        }
        if let Some(v) = patch.property_type {
            self.property_type = v;
        }
        if let Some(v) = patch.units {
            self.units = v;
        }
        if let Some(v) = patch.year_built {
            self.year_built = v;
        }
        if let Some(v) = patch.group_id {
            self.group_id = v;
        }
    }

    fn id(&self) -> i64 {
        self.id.get()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn property_id(&self) -> Option<PropertyId> {
        Some(self.id)
    }

    fn group_id(&self) -> Option<i64> {
        self.group_id
    }

    fn references(new: &NewProperty) -> Vec<Reference> {
        new.group_id.map(Reference::Group).into_iter().collect()
    }

    fn patch_references(patch: &PropertyPatch) -> Vec<Reference> {
        patch.group_id.flatten().map(Reference::Group).into_iter().collect()
    }
}

// ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyGroup {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPropertyGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for NewPropertyGroup {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyGroupPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl Validate for PropertyGroupPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_opt("name", self.name.as_ref())
    }
}

impl Entity for PropertyGroup {
    const KIND: EntityKind = EntityKind::PropertyGroup;
    type New = NewPropertyGroup;
    type Patch = PropertyGroupPatch;

    fn build(id: i64, now: DateTime<Utc>, new: NewPropertyGroup) -> Self {
        PropertyGroup {
            id,
            name: new.name,
            description: new.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: PropertyGroupPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn sample(risk: RiskLevel, status: ComplianceStatus) -> Property {
        // ---
        let new: NewProperty = serde_json::from_value(serde_json::json!({
            "name": "Maple Court",
            "address": "12 Maple Rd",
        }))
        .unwrap();
        let mut p = Property::build(1, Utc::now(), new);
        p.risk_level = risk;
        p.status = status;
        p
    }

    #[test]
    fn test_defaults_on_create() {
        // ---
        let p = sample(RiskLevel::None, ComplianceStatus::PendingReview);
        assert_eq!(p.property_type, "residential");
        assert_eq!(p.units, 0);
        assert_eq!(p.group_id, None);
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn test_requires_attention() {
        // ---
        use ComplianceStatus::*;
        assert!(sample(RiskLevel::High, Compliant).requires_attention());
        assert!(sample(RiskLevel::Medium, PendingReview).requires_attention());
        assert!(sample(RiskLevel::None, NonCompliant).requires_attention());
        assert!(!sample(RiskLevel::Low, Compliant).requires_attention());
        assert!(!sample(RiskLevel::None, PendingReview).requires_attention());
    }

    #[test]
    fn test_patch_clears_group() {
        // ---
        let mut p = sample(RiskLevel::Low, ComplianceStatus::Compliant);
        p.group_id = Some(4);
        let patch: PropertyPatch = serde_json::from_str(r#"{"groupId": null}"#).unwrap();
        p.apply(patch);
        assert_eq!(p.group_id, None);
        assert_eq!(p.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_status_wire_names() {
        // ---
        let s: ComplianceStatus = serde_json::from_str(r#""non-compliant""#).unwrap();
        assert_eq!(s, ComplianceStatus::NonCompliant);
        assert_eq!(
            serde_json::to_string(&ComplianceStatus::PendingReview).unwrap(),
            r#""pending-review""#
        );
    }

    #[test]
    fn test_unknown_fields_rejected() {
        // ---
        let res = serde_json::from_str::<NewProperty>(
            r#"{"name": "A", "address": "B", "ownerSsn": "123"}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_validation() {
        // ---
        let new: NewProperty =
            serde_json::from_str(r#"{"name": " ", "address": "B"}"#).unwrap();
        assert!(new.validate().is_err());

        let new: NewProperty =
            serde_json::from_str(r#"{"name": "A", "address": "B", "yearBuilt": 3020}"#).unwrap();
        assert!(new.validate().is_err());
    }
}
