//! Property paperwork: documents, inspections and maintenance history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{nullable, require_text, require_text_opt, Entity, EntityKind, Reference, Validate};
use crate::error::ValidationError;
use crate::ident::PropertyId;

// ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    pub property_id: PropertyId,
    pub name: String,
    pub category: String,
    /// Opaque key under which the file body is kept by the upload service.
    pub storage_key: Uuid,
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_category() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewDocument {
    pub property_id: PropertyId,
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub uploaded_by: Option<String>,
}

impl Validate for NewDocument {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("category", &self.category)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentPatch {
    pub name: Option<String>,
    pub category: Option<String>,
}

impl Validate for DocumentPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_opt("name", self.name.as_ref())?;
        require_text_opt("category", self.category.as_ref())
    }
}

impl Entity for Document {
    const KIND: EntityKind = EntityKind::Document;
    type New = NewDocument;
    type Patch = DocumentPatch;

    fn build(id: i64, now: DateTime<Utc>, new: NewDocument) -> Self {
        Document {
            id,
            property_id: new.property_id,
            name: new.name,
            category: new.category,
            storage_key: Uuid::new_v4(),
            uploaded_by: new.uploaded_by,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: DocumentPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
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

    fn references(new: &NewDocument) -> Vec<Reference> {
        vec![Reference::Property(new.property_id)]
    }
}

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InspectionOutcome {
    Passed,
    Failed,
    FollowUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: i64,
    pub property_id: PropertyId,
    pub inspector: String,
    pub inspected_at: DateTime<Utc>,
    pub outcome: InspectionOutcome,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewInspection {
    pub property_id: PropertyId,
    pub inspector: String,
    pub inspected_at: DateTime<Utc>,
    pub outcome: InspectionOutcome,
    #[serde(default)]
    pub notes: String,
}

impl Validate for NewInspection {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("inspector", &self.inspector)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InspectionPatch {
    pub inspector: Option<String>,
    pub inspected_at: Option<DateTime<Utc>>,
    pub outcome: Option<InspectionOutcome>,
    pub notes: Option<String>,
}

impl Validate for InspectionPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_opt("inspector", self.inspector.as_ref())
    }
}

impl Entity for Inspection {
    const KIND: EntityKind = EntityKind::Inspection;
    type New = NewInspection;
    type Patch = InspectionPatch;

    fn build(id: i64, now: DateTime<Utc>, new: NewInspection) -> Self {
        Inspection {
            id,
            property_id: new.property_id,
            inspector: new.inspector,
            inspected_at: new.inspected_at,
            outcome: new.outcome,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: InspectionPatch) {
        if let Some(v) = patch.inspector {
            self.inspector = v;
        }
        if let Some(v) = patch.inspected_at {
            self.inspected_at = v;
        }
        if let Some(v) = patch.outcome {
            self.outcome = v;
        }
        if let Some(v) = patch.notes {
            self.notes = v;
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

    fn references(new: &NewInspection) -> Vec<Reference> {
        vec![Reference::Property(new.property_id)]
    }
}

// ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub id: i64,
    pub property_id: PropertyId,
    pub description: String,
    pub performed_at: DateTime<Utc>,
    pub cost: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewMaintenance {
    pub property_id: PropertyId,
    pub description: String,
    pub performed_at: DateTime<Utc>,
    #[serde(default)]
    pub cost: Option<f64>,
}

impl Validate for NewMaintenance {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("description", &self.description)?;
        check_cost(self.cost)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MaintenancePatch {
    pub description: Option<String>,
    pub performed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub cost: Option<Option<f64>>,
}

impl Validate for MaintenancePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_opt("description", self.description.as_ref())?;
        check_cost(self.cost.flatten())
    }
}

fn check_cost(cost: Option<f64>) -> Result<(), ValidationError> {
    match cost {
        Some(c) if !c.is_finite() || c < 0.0 => {
            Err(ValidationError::new("cost must be a non-negative amount"))
        }
        _ => Ok(()),
    }
}

impl Entity for MaintenanceRecord {
    const KIND: EntityKind = EntityKind::Maintenance;
    type New = NewMaintenance;
    type Patch = MaintenancePatch;

    fn build(id: i64, now: DateTime<Utc>, new: NewMaintenance) -> Self {
        MaintenanceRecord {
            id,
            property_id: new.property_id,
            description: new.description,
            performed_at: new.performed_at,
            cost: new.cost,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: MaintenancePatch) {
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.performed_at {
            self.performed_at = v;
        }
        if let Some(v) = patch.cost {
            self.cost = v;
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

    fn references(new: &NewMaintenance) -> Vec<Reference> {
        vec![Reference::Property(new.property_id)]
    }
}
