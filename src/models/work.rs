//! Work orders, their costs, and the staff they are assigned to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, require_text, require_text_opt, Entity, EntityKind, Reference, Validate};
use crate::error::ValidationError;
use crate::ident::PropertyId;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkOrderPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkOrderStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: i64,
    pub property_id: PropertyId,
    pub title: String,
    pub description: String,
    pub priority: WorkOrderPriority,
    pub status: WorkOrderStatus,
    pub assigned_staff_id: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_priority() -> WorkOrderPriority {
    WorkOrderPriority::Medium
}

fn default_wo_status() -> WorkOrderStatus {
    WorkOrderStatus::Open
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewWorkOrder {
    pub property_id: PropertyId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: WorkOrderPriority,
    #[serde(default = "default_wo_status")]
    pub status: WorkOrderStatus,
    #[serde(default)]
    pub assigned_staff_id: Option<i64>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl Validate for NewWorkOrder {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkOrderPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<WorkOrderPriority>,
    pub status: Option<WorkOrderStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub assigned_staff_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl Validate for WorkOrderPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_opt("title", self.title.as_ref())
    }
}

impl Entity for WorkOrder {
    const KIND: EntityKind = EntityKind::WorkOrder;
    type New = NewWorkOrder;
    type Patch = WorkOrderPatch;

    fn build(id: i64, now: DateTime<Utc>, new: NewWorkOrder) -> Self {
        WorkOrder {
            id,
            property_id: new.property_id,
            title: new.title,
            description: new.description,
            priority: new.priority,
            status: new.status,
            assigned_staff_id: new.assigned_staff_id,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: WorkOrderPatch) {
        // ---
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.priority {
            self.priority = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.assigned_staff_id {
            self.assigned_staff_id = v;
        }
        if let Some(v) = patch.due_date {
            self.due_date = v;
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

    fn references(new: &NewWorkOrder) -> Vec<Reference> {
        let mut refs = vec![Reference::Property(new.property_id)];
        refs.extend(new.assigned_staff_id.map(Reference::Staff));
        refs
    }

    fn patch_references(patch: &WorkOrderPatch) -> Vec<Reference> {
        patch.assigned_staff_id.flatten().map(Reference::Staff).into_iter().collect()
    }
}

// ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderCost {
    pub id: i64,
    pub work_order_id: i64,
    pub description: String,
    pub category: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_cost_category() -> String {
    "labour".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewWorkOrderCost {
    pub work_order_id: i64,
    pub description: String,
    #[serde(default = "default_cost_category")]
    pub category: String,
    pub amount: f64,
}

impl Validate for NewWorkOrderCost {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("description", &self.description)?;
        check_amount(self.amount)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkOrderCostPatch {
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
}

impl Validate for WorkOrderCostPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_opt("description", self.description.as_ref())?;
        self.amount.map_or(Ok(()), check_amount)
    }
}

fn check_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::new("amount must be a non-negative number"));
    }
    Ok(())
}

impl Entity for WorkOrderCost {
    const KIND: EntityKind = EntityKind::WorkOrderCost;
    type New = NewWorkOrderCost;
    type Patch = WorkOrderCostPatch;

    fn build(id: i64, now: DateTime<Utc>, new: NewWorkOrderCost) -> Self {
        WorkOrderCost {
            id,
            work_order_id: new.work_order_id,
            description: new.description,
            category: new.category,
            amount: new.amount,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: WorkOrderCostPatch) {
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.amount {
            self.amount = v;
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn work_order_id(&self) -> Option<i64> {
        Some(self.work_order_id)
    }

    fn references(new: &NewWorkOrderCost) -> Vec<Reference> {
        vec![Reference::WorkOrder(new.work_order_id)]
    }
}

// ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewStaff {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Validate for NewStaff {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("role", &self.role)?;
        check_email(&self.email)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StaffPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
}

impl Validate for StaffPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text_opt("name", self.name.as_ref())?;
        require_text_opt("role", self.role.as_ref())?;
        self.email.as_deref().map_or(Ok(()), check_email)
    }
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::new(format!("{email:?} is not an email address"))),
    }
}

impl Entity for Staff {
    const KIND: EntityKind = EntityKind::Staff;
    type New = NewStaff;
    type Patch = StaffPatch;

    fn build(id: i64, now: DateTime<Utc>, new: NewStaff) -> Self {
        Staff {
            id,
            name: new.name,
            email: new.email,
            role: new.role,
            phone: new.phone,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: StaffPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.role {
            self.role = v;
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
