//! Record storage.
//!
//! [`Store`] is the only way the rest of the service touches persisted data.
//! It is a bundle of one [`Repository`] per entity kind, so a backend
//! implements the five CRUD operations once, generically, and the view and
//! route layers never know which backend they are talking to.
//!
//! Contract shared by every backend:
//! - ids are assigned per kind, strictly increasing, never reused;
//! - `update` merges the patch and refreshes `updatedAt`;
//! - `delete` performs the cascade for its kind in the same atomic call:
//!   a property takes its sensors, alerts, documents, inspections,
//!   maintenance records and work orders (with their costs); a work order
//!   takes its costs; a group or staff member is unlinked from the records
//!   that referenced it;
//! - `snapshot` reads the collections the views aggregate over in one
//!   atomic step, so a view never mixes states from before and after a
//!   concurrent write.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{
    Alert, Document, Entity, Inspection, ListFilter, MaintenanceRecord, Property, PropertyGroup,
    Sensor, Staff, WorkOrder, WorkOrderCost,
};

mod memory;
mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

// ---

/// CRUD over one entity kind.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn create(&self, new: E::New) -> StoreResult<E>;

    async fn get(&self, id: i64) -> StoreResult<Option<E>>;

    /// Matching records, ordered by id.
    async fn list(&self, filter: ListFilter) -> StoreResult<Vec<E>>;

    async fn update(&self, id: i64, patch: E::Patch) -> StoreResult<Option<E>>;

    /// Returns `false` when no record had that id.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}

/// The collections read views are computed from, captured together.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub properties: Vec<Property>,
    pub sensors: Vec<Sensor>,
    pub inspections: Vec<Inspection>,
    pub groups: Vec<PropertyGroup>,
}

#[async_trait]
pub trait SnapshotRead: Send + Sync {
    /// Every property, sensor, inspection and group, each ordered by id,
    /// as of a single point in time.
    async fn snapshot(&self) -> StoreResult<Snapshot>;
}

/// Every repository the service needs, as a single capability.
pub trait Store:
    SnapshotRead
    + Repository<Property>
    + Repository<Sensor>
    + Repository<Alert>
    + Repository<Document>
    + Repository<Inspection>
    + Repository<MaintenanceRecord>
    + Repository<WorkOrder>
    + Repository<WorkOrderCost>
    + Repository<Staff>
    + Repository<PropertyGroup>
{
}

impl<T> Store for T where
    T: SnapshotRead
        + Repository<Property>
        + Repository<Sensor>
        + Repository<Alert>
        + Repository<Document>
        + Repository<Inspection>
        + Repository<MaintenanceRecord>
        + Repository<WorkOrder>
        + Repository<WorkOrderCost>
        + Repository<Staff>
        + Repository<PropertyGroup>
{
}

pub type SharedStore = Arc<dyn Store>;

// Kind-directed shorthands, so callers write `store.fetch::<Sensor>(id)`
// instead of naming the repository trait.
impl<'s> dyn Store + 's {
    pub async fn insert<E: Entity>(&self, new: E::New) -> StoreResult<E>
    where
        Self: Repository<E>,
    {
        Repository::<E>::create(self, new).await
    }

    pub async fn fetch<E: Entity>(&self, id: i64) -> StoreResult<Option<E>>
    where
        Self: Repository<E>,
    {
        Repository::<E>::get(self, id).await
    }

    pub async fn fetch_all<E: Entity>(&self, filter: ListFilter) -> StoreResult<Vec<E>>
    where
        Self: Repository<E>,
    {
        Repository::<E>::list(self, filter).await
    }

    pub async fn modify<E: Entity>(&self, id: i64, patch: E::Patch) -> StoreResult<Option<E>>
    where
        Self: Repository<E>,
    {
        Repository::<E>::update(self, id, patch).await
    }

    pub async fn remove<E: Entity>(&self, id: i64) -> StoreResult<bool>
    where
        Self: Repository<E>,
    {
        Repository::<E>::delete(self, id).await
    }

    pub async fn exists<E: Entity>(&self, id: i64) -> StoreResult<bool>
    where
        Self: Repository<E>,
    {
        Ok(self.fetch::<E>(id).await?.is_some())
    }
}
