//! In-process store backed by ordered maps.
//!
//! All tables live behind a single `RwLock`; each repository call takes the
//! lock exactly once, so a call (cascade included) is atomic with respect to
//! every other call.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Repository, Snapshot, SnapshotRead};
use crate::error::StoreResult;
use crate::ident::PropertyId;
use crate::models::{
    Alert, Document, Entity, EntityKind, Inspection, ListFilter, MaintenanceRecord, Property,
    PropertyGroup, Sensor, Staff, WorkOrder, WorkOrderCost,
};

// ---

#[derive(Debug)]
pub struct Table<E> {
    last_id: i64,
    rows: BTreeMap<i64, E>,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<E: Entity> Table<E> {
    fn drop_owned_by(&mut self, property: PropertyId) -> Vec<i64> {
        // ---
        let doomed: Vec<i64> = self
            .rows
            .values()
            .filter(|r| r.property_id() == Some(property))
            .map(|r| r.id())
            .collect();
        for id in &doomed {
            self.rows.remove(id);
        }
        doomed
    }
}

#[derive(Debug, Default)]
pub struct Tables {
    properties: Table<Property>,
    sensors: Table<Sensor>,
    alerts: Table<Alert>,
    documents: Table<Document>,
    inspections: Table<Inspection>,
    maintenance: Table<MaintenanceRecord>,
    work_orders: Table<WorkOrder>,
    costs: Table<WorkOrderCost>,
    staff: Table<Staff>,
    groups: Table<PropertyGroup>,
}

impl Tables {
    /// Apply the delete side effects for a record of `kind` that was just removed.
    fn cascade(&mut self, kind: EntityKind, id: i64, now: DateTime<Utc>) {
        // ---
        match kind {
            EntityKind::Property => {
                let property = PropertyId::new(id);
                self.sensors.drop_owned_by(property);
                self.alerts.drop_owned_by(property);
                self.documents.drop_owned_by(property);
                self.inspections.drop_owned_by(property);
                self.maintenance.drop_owned_by(property);
                let orders: HashSet<i64> =
                    self.work_orders.drop_owned_by(property).into_iter().collect();
                self.costs.rows.retain(|_, c| !orders.contains(&c.work_order_id));
            }
            EntityKind::WorkOrder => {
                self.costs.rows.retain(|_, c| c.work_order_id != id);
            }
            EntityKind::PropertyGroup => {
                for p in self.properties.rows.values_mut() {
                    if p.group_id == Some(id) {
                        p.group_id = None;
                        p.touch(now);
                    }
                }
            }
            EntityKind::Staff => {
                for wo in self.work_orders.rows.values_mut() {
                    if wo.assigned_staff_id == Some(id) {
                        wo.assigned_staff_id = None;
                        wo.touch(now);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Maps an entity kind onto its table. Sealed to this module.
pub trait Stored: Entity {
    fn table(tables: &Tables) -> &Table<Self>;
    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}

macro_rules! stored {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl Stored for $ty {
                fn table(tables: &Tables) -> &Table<Self> {
                    &tables.$field
                }
                fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
                    &mut tables.$field
                }
            }
        )*
    };
}

stored! {
    Property => properties,
    Sensor => sensors,
    Alert => alerts,
    Document => documents,
    Inspection => inspections,
    MaintenanceRecord => maintenance,
    WorkOrder => work_orders,
    WorkOrderCost => costs,
    Staff => staff,
    PropertyGroup => groups,
}

// ---

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn rows<E: Clone>(table: &Table<E>) -> Vec<E> {
    table.rows.values().cloned().collect()
}

#[async_trait]
impl SnapshotRead for MemoryStore {
    async fn snapshot(&self) -> StoreResult<Snapshot> {
        // ---
        let tables = self.tables.read().await;
        Ok(Snapshot {
            properties: rows(&tables.properties),
            sensors: rows(&tables.sensors),
            inspections: rows(&tables.inspections),
            groups: rows(&tables.groups),
        })
    }
}

#[async_trait]
impl<E: Stored> Repository<E> for MemoryStore {
    async fn create(&self, new: E::New) -> StoreResult<E> {
        // ---
        let mut tables = self.tables.write().await;
        let table = E::table_mut(&mut tables);
        table.last_id += 1;
        let record = E::build(table.last_id, Utc::now(), new);
        table.rows.insert(table.last_id, record.clone());
        tracing::debug!("created {} {}", E::KIND, table.last_id);
        Ok(record)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<E>> {
        let tables = self.tables.read().await;
        Ok(E::table(&tables).rows.get(&id).cloned())
    }

    async fn list(&self, filter: ListFilter) -> StoreResult<Vec<E>> {
        let tables = self.tables.read().await;
        Ok(E::table(&tables)
            .rows
            .values()
            .filter(|r| filter.matches(*r))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, patch: E::Patch) -> StoreResult<Option<E>> {
        // ---
        let mut tables = self.tables.write().await;
        let Some(record) = E::table_mut(&mut tables).rows.get_mut(&id) else {
            return Ok(None);
        };
        record.apply(patch);
        record.touch(Utc::now());
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        // ---
        let mut tables = self.tables.write().await;
        if E::table_mut(&mut tables).rows.remove(&id).is_none() {
            return Ok(false);
        }
        tables.cascade(E::KIND, id, Utc::now());
        tracing::debug!("deleted {} {}", E::KIND, id);
        Ok(true)
    }
}
