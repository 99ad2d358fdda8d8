//! View models for the property list, property detail and dashboard.
//!
//! Each loader takes one [`Snapshot`] from the store, up front, and then
//! assembles the view with the pure functions below, so every figure in a
//! response describes the same state. Nothing is cached between requests.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{aggregate_portfolio, percent, tally, AlertCounts, PortfolioStats};
use crate::error::StoreResult;
use crate::ident::PropertyId;
use crate::models::{ComplianceStatus, Inspection, Property, PropertyGroup, RiskLevel, Sensor};
use crate::store::{Snapshot, SnapshotRead, Store};

// ---

/// Flattened property row used by the list and the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub id: PropertyId,
    pub name: String,
    pub address: String,
    pub status: ComplianceStatus,
    pub risk_level: RiskLevel,
    pub alerts: AlertCounts,
    pub sensors_count: u32,
    pub last_inspection: Option<DateTime<Utc>>,
}

/// A stored property merged with its computed fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub property: Property,
    pub legacy_id: String,
    pub alert_counts: AlertCounts,
    pub sensors: Vec<Sensor>,
    pub sensors_count: u32,
    pub last_inspection: Option<DateTime<Utc>>,
    pub group: Option<PropertyGroup>,
    pub requires_attention: bool,
    pub portfolio_compliance_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: PortfolioStats,
    /// Properties with medium/high risk or non-compliant status, once each.
    pub properties: Vec<PropertySummary>,
}

// ---

fn sensors_by_property(sensors: &[Sensor]) -> HashMap<PropertyId, Vec<&Sensor>> {
    let mut map: HashMap<PropertyId, Vec<&Sensor>> = HashMap::new();
    for s in sensors {
        map.entry(s.property_id).or_default().push(s);
    }
    map
}

fn latest_inspections(inspections: &[Inspection]) -> HashMap<PropertyId, DateTime<Utc>> {
    // ---
    let mut map: HashMap<PropertyId, DateTime<Utc>> = HashMap::new();
    for i in inspections {
        map.entry(i.property_id)
            .and_modify(|at| *at = (*at).max(i.inspected_at))
            .or_insert(i.inspected_at);
    }
    map
}

/// Build one summary per property, in input order.
pub fn summarize<'a>(
    properties: impl IntoIterator<Item = &'a Property>,
    sensors: &[Sensor],
    inspections: &[Inspection],
) -> Vec<PropertySummary> {
    // ---
    let by_property = sensors_by_property(sensors);
    let inspected = latest_inspections(inspections);

    properties
        .into_iter()
        .map(|p| {
            let own = by_property.get(&p.id).map(Vec::as_slice).unwrap_or(&[]);
            PropertySummary {
                id: p.id,
                name: p.name.clone(),
                address: p.address.clone(),
                status: p.status,
                risk_level: p.risk_level,
                alerts: tally(own.iter().copied()),
                sensors_count: u32::try_from(own.len()).unwrap_or(u32::MAX),
                last_inspection: inspected.get(&p.id).copied(),
            }
        })
        .collect()
}

/// Portfolio stats plus the de-duplicated list of properties needing attention.
pub fn assemble_dashboard(
    properties: &[Property],
    sensors: &[Sensor],
    inspections: &[Inspection],
) -> Dashboard {
    // ---
    let stats = aggregate_portfolio(properties, sensors);

    let mut seen = HashSet::new();
    let attention = properties
        .iter()
        .filter(|p| p.requires_attention())
        .filter(|p| seen.insert(p.id));

    Dashboard {
        stats,
        properties: summarize(attention, sensors, inspections),
    }
}

// ---

/// Detail view for one property, computed entirely from `snap`.
pub fn assemble_detail(snap: &Snapshot, id: PropertyId) -> Option<PropertyDetail> {
    // ---
    let property = snap.properties.iter().find(|p| p.id == id)?.clone();

    let sensors: Vec<Sensor> = snap
        .sensors
        .iter()
        .filter(|s| s.property_id == id)
        .cloned()
        .collect();
    let last_inspection = snap
        .inspections
        .iter()
        .filter(|i| i.property_id == id)
        .map(|i| i.inspected_at)
        .max();
    let group = property
        .group_id
        .and_then(|g| snap.groups.iter().find(|grp| grp.id == g).cloned());
    let compliant = snap
        .properties
        .iter()
        .filter(|p| p.status == ComplianceStatus::Compliant)
        .count();

    Some(PropertyDetail {
        legacy_id: id.legacy(),
        alert_counts: tally(&sensors),
        sensors_count: u32::try_from(sensors.len()).unwrap_or(u32::MAX),
        last_inspection,
        group,
        requires_attention: property.requires_attention(),
        portfolio_compliance_rate: percent(
            u32::try_from(compliant).unwrap_or(u32::MAX),
            u32::try_from(snap.properties.len()).unwrap_or(u32::MAX),
            100,
        ),
        sensors,
        property,
    })
}

// ---

#[tracing::instrument(skip(store))]
pub async fn property_summaries(store: &dyn Store) -> StoreResult<Vec<PropertySummary>> {
    // ---
    let snap = store.snapshot().await?;
    tracing::debug!(
        "summarizing {} properties over {} sensors",
        snap.properties.len(),
        snap.sensors.len()
    );
    Ok(summarize(&snap.properties, &snap.sensors, &snap.inspections))
}

#[tracing::instrument(skip(store))]
pub async fn dashboard(store: &dyn Store) -> StoreResult<Dashboard> {
    // ---
    let snap = store.snapshot().await?;
    Ok(assemble_dashboard(&snap.properties, &snap.sensors, &snap.inspections))
}

/// `None` when no property has this id.
#[tracing::instrument(skip(store))]
pub async fn property_detail(
    store: &dyn Store,
    id: PropertyId,
) -> StoreResult<Option<PropertyDetail>> {
    // ---
    let snap = store.snapshot().await?;
    Ok(assemble_detail(&snap, id))
}
