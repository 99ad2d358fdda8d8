//! Alert histograms and portfolio statistics.
//!
//! Both aggregates are recomputed from live records on every read. The pure
//! halves ([`tally`], [`aggregate_portfolio`]) work on slices so they can be
//! tested without a store; [`aggregate_alerts`] is the store-backed entry
//! point used by the routes.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::classify::{classify, Severity};
use crate::error::StoreResult;
use crate::ident::{resolve, PropertyId, RawId};
use crate::models::{ComplianceStatus, ListFilter, Property, RiskLevel, Sensor, SensorStatus};
use crate::store::Store;

// ---

/// Count of a property's sensors currently in each alerting band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl AlertCounts {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::None => {}
        }
    }
}

/// Classify every sensor's current reading and count the results.
pub fn tally<'a>(sensors: impl IntoIterator<Item = &'a Sensor>) -> AlertCounts {
    // ---
    let mut counts = AlertCounts::default();
    for s in sensors {
        counts.record(classify(s.sensor_type, &s.current_reading));
    }
    counts
}

/// Alert histogram for one property.
///
/// An identifier that does not resolve, or a property with no sensors,
/// yields an all-zero histogram rather than an error.
pub async fn aggregate_alerts<'a>(
    store: &dyn Store,
    raw: impl Into<RawId<'a>>,
) -> StoreResult<AlertCounts> {
    // ---
    let Some(id) = resolve(raw) else {
        return Ok(AlertCounts::default());
    };
    alerts_for(store, id).await
}

pub async fn alerts_for(store: &dyn Store, id: PropertyId) -> StoreResult<AlertCounts> {
    let sensors: Vec<Sensor> = store.fetch_all(ListFilter::Property(id)).await?;
    Ok(tally(&sensors))
}

// ---

/// Portfolio-wide risk and compliance figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub total_properties: u32,
    pub high_risk_properties: u32,
    pub medium_risk_properties: u32,
    pub low_risk_properties: u32,
    pub no_risk_properties: u32,
    pub compliant_properties: u32,
    pub non_compliant_properties: u32,
    pub pending_review_properties: u32,
    /// Percentage of compliant properties; 100 for an empty portfolio.
    pub compliance_rate: u32,
    /// Properties that are high risk, non-compliant, or both; each counted once.
    pub high_risk_and_non_compliant_count: u32,
    /// Percentage of properties requiring attention; 0 for an empty portfolio.
    pub at_risk_percentage: u32,
    pub total_sensors: u32,
    pub active_sensors: u32,
    /// Percentage of active sensors; 100 when there are none.
    pub active_sensor_rate: u32,
}

/// Bucket properties by risk level and, independently, by compliance status.
pub fn aggregate_portfolio(properties: &[Property], sensors: &[Sensor]) -> PortfolioStats {
    // ---
    let mut stats = PortfolioStats {
        total_properties: count(properties.len()),
        high_risk_properties: 0,
        medium_risk_properties: 0,
        low_risk_properties: 0,
        no_risk_properties: 0,
        compliant_properties: 0,
        non_compliant_properties: 0,
        pending_review_properties: 0,
        compliance_rate: 0,
        high_risk_and_non_compliant_count: 0,
        at_risk_percentage: 0,
        total_sensors: count(sensors.len()),
        active_sensors: 0,
        active_sensor_rate: 0,
    };

    // Union by id: a property in both buckets is one property.
    let mut flagged: BTreeSet<PropertyId> = BTreeSet::new();
    let mut attention: BTreeSet<PropertyId> = BTreeSet::new();

    for p in properties {
        match p.risk_level {
            RiskLevel::High => stats.high_risk_properties += 1,
            RiskLevel::Medium => stats.medium_risk_properties += 1,
            RiskLevel::Low => stats.low_risk_properties += 1,
            RiskLevel::None => stats.no_risk_properties += 1,
        }
        match p.status {
            ComplianceStatus::Compliant => stats.compliant_properties += 1,
            ComplianceStatus::NonCompliant => stats.non_compliant_properties += 1,
            ComplianceStatus::PendingReview => stats.pending_review_properties += 1,
        }
        if p.risk_level == RiskLevel::High || p.status == ComplianceStatus::NonCompliant {
            flagged.insert(p.id);
        }
        if p.requires_attention() {
            attention.insert(p.id);
        }
    }

    stats.active_sensors = count(
        sensors
            .iter()
            .filter(|s| s.status == SensorStatus::Active)
            .count(),
    );

    stats.high_risk_and_non_compliant_count = count(flagged.len());
    stats.compliance_rate = percent(stats.compliant_properties, stats.total_properties, 100);
    stats.at_risk_percentage = percent(count(attention.len()), stats.total_properties, 0);
    stats.active_sensor_rate = percent(stats.active_sensors, stats.total_sensors, 100);
    stats
}

/// `round(100 * part / whole)` with halves rounded up, or `empty` when
/// `whole` is zero. Integer arithmetic, so there is no float drift at .5.
pub fn percent(part: u32, whole: u32, empty: u32) -> u32 {
    // ---
    if whole == 0 {
        return empty;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((200 * part + whole) / (2 * whole)) as u32
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
