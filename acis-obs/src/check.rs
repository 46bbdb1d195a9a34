//! Full focal-plane review of one load.

use serde::{Deserialize, Serialize};

use crate::attributor::attribute;
use crate::catalog::{enrich, CatalogLookup, CatalogUnavailable};
use crate::classifier::{classify, hrc_science_filter, Classified};
use crate::config::CategoryLimits;
use crate::detector::{detect, Limit, LimitType, ViolationInterval};
use crate::error::Result;
use crate::segmenter::{segment, ObservationInterval};
use crate::series::TemperatureSeries;
use crate::state::CommandedState;

/// Violations of one limit line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitReport {
    /// Short key, e.g. `acis_s`
    pub key: String,
    /// Display name, e.g. `ACIS-S`
    pub name: String,
    pub limit_type: LimitType,
    pub limit: f64,
    pub violations: Vec<ViolationInterval>,
}

/// Outcome of checking a load against the focal-plane limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub load_start: f64,
    pub observations: Classified,
    pub limits: Vec<LimitReport>,
    /// True when the catalog could not be consulted and hot-candidate
    /// observations need checking by hand
    pub catalog_degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_warning: Option<String>,
}

impl LoadReport {
    pub fn violation_count(&self) -> usize {
        self.limits.iter().map(|l| l.violations.len()).sum()
    }

    pub fn limit(&self, key: &str) -> Option<&LimitReport> {
        self.limits.iter().find(|l| l.key == key)
    }

    /// Every violation in limit order.
    pub fn violations(&self) -> impl Iterator<Item = &ViolationInterval> {
        self.limits.iter().flat_map(|l| l.violations.iter())
    }

    /// Record that catalog data was missing for this run.
    pub fn mark_degraded(&mut self, reason: &CatalogUnavailable) {
        self.catalog_degraded = true;
        self.catalog_warning = Some(reason.warning());
    }
}

/// Segment the state stream and enrich the observations from the catalog.
///
/// Observations come back in chronological order. The second element is the
/// reason catalog data is missing, if it is.
pub fn find_obsid_intervals(
    states: &[CommandedState],
    load_start: f64,
    lookup: &dyn CatalogLookup,
) -> Result<(Vec<ObservationInterval>, Option<CatalogUnavailable>)> {
    let mut intervals = segment(states, load_start)?;
    let degraded = enrich(&mut intervals, lookup);
    intervals.sort_by(|a, b| a.tstart.total_cmp(&b.tstart));
    log::info!("Found {} observation(s) in the state stream", intervals.len());
    Ok((intervals, degraded))
}

fn planning_report(
    key: &str,
    limit: Limit,
    series: &TemperatureSeries,
    load_start: f64,
) -> Result<LimitReport> {
    let mask = series.mask_from(load_start);
    let violations = detect(series.times(), series.values(), &limit, Some(mask.view()))?;
    log::info!("{} violation(s) of the {} limit", violations.len(), limit.name);
    Ok(LimitReport {
        key: key.to_string(),
        name: limit.name,
        limit_type: limit.limit_type,
        limit: limit.value,
        violations,
    })
}

fn category_report(
    key: &str,
    limit: Limit,
    observations: &[ObservationInterval],
    series: &TemperatureSeries,
    load_start: f64,
) -> Result<LimitReport> {
    let violations = attribute(Vec::new(), observations, series, &limit, load_start)?;
    log::info!(
        "{} {} observation(s), {} violation(s) of {:.1} C",
        observations.len(),
        limit.name,
        violations.len(),
        limit.value
    );
    Ok(LimitReport {
        key: key.to_string(),
        name: limit.name,
        limit_type: limit.limit_type,
        limit: limit.value,
        violations,
    })
}

/// Check a predicted focal-plane temperature against the planning and
/// per-category limits.
///
/// HRC science observations are removed, the rest classified, and
/// violations reported in this order: planning high, planning low (if
/// configured), ACIS-I, ACIS-S, hot ACIS-S, and cold ECS.
pub fn check_load(
    observations: Vec<ObservationInterval>,
    series: &TemperatureSeries,
    load_start: f64,
    limits: &CategoryLimits,
) -> Result<LoadReport> {
    let classified = classify(hrc_science_filter(observations))?;

    let mut reports = vec![planning_report(
        "planning_hi",
        Limit::max("Planning", limits.planning_hi),
        series,
        load_start,
    )?];
    if let Some(lo) = limits.planning_lo {
        reports.push(planning_report(
            "planning_lo",
            Limit::min("Planning Low", lo),
            series,
            load_start,
        )?);
    }

    let categories = [
        ("acis_i", "ACIS-I", limits.acis_i, &classified.acis_i),
        ("acis_s", "ACIS-S", limits.acis_s, &classified.acis_s),
        ("acis_hot", "ACIS-S Hot", limits.acis_hot, &classified.acis_hot),
        ("cold_ecs", "Science Orbit ECS", limits.cold_ecs, &classified.cold_ecs),
    ];
    for (key, name, value, observations) in categories {
        reports.push(category_report(
            key,
            Limit::max(name, value),
            observations,
            series,
            load_start,
        )?);
    }

    Ok(LoadReport {
        load_start,
        observations: classified,
        limits: reports,
        catalog_degraded: false,
        catalog_warning: None,
    })
}

/// Segment, enrich, and check a load in one pass.
pub fn review_load(
    states: &[CommandedState],
    series: &TemperatureSeries,
    load_start: f64,
    limits: &CategoryLimits,
    lookup: &dyn CatalogLookup,
) -> Result<LoadReport> {
    let (observations, degraded) = find_obsid_intervals(states, load_start, lookup)?;
    let mut report = check_load(observations, series, load_start, limits)?;
    if let Some(reason) = degraded {
        report.mark_degraded(&reason);
    }
    Ok(report)
}
