//! Model validation against telemetry residual quantiles.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ValidationLimit;
use crate::error::{Result, ThermalCheckError};

/// Residuals (model minus telemetry) for one MSID.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSeries {
    pub residuals: Array1<f64>,
    /// Samples to include; all samples when absent
    pub good_mask: Option<Array1<bool>>,
}

impl ValidationSeries {
    pub fn new(residuals: Array1<f64>, good_mask: Option<Array1<bool>>) -> Result<Self> {
        if let Some(mask) = &good_mask {
            if mask.len() != residuals.len() {
                return Err(ThermalCheckError::SeriesLengthMismatch {
                    name: "good_mask",
                    expected: residuals.len(),
                    actual: mask.len(),
                });
            }
        }
        Ok(Self {
            residuals,
            good_mask,
        })
    }

    /// Residuals that are good and not NaN.
    fn usable(&self) -> Vec<f64> {
        self.residuals
            .iter()
            .enumerate()
            .filter(|(i, _)| self.good_mask.as_ref().map_or(true, |m| m[*i]))
            .map(|(_, &r)| r)
            .filter(|r| !r.is_nan())
            .collect()
    }
}

/// A residual quantile outside its validation limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub msid: String,
    pub quantile: f64,
    pub value: f64,
    pub limit: f64,
}

/// Percentile `q` in `[0, 100]` of `data`, interpolating linearly between
/// order statistics. NaN samples are ignored; `None` when nothing is left.
pub fn quantile(data: ArrayView1<f64>, q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted_quantile(&mut sorted, q)
}

fn sorted_quantile(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let pos = (q / 100.0).clamp(0.0, 1.0) * (values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(values[lo] + (values[hi] - values[lo]) * frac)
}

/// Compare residual quantiles of every MSID with its validation limits.
///
/// MSIDs with no configured limits are skipped, as are series with no
/// usable samples.
pub fn validation_violations(
    series: &BTreeMap<String, ValidationSeries>,
    limits: &BTreeMap<String, Vec<ValidationLimit>>,
) -> Vec<ValidationViolation> {
    let mut violations = Vec::new();

    for (msid, data) in series {
        let Some(msid_limits) = limits.get(msid) else {
            log::debug!("no validation limits for {msid}");
            continue;
        };
        let mut usable = data.usable();
        for limit in msid_limits {
            let Some(value) = sorted_quantile(&mut usable, limit.quantile) else {
                continue;
            };
            if value.abs() > limit.limit {
                log::warn!(
                    "{msid} {}% quantile value of {value:.3} exceeds limit of {:.2}",
                    limit.quantile,
                    limit.limit
                );
                violations.push(ValidationViolation {
                    msid: msid.clone(),
                    quantile: limit.quantile,
                    value,
                    limit: limit.limit,
                });
            }
        }
    }
    violations
}
