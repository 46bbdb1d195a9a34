//! Detection of maximal runs of samples beyond a limit.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ThermalCheckError};
use crate::time_utils::secs_to_date_lossy;
use crate::ObsId;

/// Direction in which a limit is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitType {
    /// Values above the limit violate it
    Max,
    /// Values below the limit violate it
    Min,
}

impl LimitType {
    pub fn exceeds(&self, value: f64, limit: f64) -> bool {
        match self {
            LimitType::Max => value > limit,
            LimitType::Min => value < limit,
        }
    }

    /// The more extreme of two values in the direction of this limit.
    fn more_extreme(&self, a: f64, b: f64) -> f64 {
        match self {
            LimitType::Max => a.max(b),
            LimitType::Min => a.min(b),
        }
    }
}

impl fmt::Display for LimitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitType::Max => f.write_str("Max"),
            LimitType::Min => f.write_str("Min"),
        }
    }
}

/// A named limit line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub name: String,
    pub value: f64,
    pub limit_type: LimitType,
}

impl Limit {
    pub fn new(name: impl Into<String>, value: f64, limit_type: LimitType) -> Self {
        Self {
            name: name.into(),
            value,
            limit_type,
        }
    }

    pub fn max(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, value, LimitType::Max)
    }

    pub fn min(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, value, LimitType::Min)
    }
}

/// A maximal run of samples beyond a limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationInterval {
    pub datestart: String,
    pub datestop: String,
    pub tstart: f64,
    pub tstop: f64,
    /// `tstop - tstart` in seconds
    pub duration: f64,
    /// Maximum (max limits) or minimum (min limits) value over the run
    pub extreme_value: f64,
    pub limit_name: String,
    pub limit_type: LimitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsid: Option<ObsId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,
}

/// Run under construction: first and last sample index and the extreme so far.
struct Run {
    first: usize,
    last: usize,
    extreme: f64,
}

fn close_run(run: Run, times: &ArrayView1<f64>, limit: &Limit) -> ViolationInterval {
    let tstart = times[run.first];
    let tstop = times[run.last];
    ViolationInterval {
        datestart: secs_to_date_lossy(tstart),
        datestop: secs_to_date_lossy(tstop),
        tstart,
        tstop,
        duration: tstop - tstart,
        extreme_value: run.extreme,
        limit_name: limit.name.clone(),
        limit_type: limit.limit_type,
        obsid: None,
        exposure_time: None,
    }
}

/// Find every maximal run of consecutive samples beyond `limit`.
///
/// A sample belongs to a run when it violates the limit and `mask` (if
/// given) is true at its index. Runs end at the first ineligible or
/// non-violating sample, or at the end of input. No filtering by load start
/// happens here; callers restrict samples with `mask` or by windowing.
/// Times with no calendar representation get their seconds as the date.
///
/// Errors only when `values` or `mask` differ in length from `times`.
///
/// # Arguments
/// * `times` - Sample times in mission seconds, strictly increasing
/// * `values` - Sample values, same length as `times`
/// * `limit` - Limit line to check against
/// * `mask` - Optional eligibility mask, same length as `times`
pub fn detect(
    times: ArrayView1<f64>,
    values: ArrayView1<f64>,
    limit: &Limit,
    mask: Option<ArrayView1<bool>>,
) -> Result<Vec<ViolationInterval>> {
    if values.len() != times.len() {
        return Err(ThermalCheckError::SeriesLengthMismatch {
            name: "values",
            expected: times.len(),
            actual: values.len(),
        });
    }
    if let Some(mask) = &mask {
        if mask.len() != times.len() {
            return Err(ThermalCheckError::SeriesLengthMismatch {
                name: "mask",
                expected: times.len(),
                actual: mask.len(),
            });
        }
    }

    let mut violations = Vec::new();
    let mut current: Option<Run> = None;

    for (i, &value) in values.iter().enumerate() {
        let eligible = mask.as_ref().map_or(true, |m| m[i]);
        let exceeding = eligible && limit.limit_type.exceeds(value, limit.value);

        current = match (current.take(), exceeding) {
            (Some(mut run), true) => {
                run.last = i;
                run.extreme = limit.limit_type.more_extreme(run.extreme, value);
                Some(run)
            }
            (None, true) => Some(Run {
                first: i,
                last: i,
                extreme: value,
            }),
            (Some(run), false) => {
                violations.push(close_run(run, &times, limit));
                None
            }
            (None, false) => None,
        };
    }
    if let Some(run) = current {
        violations.push(close_run(run, &times, limit));
    }

    Ok(violations)
}
