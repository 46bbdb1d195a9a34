//! Attribution of limit violations to the observations they occur in.

use crate::detector::{detect, Limit, ViolationInterval};
use crate::error::Result;
use crate::segmenter::ObservationInterval;
use crate::series::TemperatureSeries;

/// Re-run detection inside each observation's science window.
///
/// Only observations whose science starts after `load_start` are examined.
/// For each, the samples with `start_science <= t <= tstop` are checked
/// against `limit` and every violation found is tagged with the
/// observation's obsid and exposure time. Results are appended to
/// `violations` in observation order. Overlapping windows can report the
/// same samples more than once.
pub fn attribute(
    mut violations: Vec<ViolationInterval>,
    observations: &[ObservationInterval],
    series: &TemperatureSeries,
    limit: &Limit,
    load_start: f64,
) -> Result<Vec<ViolationInterval>> {
    for obs in observations.iter().filter(|obs| obs.start_science > load_start) {
        let (start, stop) = obs.science_window();
        let (times, values) = series.window(start, stop);
        let found = detect(times, values, limit, None)?;
        if !found.is_empty() {
            log::debug!(
                "obsid {}: {} violation(s) of {}",
                obs.obsid,
                found.len(),
                limit.name
            );
        }
        violations.extend(found.into_iter().map(|mut viol| {
            viol.obsid = Some(obs.obsid);
            viol.exposure_time = obs.exposure_time();
            viol
        }));
    }
    Ok(violations)
}
