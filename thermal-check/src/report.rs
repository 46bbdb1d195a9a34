//! Report files and the console summary.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use acis_obs::{LoadReport, ObsId, ValidationViolation};

use crate::Result;

pub const REPORT_FILE: &str = "report.json";
pub const VIOLATIONS_FILE: &str = "violations.csv";
pub const VALIDATION_FILE: &str = "validation.csv";

#[derive(Debug, Serialize)]
struct ViolationRow<'a> {
    limit: &'a str,
    limit_type: String,
    limit_value: f64,
    datestart: &'a str,
    datestop: &'a str,
    tstart: f64,
    tstop: f64,
    duration: f64,
    extreme_value: f64,
    obsid: Option<ObsId>,
    exposure_time: Option<f64>,
}

/// Write `report.json` into `dir`.
pub fn write_report(report: &LoadReport, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(REPORT_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}

/// Write one CSV row per violation of any limit.
pub fn write_violations_csv(report: &LoadReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for limit in &report.limits {
        for viol in &limit.violations {
            wtr.serialize(ViolationRow {
                limit: &limit.name,
                limit_type: limit.limit_type.to_string(),
                limit_value: limit.limit,
                datestart: &viol.datestart,
                datestop: &viol.datestop,
                tstart: viol.tstart,
                tstop: viol.tstop,
                duration: viol.duration,
                extreme_value: viol.extreme_value,
                obsid: viol.obsid,
                exposure_time: viol.exposure_time,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_validation_csv(violations: &[ValidationViolation], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for viol in violations {
        wtr.serialize(viol)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every output file into `dir`, creating it if needed.
pub fn write_outputs(
    report: &LoadReport,
    validation: &[ValidationViolation],
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = vec![write_report(report, dir)?];

    let violations_path = dir.join(VIOLATIONS_FILE);
    write_violations_csv(report, &violations_path)?;
    written.push(violations_path);

    if !validation.is_empty() {
        let validation_path = dir.join(VALIDATION_FILE);
        write_validation_csv(validation, &validation_path)?;
        written.push(validation_path);
    }
    Ok(written)
}

/// Human-readable summary of a load review.
pub fn format_summary(report: &LoadReport, validation: &[ValidationViolation]) -> String {
    let mut out = String::new();
    let obs = &report.observations;

    let _ = writeln!(out, "Focal plane load review");
    let _ = writeln!(out, "=======================");
    let _ = writeln!(
        out,
        "Observations: {} ACIS-I, {} ACIS-S, {} ACIS-S hot, {} ECS",
        obs.acis_i.len(),
        obs.acis_s.len(),
        obs.acis_hot.len(),
        obs.cold_ecs.len()
    );
    if let Some(warning) = &report.catalog_warning {
        let _ = writeln!(out, "WARNING: {warning}");
    }

    for limit in &report.limits {
        let _ = writeln!(
            out,
            "\n{} ({} {:.1} C): {} violation(s)",
            limit.name,
            limit.limit_type,
            limit.limit,
            limit.violations.len()
        );
        for viol in &limit.violations {
            let obsid = viol.obsid.map(|o| format!("obsid {o:>5}  ")).unwrap_or_default();
            let _ = writeln!(
                out,
                "  {obsid}{} - {}  {:8.1} s  {:7.2} C",
                viol.datestart, viol.datestop, viol.duration, viol.extreme_value
            );
        }
    }

    if !validation.is_empty() {
        let _ = writeln!(out, "\nModel validation: {} violation(s)", validation.len());
        for viol in validation {
            let _ = writeln!(
                out,
                "  {} {}% quantile {:.3} exceeds {:.2}",
                viol.msid, viol.quantile, viol.value, viol.limit
            );
        }
    }
    out
}
