//! Readers for commanded states, temperatures, residuals, and saved catalogs.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use acis_obs::{CommandedState, StaticCatalog, TemperatureSeries, ValidationSeries};
use ndarray::Array1;

use crate::{IoError, Result};

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Read commanded states from a JSON array or a CSV file with a header row.
pub fn read_states(path: &Path) -> Result<Vec<CommandedState>> {
    let states: Vec<CommandedState> = match extension(path).as_deref() {
        Some("json") => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        Some("csv") => csv::Reader::from_path(path)?
            .deserialize()
            .collect::<std::result::Result<_, _>>()?,
        _ => return Err(IoError::UnsupportedFormat(path.to_path_buf())),
    };
    log::info!("Read {} commanded states from {path:?}", states.len());
    Ok(states)
}

#[derive(Debug, Deserialize)]
struct TemperatureRow {
    time: f64,
    value: f64,
}

/// Read a `time,value` CSV temperature trace.
pub fn read_temperatures(path: &Path) -> Result<TemperatureSeries> {
    let rows: Vec<TemperatureRow> = csv::Reader::from_path(path)?
        .deserialize()
        .collect::<std::result::Result<_, _>>()?;
    let (times, values): (Vec<f64>, Vec<f64>) = rows.into_iter().map(|r| (r.time, r.value)).unzip();
    log::info!("Read {} temperature samples from {path:?}", times.len());
    Ok(TemperatureSeries::from_vecs(times, values)?)
}

#[derive(Debug, Deserialize)]
struct ValidationRow {
    msid: String,
    model: f64,
    telemetry: f64,
    #[serde(default)]
    good: Option<bool>,
}

/// Read model and telemetry samples as residuals keyed by MSID.
///
/// Columns are `msid,time,model,telemetry` with an optional `good` column.
/// A good-time mask is built for an MSID only when one of its rows sets
/// `good`; blank cells count as good.
pub fn read_validation(path: &Path) -> Result<BTreeMap<String, ValidationSeries>> {
    let mut grouped: BTreeMap<String, (Vec<f64>, Vec<Option<bool>>)> = BTreeMap::new();
    for row in csv::Reader::from_path(path)?.deserialize() {
        let row: ValidationRow = row?;
        let (residuals, good) = grouped.entry(row.msid).or_default();
        residuals.push(row.model - row.telemetry);
        good.push(row.good);
    }

    grouped
        .into_iter()
        .map(|(msid, (residuals, good))| -> Result<(String, ValidationSeries)> {
            let mask = good
                .iter()
                .any(Option::is_some)
                .then(|| good.iter().map(|g| g.unwrap_or(true)).collect::<Array1<bool>>());
            let series = ValidationSeries::new(Array1::from(residuals), mask)?;
            Ok((msid, series))
        })
        .collect()
}

/// Read catalog entries saved as JSON.
pub fn read_catalog(path: &Path) -> Result<StaticCatalog> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}
