//! Parsing of the Obscat text table format.
//!
//! A reply is a tab-separated table. Lines starting with `#` and blank lines
//! are ignored; of the rest, the first is the header, the second is skipped
//! (column widths), and data starts on the third.

use std::collections::{BTreeSet, HashMap};

use acis_obs::{CatalogEntry, ObsId};

use crate::{OcatError, Result};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OcatTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl OcatTable {
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'));

        let columns: Vec<String> = match lines.next() {
            Some(header) => header.split('\t').map(|c| c.trim().to_string()).collect(),
            None => return Err(OcatError::Parse("empty table".to_string())),
        };
        let rows = lines
            .skip(1)
            .map(|line| line.split('\t').map(|c| c.trim().to_string()).collect())
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, name: &'static str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or(OcatError::MissingColumn(name))
    }

    /// Cells of one column, blank where a row is short.
    fn cells(&self, name: &'static str) -> Result<impl Iterator<Item = &str>> {
        let index = self.column(name)?;
        Ok(self
            .rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or("")))
    }
}

fn parse_float(column: &str, cell: &str) -> Result<f64> {
    if cell.is_empty() {
        return Ok(0.0);
    }
    cell.parse()
        .map_err(|_| OcatError::Parse(format!("{column}: not a number: {cell:?}")))
}

/// One row of the per-obsid table.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsidRow {
    pub obsid: ObsId,
    /// Sequence number, absent for blank cells
    pub seq_num: Option<String>,
    pub grating: String,
    pub cnt_rate: f64,
}

impl ObsidRow {
    pub fn from_table(table: &OcatTable) -> Result<Vec<Self>> {
        let obsids = table.cells("OBSID")?;
        let seq_nums = table.cells("SEQ_NUM")?;
        let gratings = table.cells("GRAT")?;
        let cnt_rates = table.cells("EST_CNT_RATE")?;

        obsids
            .zip(seq_nums)
            .zip(gratings.zip(cnt_rates))
            .map(|((obsid, seq_num), (grating, cnt_rate))| -> Result<ObsidRow> {
                Ok(ObsidRow {
                    obsid: obsid
                        .parse()
                        .map_err(|_| OcatError::Parse(format!("OBSID: {obsid:?}")))?,
                    seq_num: (!seq_num.is_empty()).then(|| seq_num.to_string()),
                    grating: grating.to_string(),
                    cnt_rate: parse_float("EST_CNT_RATE", cnt_rate)?,
                })
            })
            .collect()
    }
}

/// Distinct sequence numbers, sorted.
pub fn sequence_numbers(rows: &[ObsidRow]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.seq_num.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Approved exposure (ks) summed over every row of each sequence.
pub fn sequence_exposures(table: &OcatTable) -> Result<HashMap<String, f64>> {
    let mut exposures = HashMap::new();
    for (seq_num, app_exp) in table.cells("SEQ_NUM")?.zip(table.cells("APP_EXP")?) {
        if seq_num.is_empty() {
            continue;
        }
        *exposures.entry(seq_num.to_string()).or_insert(0.0) += parse_float("APP_EXP", app_exp)?;
    }
    Ok(exposures)
}

/// Combine per-obsid rows with sequence exposures into catalog entries.
///
/// Observations without a sequence number get zero exposure.
pub fn catalog_entries(
    rows: &[ObsidRow],
    exposures: &HashMap<String, f64>,
) -> HashMap<ObsId, CatalogEntry> {
    rows.iter()
        .map(|row| {
            let app_exp = row
                .seq_num
                .as_ref()
                .and_then(|seq| exposures.get(seq))
                .copied()
                .unwrap_or(0.0);
            (
                row.obsid,
                CatalogEntry {
                    grating: row.grating.clone(),
                    cnt_rate: row.cnt_rate,
                    app_exp,
                },
            )
        })
        .collect()
}
