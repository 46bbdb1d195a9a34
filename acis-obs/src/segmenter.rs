//! Observation interval extraction from the commanded-state stream.
//!
//! An observation runs from the power-down that precedes it (`WSPOW00000`
//! or `WSVIDALLDN`), through the first science start (`XTZ0000005` or
//! `XCZ0000005`), to the first stop science (`AA00000000`) after that. Only
//! one interval is under construction at a time; intermediate configuration
//! commands update the chip list without changing state.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{Result, ThermalCheckError};
use crate::focal_plane::{locate, Instrument};
use crate::power::{decode_power, POWER_DOWN, POWER_PREFIX};
use crate::state::{CommandedState, SegmenterState};
use crate::ObsId;

/// Obsids reserved for maneuvers. States carrying these never open,
/// advance, or close an observation.
pub const MANEUVER_OBSIDS: Range<ObsId> = 38001..60000;

/// Power command tokens the segmenter reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PowerToken {
    /// Full power down; opens an interval
    Open,
    /// Chip configuration (`WSPOWxxxxx` other than power down)
    Configure,
    /// Start science
    ScienceStart,
    /// Stop science; closes an interval
    StopScience,
    Other,
}

impl PowerToken {
    fn classify(power_cmd: &str) -> Self {
        match power_cmd {
            POWER_DOWN | "WSVIDALLDN" => PowerToken::Open,
            "XTZ0000005" | "XCZ0000005" => PowerToken::ScienceStart,
            "AA00000000" => PowerToken::StopScience,
            cmd if cmd.starts_with(POWER_PREFIX) => PowerToken::Configure,
            _ => PowerToken::Other,
        }
    }
}

/// A single science observation reconstructed from commanded states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationInterval {
    pub obsid: ObsId,
    pub datestart: String,
    pub datestop: String,
    pub tstart: f64,
    pub tstop: f64,
    /// Time of the first science start marker
    pub start_science: f64,
    pub instrument: Instrument,
    pub ccd_count: u8,
    /// Comma-joined chip list from the last configuration command, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ccds: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grating: Option<String>,
    /// Expected count rate (counts/s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnt_rate: Option<f64>,
    /// Approved exposure of the whole sequence, catalog units scaled by 1000
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_exp: Option<f64>,
    /// `floor(cnt_rate * app_exp)`, filled in by the classifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_counts: Option<i64>,
}

impl ObservationInterval {
    /// Catalog fields, present only if every one of them was enriched.
    pub fn catalog_fields(&self) -> Option<(&str, f64, f64)> {
        match (&self.grating, self.cnt_rate, self.app_exp) {
            (Some(grating), Some(cnt_rate), Some(app_exp)) => {
                Some((grating.as_str(), cnt_rate, app_exp))
            }
            _ => None,
        }
    }

    /// True if `chip` appears in the chip list.
    pub fn has_ccd(&self, chip: &str) -> bool {
        self.ccds
            .as_deref()
            .is_some_and(|ccds| ccds.split(',').any(|c| c.trim() == chip))
    }

    /// Exposure in catalog units (ks), if the catalog was available.
    pub fn exposure_time(&self) -> Option<f64> {
        self.app_exp.map(|exp| exp * 1.0e-3)
    }

    /// Science window `[start_science, tstop]` in mission seconds.
    pub fn science_window(&self) -> (f64, f64) {
        (self.start_science, self.tstop)
    }
}

/// Advance the segmenter by one (already filtered) record.
///
/// Returns the next state and the interval completed by this record, if any.
fn advance(
    state: SegmenterState,
    record: &CommandedState,
) -> Result<(SegmenterState, Option<ObservationInterval>)> {
    use SegmenterState::*;

    let token = PowerToken::classify(&record.power_cmd);

    let transition = match (state, token) {
        (Idle, PowerToken::Open) => (
            AwaitingScienceStart {
                datestart: record.datestart.clone(),
                tstart: record.tstart,
                ccds: None,
            },
            None,
        ),

        (
            AwaitingScienceStart {
                datestart, tstart, ..
            },
            PowerToken::Configure,
        ) => (
            AwaitingScienceStart {
                datestart,
                tstart,
                ccds: Some(decode_ccds(&record.power_cmd)?),
            },
            None,
        ),
        (
            AwaitingScienceStart {
                datestart,
                tstart,
                ccds,
            },
            PowerToken::ScienceStart,
        ) => {
            let instrument = locate(record.simpos);
            if instrument == Instrument::LaunchLock {
                log::warn!(
                    "obsid {} started science with SIM at {} (launchlock)",
                    record.obsid,
                    record.simpos
                );
            }
            (
                InScience {
                    datestart,
                    tstart,
                    ccds,
                    start_science: record.tstart,
                    instrument,
                    ccd_count: record.ccd_count,
                },
                None,
            )
        }
        (AwaitingScienceStart { datestart, .. }, PowerToken::StopScience) => {
            log::debug!(
                "Discarding interval opened at {datestart}: stop science at {} without science start",
                record.datestart
            );
            (Idle, None)
        }

        (
            InScience {
                datestart,
                tstart,
                start_science,
                instrument,
                ccd_count,
                ..
            },
            PowerToken::Configure,
        ) => (
            InScience {
                datestart,
                tstart,
                ccds: Some(decode_ccds(&record.power_cmd)?),
                start_science,
                instrument,
                ccd_count,
            },
            None,
        ),
        (
            InScience {
                datestart,
                tstart,
                ccds,
                start_science,
                instrument,
                ccd_count,
            },
            PowerToken::StopScience,
        ) => {
            let interval = ObservationInterval {
                obsid: record.obsid,
                datestart,
                datestop: record.datestop.clone(),
                tstart,
                tstop: record.tstop,
                start_science,
                instrument,
                ccd_count,
                ccds,
                grating: None,
                cnt_rate: None,
                app_exp: None,
                num_counts: None,
            };
            (Idle, Some(interval))
        }

        // Repeated opens and science starts are ignored while an interval
        // is in flight; everything else leaves the state alone.
        (state, _) => (state, None),
    };

    Ok(transition)
}

fn decode_ccds(power_cmd: &str) -> Result<String> {
    Ok(decode_power(power_cmd)?.ccds_joined())
}

/// Streaming observation segmenter
#[derive(Debug, Clone)]
pub struct ObservationSegmenter {
    state: SegmenterState,
    load_start: f64,
    intervals: Vec<ObservationInterval>,
    records_seen: usize,
    last_tstart: Option<f64>,
}

impl ObservationSegmenter {
    /// Create a segmenter for a load starting at `load_start` (mission seconds).
    pub fn new(load_start: f64) -> Self {
        Self {
            state: SegmenterState::Idle,
            load_start,
            intervals: Vec::new(),
            records_seen: 0,
            last_tstart: None,
        }
    }

    pub fn state(&self) -> &SegmenterState {
        &self.state
    }

    pub fn intervals(&self) -> &[ObservationInterval] {
        &self.intervals
    }

    fn validate(&mut self, record: &CommandedState) -> Result<()> {
        let index = self.records_seen;
        self.records_seen += 1;

        let malformed = |reason: String| ThermalCheckError::MalformedStateStream { index, reason };

        if !record.tstart.is_finite() || !record.tstop.is_finite() {
            return Err(malformed("non-finite tstart/tstop".to_string()));
        }
        if record.tstop < record.tstart {
            return Err(malformed(format!(
                "tstop {} precedes tstart {}",
                record.tstop, record.tstart
            )));
        }
        if let Some(previous) = self.last_tstart {
            if record.tstart < previous {
                return Err(malformed(format!(
                    "tstart {} precedes previous tstart {previous}",
                    record.tstart
                )));
            }
        }
        self.last_tstart = Some(record.tstart);
        Ok(())
    }

    /// Feed the next commanded state.
    pub fn process(&mut self, record: &CommandedState) -> Result<()> {
        self.validate(record)?;

        if MANEUVER_OBSIDS.contains(&record.obsid) {
            return Ok(());
        }
        // States ending before the load cannot affect its review window
        if record.tstop < self.load_start {
            return Ok(());
        }

        let state = std::mem::take(&mut self.state);
        let (next, completed) = advance(state, record)?;
        self.state = next;

        if let Some(interval) = completed {
            log::debug!(
                "obsid {} {} science {} -> {}",
                interval.obsid,
                interval.instrument,
                interval.start_science,
                interval.tstop
            );
            self.intervals.push(interval);
        }
        Ok(())
    }

    /// Consume the segmenter and return intervals in stream order.
    ///
    /// An interval still in flight at the end of the stream is dropped.
    pub fn finish(self) -> Vec<ObservationInterval> {
        if !self.state.is_idle() {
            log::debug!("State stream ended with an observation still open");
        }
        self.intervals
    }
}

/// Segment a full state stream, returning intervals sorted by obsid.
pub fn segment(states: &[CommandedState], load_start: f64) -> Result<Vec<ObservationInterval>> {
    let mut segmenter = ObservationSegmenter::new(load_start);
    for record in states {
        segmenter.process(record)?;
    }
    let mut intervals = segmenter.finish();
    intervals.sort_by_key(|interval| interval.obsid);
    Ok(intervals)
}
