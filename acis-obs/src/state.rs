use serde::{Deserialize, Serialize};

use crate::focal_plane::Instrument;
use crate::ObsId;

/// One commanded-state record: the spacecraft configuration in effect over
/// `[tstart, tstop]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandedState {
    pub obsid: ObsId,
    pub datestart: String,
    pub datestop: String,
    /// Mission seconds
    pub tstart: f64,
    /// Mission seconds
    pub tstop: f64,
    /// Last ACIS power command in effect
    pub power_cmd: String,
    /// SIM translation stage position
    pub simpos: i32,
    pub ccd_count: u8,
}

/// Observation segmenter states
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SegmenterState {
    /// Waiting for a power-down that opens the next observation
    #[default]
    Idle,
    /// Interval opened, waiting for the first science start marker
    AwaitingScienceStart {
        datestart: String,
        tstart: f64,
        ccds: Option<String>,
    },
    /// Science running, waiting for stop science
    InScience {
        datestart: String,
        tstart: f64,
        ccds: Option<String>,
        start_science: f64,
        instrument: Instrument,
        ccd_count: u8,
    },
}

impl SegmenterState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SegmenterState::Idle)
    }
}
