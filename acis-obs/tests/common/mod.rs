#![allow(dead_code)]

use acis_obs::time_utils::secs_to_date;
use acis_obs::{CommandedState, ObsId};

/// SIM positions inside each detector range
pub const ACIS_S_SIMPOS: i32 = 75624;
pub const ACIS_I_SIMPOS: i32 = 92904;
pub const HRC_I_SIMPOS: i32 = -50504;
pub const HRC_S_SIMPOS: i32 = -99616;

/// Power command selecting only S3 on FEP 0
pub const S3_ONLY: &str = "WSPOW08001";
/// I0-I3, S2, S3 on all six FEPs
pub const SIX_CHIP: &str = "WSPOW0CF3F";

/// Builds a commanded-state stream with one record per `step` seconds.
pub struct StateStream {
    t: f64,
    step: f64,
    states: Vec<CommandedState>,
}

impl StateStream {
    pub fn new(t0: f64, step: f64) -> Self {
        Self {
            t: t0,
            step,
            states: Vec::new(),
        }
    }

    /// Time the next record will start at
    pub fn now(&self) -> f64 {
        self.t
    }

    pub fn push(&mut self, obsid: ObsId, power_cmd: &str, simpos: i32, ccd_count: u8) -> &mut Self {
        let tstart = self.t;
        let tstop = self.t + self.step;
        self.states.push(CommandedState {
            obsid,
            datestart: secs_to_date(tstart).unwrap(),
            datestop: secs_to_date(tstop).unwrap(),
            tstart,
            tstop,
            power_cmd: power_cmd.to_string(),
            simpos,
            ccd_count,
        });
        self.t = tstop;
        self
    }

    /// Power down, configure, start science, and stop science.
    ///
    /// Science starts two steps after the opening record and the interval
    /// closes at the end of the fourth record.
    pub fn observation(&mut self, obsid: ObsId, simpos: i32, config: &str, ccd_count: u8) -> &mut Self {
        self.push(obsid, "WSPOW00000", simpos, ccd_count)
            .push(obsid, config, simpos, ccd_count)
            .push(obsid, "XTZ0000005", simpos, ccd_count)
            .push(obsid, "AA00000000", simpos, ccd_count)
    }

    pub fn build(&self) -> Vec<CommandedState> {
        self.states.clone()
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
