//! Science instrument identification from the translation stage position.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instrument in the focal plane, as resolved from the SIM translation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    #[serde(rename = "ACIS-I")]
    AcisI,
    #[serde(rename = "ACIS-S")]
    AcisS,
    #[serde(rename = "HRC-I")]
    HrcI,
    #[serde(rename = "HRC-S")]
    HrcS,
    /// Stage position outside every detector range. Never expected in
    /// operations; treat it as a data-quality flag.
    #[serde(rename = "launchlock")]
    LaunchLock,
}

impl Instrument {
    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::AcisI => "ACIS-I",
            Instrument::AcisS => "ACIS-S",
            Instrument::HrcI => "HRC-I",
            Instrument::HrcS => "HRC-S",
            Instrument::LaunchLock => "launchlock",
        }
    }

    pub fn is_acis(&self) -> bool {
        matches!(self, Instrument::AcisI | Instrument::AcisS)
    }

    pub fn is_hrc(&self) -> bool {
        matches!(self, Instrument::HrcI | Instrument::HrcS)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determine which instrument is in the focal plane for a SIM position.
///
/// The detector ranges run from the hard stops and split the difference
/// between the I and S arrays of each instrument. Bounds are inclusive.
pub fn locate(simpos: i32) -> Instrument {
    match simpos {
        82109..=104839 => Instrument::AcisI,
        70736..=82108 => Instrument::AcisS,
        -86147..=-20000 => Instrument::HrcI,
        -104362..=-86148 => Instrument::HrcS,
        _ => Instrument::LaunchLock,
    }
}
