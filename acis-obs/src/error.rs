use thiserror::Error;

use crate::ObsId;

/// Errors produced while segmenting, classifying, or checking a load.
#[derive(Error, Debug)]
pub enum ThermalCheckError {
    /// An ACIS-relevant observation matched none of the thermal categories.
    #[error("cannot determine what kind of thermal limit obsid {obsid} should have (instrument {instrument})")]
    Classification {
        /// Offending observation identifier.
        obsid: ObsId,
        /// Instrument resolved at science start.
        instrument: String,
    },

    /// The commanded-state stream violates its ordering or content preconditions.
    #[error("malformed state stream at record {index}: {reason}")]
    MalformedStateStream {
        /// Index of the offending record in the input stream.
        index: usize,
        /// Description of the violated precondition.
        reason: String,
    },

    /// A power command payload could not be decoded.
    #[error("cannot decode power command {0:?}")]
    PowerDecode(String),

    /// Parallel series arguments have different lengths.
    #[error("series length mismatch: {name} has {actual} samples, expected {expected}")]
    SeriesLengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Sample times are not strictly increasing.
    #[error("series times must be strictly increasing (sample {index}: {previous} -> {current})")]
    NonIncreasingTimes {
        index: usize,
        previous: f64,
        current: f64,
    },

    /// A calendar date string could not be parsed or represented.
    #[error("invalid time: {0}")]
    TimeParse(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ThermalCheckError>;
