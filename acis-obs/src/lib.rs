//! ACIS observation segmentation and focal-plane limit checking.
//!
//! The pipeline for one load:
//!
//! 1. [`segmenter`] turns the commanded-state stream into observation
//!    intervals, resolving the instrument with [`focal_plane::locate`] and
//!    the chip list with [`power::decode_power`].
//! 2. [`catalog::enrich`] adds count rate, grating, and exposure from the
//!    observation catalog when it is reachable.
//! 3. [`classifier`] sorts observations into the thermal categories.
//! 4. [`detector`] finds limit violations in a temperature series and
//!    [`attributor`] ties them to observations.
//!
//! [`check::check_load`] runs steps 3 and 4 with a set of [`CategoryLimits`];
//! [`check::review_load`] runs the whole pipeline.

pub mod attributor;
pub mod catalog;
pub mod check;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod focal_plane;
pub mod power;
pub mod segmenter;
pub mod series;
pub mod state;
pub mod time_utils;
pub mod validation;

/// Observation identifier
pub type ObsId = u32;

pub use attributor::attribute;
pub use catalog::{
    enrich, CatalogEntry, CatalogLookup, CatalogResponse, CatalogUnavailable, NoCatalog,
    StaticCatalog,
};
pub use check::{check_load, find_obsid_intervals, review_load, LimitReport, LoadReport};
pub use classifier::{classify, hrc_science_filter, Classified};
pub use config::{CatalogConfig, CategoryLimits, ThermalCheckConfig, ValidationLimit};
pub use detector::{detect, Limit, LimitType, ViolationInterval};
pub use error::{Result, ThermalCheckError};
pub use focal_plane::{locate, Instrument};
pub use segmenter::{segment, ObservationInterval, ObservationSegmenter};
pub use series::TemperatureSeries;
pub use state::{CommandedState, SegmenterState};
pub use validation::{quantile, validation_violations, ValidationSeries, ValidationViolation};
