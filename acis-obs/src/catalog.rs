//! Observation catalog lookup and enrichment of observation intervals.
//!
//! The catalog is an external service. When it cannot be reached the review
//! continues without count-rate information; hot-candidate detection then
//! has to be checked by hand.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::segmenter::ObservationInterval;
use crate::ObsId;

/// Obsids above this are engineering runs with no catalog entry.
pub const CATALOG_OBSID_MAX: ObsId = 60000;

/// Catalog fields for one observation, in catalog units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Grating in use (`NONE`, `HETG`, `LETG`)
    pub grating: String,
    /// Estimated count rate (counts/s)
    pub cnt_rate: f64,
    /// Approved exposure summed over the observation's sequence (ks)
    pub app_exp: f64,
}

/// Why catalog data is not available for this run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogUnavailable {
    #[error("no obsids to check, may be a vehicle load")]
    NoObsids,

    #[error("catalog lookup disabled")]
    Disabled,

    #[error("catalog request failed: {0}")]
    RequestFailed(String),
}

impl CatalogUnavailable {
    /// Operator-facing warning for the degraded review.
    pub fn warning(&self) -> String {
        match self {
            CatalogUnavailable::NoObsids => {
                "No obsids to check, may be a vehicle load--please check if not.".to_string()
            }
            _ => format!(
                "Could not get the table from the Obscat ({self}) to determine which \
                 observations can run hot. Any violations of eligible observations \
                 should be hand-checked."
            ),
        }
    }
}

/// Outcome of a catalog lookup.
///
/// `Available` with an empty map means the catalog answered but knows none
/// of the requested obsids, which is different from not answering at all.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogResponse {
    Available(HashMap<ObsId, CatalogEntry>),
    Unavailable(CatalogUnavailable),
}

/// Source of catalog data keyed by obsid.
pub trait CatalogLookup {
    /// Look up catalog fields for `obsids`. Failures are reported as
    /// [`CatalogResponse::Unavailable`], never as errors.
    fn lookup(&self, obsids: &[ObsId]) -> CatalogResponse;
}

impl<F> CatalogLookup for F
where
    F: Fn(&[ObsId]) -> CatalogResponse,
{
    fn lookup(&self, obsids: &[ObsId]) -> CatalogResponse {
        self(obsids)
    }
}

/// Lookup used when the catalog is deliberately not consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCatalog;

impl CatalogLookup for NoCatalog {
    fn lookup(&self, _obsids: &[ObsId]) -> CatalogResponse {
        CatalogResponse::Unavailable(CatalogUnavailable::Disabled)
    }
}

/// In-memory catalog, e.g. from a previously saved lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticCatalog {
    pub entries: HashMap<ObsId, CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: HashMap<ObsId, CatalogEntry>) -> Self {
        Self { entries }
    }
}

impl CatalogLookup for StaticCatalog {
    fn lookup(&self, obsids: &[ObsId]) -> CatalogResponse {
        let found = obsids
            .iter()
            .filter_map(|obsid| self.entries.get(obsid).map(|e| (*obsid, e.clone())))
            .collect();
        CatalogResponse::Available(found)
    }
}

/// Merge catalog fields into `intervals`.
///
/// Returns the reason the catalog was unavailable, in which case `intervals`
/// are left untouched. `app_exp` is scaled by 1000 from catalog units.
pub fn enrich(
    intervals: &mut [ObservationInterval],
    lookup: &dyn CatalogLookup,
) -> Option<CatalogUnavailable> {
    let obsids: Vec<ObsId> = intervals.iter().map(|obs| obs.obsid).collect();

    let response = if obsids.is_empty() {
        CatalogResponse::Unavailable(CatalogUnavailable::NoObsids)
    } else {
        lookup.lookup(&obsids)
    };

    let entries = match response {
        CatalogResponse::Available(entries) => entries,
        CatalogResponse::Unavailable(reason) => {
            log::warn!("{}", reason.warning());
            return Some(reason);
        }
    };

    for obs in intervals.iter_mut() {
        if obs.obsid > CATALOG_OBSID_MAX {
            continue;
        }
        match entries.get(&obs.obsid) {
            Some(entry) => {
                obs.grating = Some(entry.grating.clone());
                obs.cnt_rate = Some(entry.cnt_rate);
                obs.app_exp = Some(entry.app_exp * 1000.0);
            }
            None => log::warn!("obsid {} not found in the catalog", obs.obsid),
        }
    }
    None
}
