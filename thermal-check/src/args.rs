//! Command-line overrides for [`ThermalCheckConfig`] values.

use clap::Args;
use std::path::PathBuf;

use acis_obs::{CatalogLookup, NoCatalog, ThermalCheckConfig};

use crate::input::read_catalog;

/// Limit overrides in degrees C.
///
/// Use with `#[command(flatten)]` in your CLI args struct.
#[derive(Args, Debug, Clone, Default)]
pub struct LimitArgs {
    /// Planning high limit
    #[arg(long)]
    pub planning_hi: Option<f64>,

    /// Planning low limit (checked only when set here or in the config)
    #[arg(long)]
    pub planning_lo: Option<f64>,

    /// ACIS-I observation limit
    #[arg(long)]
    pub acis_i: Option<f64>,

    /// ACIS-S observation limit
    #[arg(long)]
    pub acis_s: Option<f64>,

    /// Limit for observations allowed to run hot
    #[arg(long)]
    pub acis_hot: Option<f64>,

    /// Limit for HRC-S engineering runs
    #[arg(long)]
    pub cold_ecs: Option<f64>,
}

impl LimitArgs {
    pub fn apply(&self, config: &mut ThermalCheckConfig) {
        let limits = &mut config.limits;
        if let Some(v) = self.planning_hi {
            limits.planning_hi = v;
        }
        if self.planning_lo.is_some() {
            limits.planning_lo = self.planning_lo;
        }
        if let Some(v) = self.acis_i {
            limits.acis_i = v;
        }
        if let Some(v) = self.acis_s {
            limits.acis_s = v;
        }
        if let Some(v) = self.acis_hot {
            limits.acis_hot = v;
        }
        if let Some(v) = self.cold_ecs {
            limits.cold_ecs = v;
        }
    }
}

/// Where observation catalog data comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Skip the Obscat; no observation can be cleared to run hot
    #[arg(long, conflicts_with = "catalog_file")]
    pub no_catalog: bool,

    /// Read catalog entries from a JSON file instead of the Obscat
    #[arg(long)]
    pub catalog_file: Option<PathBuf>,

    /// Obscat query URL
    #[arg(long)]
    pub catalog_url: Option<String>,

    /// Attempts per Obscat request
    #[arg(long)]
    pub catalog_tries: Option<u32>,
}

impl CatalogArgs {
    pub fn apply(&self, config: &mut ThermalCheckConfig) {
        if let Some(url) = &self.catalog_url {
            config.catalog.base_url = url.clone();
        }
        if let Some(tries) = self.catalog_tries {
            config.catalog.tries = tries;
        }
    }

    /// Build the lookup selected by these arguments.
    pub fn lookup(&self, config: &ThermalCheckConfig) -> anyhow::Result<Box<dyn CatalogLookup>> {
        if self.no_catalog {
            log::info!("Obscat lookup disabled");
            return Ok(Box::new(NoCatalog));
        }
        if let Some(path) = &self.catalog_file {
            log::info!("Reading catalog entries from {path:?}");
            return Ok(Box::new(read_catalog(path)?));
        }
        log::info!("Querying the Obscat at {}", config.catalog.base_url);
        Ok(Box::new(ocat::OcatClient::new(&config.catalog)?))
    }
}
