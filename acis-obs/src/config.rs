//! Limits and catalog settings for a thermal check run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, ThermalCheckError};

/// Focal-plane limits in degrees C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryLimits {
    pub planning_hi: f64,
    pub planning_lo: Option<f64>,
    pub acis_i: f64,
    pub acis_s: f64,
    pub acis_hot: f64,
    pub cold_ecs: f64,
}

impl Default for CategoryLimits {
    fn default() -> Self {
        Self {
            planning_hi: -84.0,
            planning_lo: None,
            acis_i: -112.0,
            acis_s: -111.0,
            acis_hot: -109.0,
            cold_ecs: -119.5,
        }
    }
}

/// Allowed magnitude of a residual quantile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationLimit {
    /// Percentile in `[0, 100]`
    pub quantile: f64,
    pub limit: f64,
}

/// Obscat connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Attempts per request, at least one
    pub tries: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cda.harvard.edu/srservices/ocatDetails.do".to_string(),
            tries: 4,
            retry_delay_ms: 1000,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalCheckConfig {
    pub limits: CategoryLimits,
    /// Residual limits keyed by MSID
    pub validation_limits: BTreeMap<String, Vec<ValidationLimit>>,
    pub catalog: CatalogConfig,
}

impl Default for ThermalCheckConfig {
    fn default() -> Self {
        let fptemp = vec![
            ValidationLimit {
                quantile: 1.0,
                limit: 3.0,
            },
            ValidationLimit {
                quantile: 99.0,
                limit: 3.0,
            },
        ];
        Self {
            limits: CategoryLimits::default(),
            validation_limits: BTreeMap::from([("FPTEMP".to_string(), fptemp)]),
            catalog: CatalogConfig::default(),
        }
    }
}

impl ThermalCheckConfig {
    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.catalog.tries == 0 {
            return Err(ThermalCheckError::InvalidConfig(
                "catalog.tries must be at least 1".to_string(),
            ));
        }
        if let Some(lo) = self.limits.planning_lo {
            if lo >= self.limits.planning_hi {
                return Err(ThermalCheckError::InvalidConfig(format!(
                    "planning_lo ({lo}) must be below planning_hi ({})",
                    self.limits.planning_hi
                )));
            }
        }
        for (msid, limits) in &self.validation_limits {
            if let Some(bad) = limits.iter().find(|l| !(0.0..=100.0).contains(&l.quantile)) {
                return Err(ThermalCheckError::InvalidConfig(format!(
                    "{msid}: quantile {} outside [0, 100]",
                    bad.quantile
                )));
            }
        }
        Ok(())
    }

    /// Save as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ThermalCheckError::InvalidConfig(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from a JSON file; missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| ThermalCheckError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }
}
