//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading regime
//! configurations from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::Regime;

use super::types::{EngineMetadata, RegimeConfig, TaxYearConfig};

/// The complete engine configuration loaded from YAML files.
///
/// This struct aggregates all configuration loaded from the various
/// YAML files in a configuration directory.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine metadata.
    metadata: EngineMetadata,
    /// Tax year configurations keyed by tax year identifier.
    tax_years: BTreeMap<String, TaxYearConfig>,
}

impl EngineConfig {
    /// Creates a new EngineConfig, validating every tax year.
    pub fn new(metadata: EngineMetadata, tax_years: Vec<TaxYearConfig>) -> EngineResult<Self> {
        let mut by_id = BTreeMap::new();
        for tax_year in tax_years {
            tax_year.validate()?;
            let id = tax_year.tax_year.clone();
            if by_id.insert(id.clone(), tax_year).is_some() {
                return Err(EngineError::InvalidConfig {
                    tax_year: id,
                    message: "tax year is configured more than once".to_string(),
                });
            }
        }
        Ok(Self {
            metadata,
            tax_years: by_id,
        })
    }

    /// Returns the engine metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    /// Returns all tax years, ordered by identifier.
    pub fn tax_years(&self) -> impl Iterator<Item = &TaxYearConfig> {
        self.tax_years.values()
    }
}

/// Loads and provides access to regime configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query tax years and regimes.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/
/// ├── engine.yaml          # Engine metadata
/// └── tax_years/
///     ├── 2023-24.yaml     # Both regimes for FY 2023-24
///     └── 2024-25.yaml     # Both regimes for FY 2024-25
/// ```
///
/// # Example
///
/// ```no_run
/// use tax_engine::config::ConfigLoader;
/// use tax_engine::models::Regime;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let regime = loader.get_regime("2024-25", Regime::New).unwrap();
/// println!("Standard deduction: {}", regime.standard_deduction);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any slab, tier or cap table is unusable
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<EngineMetadata>(&path.join("engine.yaml"))?;
        let tax_years = Self::load_tax_years(&path.join("tax_years"))?;

        debug!(
            path = %path.display(),
            tax_years = tax_years.len(),
            "Loaded tax configuration"
        );

        let config = EngineConfig::new(metadata, tax_years)?;
        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all tax year files from the tax_years directory.
    fn load_tax_years(dir: &Path) -> EngineResult<Vec<TaxYearConfig>> {
        let dir_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no tax year files found)", dir_str),
            });
        }

        paths.iter().map(|p| Self::load_yaml(p)).collect()
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        self.config.metadata()
    }

    /// Gets a tax year by its identifier.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tax_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config")?;
    /// let year = loader.get_tax_year("2024-25")?;
    /// println!("Starts on {}", year.starts_on);
    /// # Ok::<(), tax_engine::error::EngineError>(())
    /// ```
    pub fn get_tax_year(&self, tax_year: &str) -> EngineResult<&TaxYearConfig> {
        self.config
            .tax_years
            .get(tax_year)
            .ok_or_else(|| EngineError::TaxYearNotFound {
                tax_year: tax_year.to_string(),
            })
    }

    /// Gets the configuration of one regime for a tax year.
    pub fn get_regime(&self, tax_year: &str, regime: Regime) -> EngineResult<&RegimeConfig> {
        Ok(self.get_tax_year(tax_year)?.regime(regime))
    }

    /// Finds the tax year containing a date.
    pub fn tax_year_for_date(&self, date: NaiveDate) -> EngineResult<&TaxYearConfig> {
        self.config
            .tax_years()
            .find(|ty| ty.contains_date(date))
            .ok_or_else(|| EngineError::TaxYearNotFound {
                tax_year: format!("(no tax year contains {})", date),
            })
    }
}
