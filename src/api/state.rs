//! Application state for the Tax Computation Engine API.

use std::sync::Arc;

use crate::config::{ConfigLoader, TaxYearConfig};
use crate::error::EngineResult;

/// Shared application state.
///
/// Holds the regime configuration loaded at startup. Configuration is
/// read-only once loaded, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Looks up the configuration for a tax year.
    pub fn tax_year(&self, tax_year: &str) -> EngineResult<&TaxYearConfig> {
        self.config.get_tax_year(tax_year)
    }

    /// Version string of the loaded rule configuration.
    pub fn config_version(&self) -> &str {
        &self.config.metadata().version
    }
}
