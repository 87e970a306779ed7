//! Configuration loading and management for the Tax Computation Engine.
//!
//! This module provides functionality to load regime configurations from YAML
//! files, including slab tables, surcharge tiers, cess, rebate, deduction caps
//! and exemption rules for each tax year.
//!
//! # Example
//!
//! ```no_run
//! use tax_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Loaded rules: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, EngineConfig};
pub use types::{
    AgeBandSlabs, CombinedCap, EngineMetadata, ExemptionRule, RebateConfig, RegimeConfig,
    RegimeSet, RoundingConfig, RoundingRule, SectionCap, Slab, SlabSchedule, SurchargeBasis,
    SurchargeConfig, SurchargeTier, TaxYearConfig,
};
