//! Configuration types for tax computation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Each regime is a plain
//! configuration value; the calculation stages read whatever the regime
//! declares instead of branching on the regime tag.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AgeBand, Regime, TaxpayerProfile, TieBreak};

/// Metadata about the engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMetadata {
    /// Human-readable name of the rule set.
    pub name: String,
    /// Jurisdiction code (e.g., "IN").
    pub jurisdiction: String,
    /// The version of the configuration.
    pub version: String,
    /// URL to the official rate documentation.
    pub source_url: String,
}

/// A progressive tax slab.
///
/// Income above `from` and up to `to` is taxed at `rate`; the top slab has
/// no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slab {
    /// Lower bound (exclusive for every slab but the first).
    pub from: Decimal,
    /// Upper bound (inclusive); `None` for the top slab.
    #[serde(default)]
    pub to: Option<Decimal>,
    /// Marginal rate as a fraction.
    pub rate: Decimal,
}

/// Slab tables keyed by age band.
#[derive(Debug, Clone, Deserialize)]
pub struct AgeBandSlabs {
    /// Table for taxpayers younger than 60.
    pub below_60: Vec<Slab>,
    /// Table for taxpayers aged 60 to 79.
    pub age_60_to_79: Vec<Slab>,
    /// Table for taxpayers aged 80 and over.
    pub age_80_plus: Vec<Slab>,
    /// Whether the senior tables apply to residents only.
    #[serde(default = "default_true")]
    pub residents_only: bool,
}

/// Either one slab table for everyone or one per age band.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SlabSchedule {
    /// One table regardless of age.
    Flat(Vec<Slab>),
    /// Tables selected by the taxpayer's age band.
    ByAge(AgeBandSlabs),
}

impl SlabSchedule {
    /// Selects the table for a taxpayer, with the age band used if any.
    pub fn table_for(&self, profile: &TaxpayerProfile) -> (&[Slab], Option<AgeBand>) {
        match self {
            SlabSchedule::Flat(slabs) => (slabs, None),
            SlabSchedule::ByAge(bands) => {
                let band = profile.age_band(bands.residents_only);
                let table = match band {
                    AgeBand::Below60 => &bands.below_60,
                    AgeBand::Age60To79 => &bands.age_60_to_79,
                    AgeBand::Age80Plus => &bands.age_80_plus,
                };
                (table, Some(band))
            }
        }
    }

    fn tables(&self) -> Vec<(&'static str, &[Slab])> {
        match self {
            SlabSchedule::Flat(slabs) => vec![("slabs", slabs.as_slice())],
            SlabSchedule::ByAge(bands) => vec![
                ("slabs.below_60", bands.below_60.as_slice()),
                ("slabs.age_60_to_79", bands.age_60_to_79.as_slice()),
                ("slabs.age_80_plus", bands.age_80_plus.as_slice()),
            ],
        }
    }
}

/// Rebate against slab tax for low incomes.
#[derive(Debug, Clone, Deserialize)]
pub struct RebateConfig {
    /// Statutory reference for the rebate.
    pub clause_ref: String,
    /// Taxable income at or below which the full rebate applies.
    pub income_threshold: Decimal,
    /// Maximum rebate.
    pub max_amount: Decimal,
    /// If set, the rebate phases out linearly up to this income.
    #[serde(default)]
    pub phase_out_upper: Option<Decimal>,
    /// Whether only residents are entitled.
    #[serde(default = "default_true")]
    pub residents_only: bool,
}

/// Which income figure selects the surcharge tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeBasis {
    /// Tier by gross income.
    #[default]
    GrossIncome,
    /// Tier by taxable income.
    TaxableIncome,
}

/// A surcharge band: income above `from` and up to `to` pays `rate` on tax.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SurchargeTier {
    /// Threshold the income must exceed.
    pub from: Decimal,
    /// Upper bound (inclusive); `None` for the top tier.
    #[serde(default)]
    pub to: Option<Decimal>,
    /// Surcharge rate applied to tax.
    pub rate: Decimal,
}

/// Surcharge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SurchargeConfig {
    /// Statutory reference for the surcharge.
    pub clause_ref: String,
    /// Income figure used to select the tier.
    #[serde(default)]
    pub basis: SurchargeBasis,
    /// Whether marginal relief is applied at tier thresholds.
    #[serde(default = "default_true")]
    pub marginal_relief: bool,
    /// Tiers in ascending order.
    #[serde(default)]
    pub tiers: Vec<SurchargeTier>,
}

/// Ceiling for one deduction section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionCap {
    /// What the section covers.
    #[serde(default)]
    pub description: String,
    /// Maximum deduction; `None` means no limit.
    #[serde(default)]
    pub cap: Option<Decimal>,
}

/// A ceiling shared by several sections (e.g. 80C, 80CCC and 80CCD(1)).
#[derive(Debug, Clone, Deserialize)]
pub struct CombinedCap {
    /// Name reported in warnings.
    pub name: String,
    /// Member sections, in allocation order.
    pub sections: Vec<String>,
    /// The shared ceiling.
    pub cap: Decimal,
}

/// How an exemption category is computed.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ExemptionRule {
    /// House-rent allowance: least of allowance received, rent paid less a
    /// share of salary, and a metro/non-metro share of salary.
    HouseRent {
        /// Statutory section.
        section: String,
        /// Component code of the allowance.
        component: String,
        /// Components forming "salary" for this rule (e.g. basic and DA).
        basic_components: Vec<String>,
        /// Share of salary allowed in a metro city.
        metro_rate: Decimal,
        /// Share of salary allowed elsewhere.
        non_metro_rate: Decimal,
        /// Share of salary subtracted from rent paid.
        rent_offset_rate: Decimal,
    },
    /// Claimed amount limited by the allowance received and a fixed cap.
    Capped {
        /// Statutory section.
        section: String,
        /// Component code of the allowance, if the exemption is tied to one.
        #[serde(default)]
        component: Option<String>,
        /// Fixed annual ceiling, if any.
        #[serde(default)]
        cap: Option<Decimal>,
    },
}

impl ExemptionRule {
    /// The statutory section of the rule.
    pub fn section(&self) -> &str {
        match self {
            ExemptionRule::HouseRent { section, .. } | ExemptionRule::Capped { section, .. } => {
                section
            }
        }
    }
}

/// Rounding applied to a monetary figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingRule {
    /// Two decimal places.
    #[default]
    Paise,
    /// Whole units.
    Rupee,
    /// Nearest multiple of ten.
    NearestTen,
}

/// Rounding conventions of a regime.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RoundingConfig {
    /// Applied to taxable income before the slabs.
    #[serde(default)]
    pub taxable_income: RoundingRule,
    /// Applied to cess.
    #[serde(default)]
    pub cess: RoundingRule,
    /// Applied to the final total tax.
    #[serde(default)]
    pub total_tax: RoundingRule,
}

/// Everything that defines one regime for one tax year.
#[derive(Debug, Clone, Deserialize)]
pub struct RegimeConfig {
    /// The regime this configuration describes.
    pub regime: Regime,
    /// Statutory reference for the slab rates.
    pub clause_ref: String,
    /// Slab table(s).
    pub slabs: SlabSchedule,
    /// Standard deduction against salary income.
    pub standard_deduction: Decimal,
    /// Rebate rules.
    pub rebate: RebateConfig,
    /// Surcharge rules.
    pub surcharge: SurchargeConfig,
    /// Health and education cess rate.
    pub cess_rate: Decimal,
    /// Whether exemptions are honoured at all.
    pub honors_exemptions: bool,
    /// Whether declared deductions are honoured at all.
    pub honors_deductions: bool,
    /// Honoured deduction sections and their caps.
    #[serde(default)]
    pub deductions: BTreeMap<String, SectionCap>,
    /// Ceilings shared by several sections.
    #[serde(default)]
    pub combined_caps: Vec<CombinedCap>,
    /// Honoured exemption categories and their rules.
    #[serde(default)]
    pub exemptions: BTreeMap<String, ExemptionRule>,
    /// Rounding conventions.
    #[serde(default)]
    pub rounding: RoundingConfig,
}

/// Both regimes for a tax year.
#[derive(Debug, Clone, Deserialize)]
pub struct RegimeSet {
    /// The old regime.
    pub old: RegimeConfig,
    /// The new regime.
    pub new: RegimeConfig,
}

/// Configuration for one tax year.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxYearConfig {
    /// Tax year identifier (e.g., "2024-25").
    pub tax_year: String,
    /// First day of the tax year.
    pub starts_on: NaiveDate,
    /// Last day of the tax year.
    pub ends_on: NaiveDate,
    /// Recommendation when both regimes cost the same.
    #[serde(default)]
    pub tie_break: TieBreak,
    /// The regimes.
    pub regimes: RegimeSet,
}

impl TaxYearConfig {
    /// Returns the configuration of a regime.
    pub fn regime(&self, regime: Regime) -> &RegimeConfig {
        match regime {
            Regime::Old => &self.regimes.old,
            Regime::New => &self.regimes.new,
        }
    }

    /// Returns true if `date` falls inside the tax year.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.starts_on && date <= self.ends_on
    }

    /// Deduction sections known to any regime of the year.
    pub fn known_deduction_sections(&self) -> BTreeSet<&str> {
        Regime::ALL
            .iter()
            .flat_map(|r| self.regime(*r).deductions.keys().map(String::as_str))
            .collect()
    }

    /// Exemption categories known to any regime of the year.
    pub fn known_exemption_categories(&self) -> BTreeSet<&str> {
        Regime::ALL
            .iter()
            .flat_map(|r| self.regime(*r).exemptions.keys().map(String::as_str))
            .collect()
    }

    /// Checks that every table is usable.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidConfig {
            tax_year: self.tax_year.clone(),
            message,
        };

        if self.starts_on > self.ends_on {
            return Err(invalid("starts_on is after ends_on".to_string()));
        }
        for regime in Regime::ALL {
            let config = self.regime(regime);
            if config.regime != regime {
                return Err(invalid(format!(
                    "regimes.{} is tagged as '{}'",
                    regime, config.regime
                )));
            }
            config.validate().map_err(|message| {
                invalid(format!("regimes.{}: {}", regime, message))
            })?;
        }
        Ok(())
    }
}

impl RegimeConfig {
    fn validate(&self) -> Result<(), String> {
        for (name, table) in self.slabs.tables() {
            validate_bands(
                name,
                table.iter().map(|s| (s.from, s.to, s.rate)),
                Some(Decimal::ZERO),
            )?;
        }
        validate_bands(
            "surcharge.tiers",
            self.surcharge.tiers.iter().map(|t| (t.from, t.to, t.rate)),
            None,
        )?;
        if !is_fraction(self.cess_rate) {
            return Err(format!("cess_rate {} is not between 0 and 1", self.cess_rate));
        }
        if self.standard_deduction < Decimal::ZERO {
            return Err("standard_deduction must not be negative".to_string());
        }
        if self.rebate.income_threshold < Decimal::ZERO || self.rebate.max_amount < Decimal::ZERO
        {
            return Err("rebate amounts must not be negative".to_string());
        }
        if let Some(upper) = self.rebate.phase_out_upper {
            if upper <= self.rebate.income_threshold {
                return Err("rebate.phase_out_upper must exceed income_threshold".to_string());
            }
        }
        for (section, cap) in &self.deductions {
            if cap.cap.is_some_and(|c| c < Decimal::ZERO) {
                return Err(format!("deductions.{} has a negative cap", section));
            }
        }
        for group in &self.combined_caps {
            if let Some(missing) = group
                .sections
                .iter()
                .find(|s| !self.deductions.contains_key(*s))
            {
                return Err(format!(
                    "combined cap '{}' names section '{}' that the regime does not honour",
                    group.name, missing
                ));
            }
        }
        for (category, rule) in &self.exemptions {
            if let ExemptionRule::HouseRent {
                metro_rate,
                non_metro_rate,
                rent_offset_rate,
                ..
            } = rule
            {
                if ![*metro_rate, *non_metro_rate, *rent_offset_rate]
                    .iter()
                    .all(|r| is_fraction(*r))
                {
                    return Err(format!("exemptions.{} has a rate outside 0..1", category));
                }
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn is_fraction(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE
}

/// Checks that bands are ascending, contiguous and only the last is open.
fn validate_bands(
    name: &str,
    bands: impl Iterator<Item = (Decimal, Option<Decimal>, Decimal)>,
    first_from: Option<Decimal>,
) -> Result<(), String> {
    let bands: Vec<_> = bands.collect();
    if bands.is_empty() {
        return if first_from.is_some() {
            Err(format!("{} is empty", name))
        } else {
            Ok(())
        };
    }
    if let Some(expected) = first_from {
        if bands[0].0 != expected {
            return Err(format!("{} must start at {}", name, expected));
        }
    }
    for (index, (from, to, rate)) in bands.iter().enumerate() {
        if !is_fraction(*rate) {
            return Err(format!("{}[{}] rate {} is not between 0 and 1", name, index, rate));
        }
        let is_last = index + 1 == bands.len();
        match to {
            Some(to) if to <= from => {
                return Err(format!("{}[{}] upper bound is not above lower bound", name, index));
            }
            Some(to) if !is_last && bands[index + 1].0 != *to => {
                return Err(format!("{}[{}] is not contiguous with the next band", name, index));
            }
            None if !is_last => {
                return Err(format!("{}[{}] is open-ended but not the last band", name, index));
            }
            _ => {}
        }
    }
    Ok(())
}
