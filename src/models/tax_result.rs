//! Tax computation result models.
//!
//! This module contains the [`TaxComputationResult`] type and its associated
//! structures that capture all outputs from a tax computation, including the
//! exemption and deduction breakdowns, slab-by-slab tax, the withholding
//! projection and an audit trace.
//!
//! Results are values: they carry no identifiers or timestamps, so computing
//! twice with identical inputs serializes to identical bytes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DeductionClaim, ExemptionClaim, Regime, TieBreak};

/// A single step in the audit trace recording a computation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the statutory section for this rule.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during computation.
///
/// Warnings indicate conditions that don't prevent computation
/// but are kept for audit (e.g. a claim truncated to its cap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a computation.
///
/// # Example
///
/// ```
/// use tax_engine::models::AuditTrace;
///
/// let trace = AuditTrace::default();
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of computation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during computation.
    pub warnings: Vec<AuditWarning>,
}

/// Tax attributable to one slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabLine {
    /// Lower bound of the slab.
    pub from: Decimal,
    /// Upper bound of the slab; `None` for the open top slab.
    pub to: Option<Decimal>,
    /// Marginal rate as a fraction.
    pub rate: Decimal,
    /// Portion of income falling inside the slab.
    pub taxable_amount: Decimal,
    /// `taxable_amount * rate`.
    pub tax: Decimal,
}

/// Spread of the remaining annual liability over the remaining pay periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    /// Total tax for the year.
    pub annual_tax: Decimal,
    /// Tax already withheld in earlier periods.
    pub already_withheld: Decimal,
    /// Amount still to withhold (never negative).
    pub balance: Decimal,
    /// Pay periods left, including the current one.
    pub remaining_periods: u32,
    /// Deduction for the current period.
    pub per_period: Decimal,
    /// Deduction for each remaining period; sums to `balance`.
    pub schedule: Vec<Decimal>,
    /// Amount withheld beyond the annual tax, carried as a reduction.
    pub excess_withheld: Decimal,
}

/// The complete result of a tax computation under one regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputationResult {
    /// The employee the computation is for.
    pub employee_id: String,
    /// The tax year computed.
    pub tax_year: String,
    /// The regime computed under.
    pub regime: Regime,
    /// Taxable salary plus other income.
    pub gross_income: Decimal,
    /// Sum of eligible exemptions.
    pub total_exemptions: Decimal,
    /// Sum of eligible deductions, including the standard deduction.
    pub total_deductions: Decimal,
    /// Income the slabs are applied to.
    pub taxable_income: Decimal,
    /// Slab tax before rebate, surcharge and cess.
    pub tax_before_rebate: Decimal,
    /// Rebate applied against slab tax.
    pub rebate: Decimal,
    /// Surcharge after marginal relief.
    pub surcharge: Decimal,
    /// Marginal relief deducted from the surcharge.
    pub marginal_relief: Decimal,
    /// Cess on tax after rebate plus surcharge.
    pub cess: Decimal,
    /// Final liability for the year.
    pub total_tax: Decimal,
    /// `total_tax / gross_income` as a percentage.
    pub effective_rate: Decimal,
    /// Tax to deduct in the current pay period.
    pub monthly_tds: Decimal,
    /// Exemptions allowed, one per honoured category claimed.
    pub exemptions: Vec<ExemptionClaim>,
    /// Deductions allowed, one per honoured section claimed.
    pub deductions: Vec<DeductionClaim>,
    /// Slab-by-slab tax.
    pub slab_breakdown: Vec<SlabLine>,
    /// Withholding schedule for the rest of the year.
    pub projection: MonthlyProjection,
    /// Complete audit trace of computation decisions.
    pub audit_trace: AuditTrace,
}

/// Side-by-side results for both regimes and the recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeComparison {
    /// Result under the old regime.
    pub old_regime: TaxComputationResult,
    /// Result under the new regime.
    pub new_regime: TaxComputationResult,
    /// The regime with the lower total tax.
    pub recommended: Regime,
    /// Difference in total tax between the two regimes.
    pub savings: Decimal,
    /// The tie-break rule that was in force.
    pub tie_break: TieBreak,
}

impl RegimeComparison {
    /// Returns the result for a regime.
    pub fn result_for(&self, regime: Regime) -> &TaxComputationResult {
        match regime {
            Regime::Old => &self.old_regime,
            Regime::New => &self.new_regime,
        }
    }

    /// Returns the result for the recommended regime.
    pub fn recommended_result(&self) -> &TaxComputationResult {
        self.result_for(self.recommended)
    }
}
