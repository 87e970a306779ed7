//! Calculation logic for the Tax Computation Engine.
//!
//! This module contains the stages of a tax computation: formula
//! evaluation and salary component resolution, income annualisation,
//! exemptions, deductions, slab tax, rebate, surcharge with marginal relief,
//! cess and the withholding projection. [`compute_tax`] runs them in order
//! for one regime and [`compare_regimes`] runs both.

mod comparator;
mod deduction;
mod exemption;
mod formula;
mod income;
mod pipeline;
mod projection;
mod rebate;
mod resolver;
mod rounding;
mod slab;
mod surcharge;
mod validation;

pub use comparator::compare_regimes;
pub use deduction::{DeductionResult, STANDARD_DEDUCTION_SECTION, aggregate_deductions};
pub use exemption::{ExemptionResult, calculate_exemptions};
pub use formula::{BinaryOp, Expr, Formula, MAX_NESTING_DEPTH, evaluate_formula};
pub use income::{AnnualIncome, annualise_income};
pub use pipeline::compute_tax;
pub use projection::{ProjectionResult, project_withholding, reproject};
pub use rebate::{RebateResult, calculate_rebate};
pub use resolver::{ResolvedComponents, ensure_acyclic, resolve_components, resolve_salary};
pub use rounding::{floor_to_paise, non_negative, round_half_up};
pub use slab::{SlabTaxResult, calculate_slab_tax, slab_tax};
pub use surcharge::{CessResult, SurchargeResult, calculate_cess, calculate_surcharge};
pub use validation::{MAX_AGE, MAX_PAY_PERIODS, validate_input};
