//! The per-regime tax computation pipeline.
//!
//! Stages run in a fixed order, each recording one audit step:
//! resolve components, annualise, exemptions, deductions, taxable income,
//! slab tax, rebate, surcharge, cess, total tax and withholding projection.
//! The pipeline reads only its arguments, so any number of computations
//! may run in parallel.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::TaxYearConfig;
use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, Regime, TaxComputationInput, TaxComputationResult,
};

use super::deduction::aggregate_deductions;
use super::exemption::calculate_exemptions;
use super::income::annualise_income;
use super::projection::project_withholding;
use super::rebate::calculate_rebate;
use super::resolver::resolve_salary;
use super::rounding::{non_negative, round_half_up};
use super::slab::calculate_slab_tax;
use super::surcharge::{calculate_cess, calculate_surcharge};
use super::validation::validate_input;

/// Computes the annual tax of one employee under one regime.
///
/// # Arguments
///
/// * `input` - The complete computation snapshot
/// * `tax_year` - Configuration of the tax year the input names
/// * `regime` - The regime to compute under
///
/// # Errors
///
/// Input validation errors, and any resolver or formula error. Capped
/// claims are not errors; they are reported as warnings on the result.
///
/// # Example
///
/// ```no_run
/// use tax_engine::calculation::compute_tax;
/// use tax_engine::config::ConfigLoader;
/// use tax_engine::models::{Regime, TaxComputationInput};
///
/// # fn run(input: TaxComputationInput) -> Result<(), tax_engine::error::EngineError> {
/// let loader = ConfigLoader::load("./config")?;
/// let year = loader.get_tax_year(&input.tax_year)?;
/// let result = compute_tax(&input, year, Regime::New)?;
/// println!("Total tax: {}", result.total_tax);
/// # Ok(())
/// # }
/// ```
pub fn compute_tax(
    input: &TaxComputationInput,
    tax_year: &TaxYearConfig,
    regime: Regime,
) -> EngineResult<TaxComputationResult> {
    validate_input(input, tax_year)?;

    let config = tax_year.regime(regime);
    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    // Components
    let resolved = resolve_salary(
        &input.catalogue,
        &input.salary,
        &input.profile.employee_id,
        step_number,
    )?;
    steps.push(resolved.audit_step);
    step_number += 1;

    let income = annualise_income(
        &input.catalogue,
        &resolved.values,
        input.pay_periods_per_year,
        &input.other_income,
        step_number,
    );
    steps.push(income.audit_step);
    step_number += 1;

    // Exemptions and deductions
    let exemptions = calculate_exemptions(
        config,
        &input.catalogue,
        &income.annual_components,
        &input.exemption_claims,
        step_number,
    );
    steps.push(exemptions.audit_step);
    warnings.extend(exemptions.warnings.into_iter().map(AuditWarning::from));
    step_number += 1;

    let deductions = aggregate_deductions(
        config,
        &input.deduction_claims,
        &income.component_deductions,
        income.salary_income,
        step_number,
    );
    steps.push(deductions.audit_step);
    warnings.extend(deductions.warnings.into_iter().map(AuditWarning::from));
    step_number += 1;

    // Taxable income
    let unrounded = non_negative(income.gross_income - exemptions.total - deductions.total);
    let taxable_income = config.rounding.taxable_income.apply(unrounded);
    steps.push(AuditStep {
        step_number,
        rule_id: "taxable_income".to_string(),
        rule_name: "Taxable Income".to_string(),
        clause_ref: "288A".to_string(),
        input: serde_json::json!({
            "gross_income": income.gross_income.to_string(),
            "total_exemptions": exemptions.total.to_string(),
            "total_deductions": deductions.total.to_string(),
            "rounding": format!("{:?}", config.rounding.taxable_income),
        }),
        output: serde_json::json!({ "taxable_income": taxable_income.to_string() }),
        reasoning: format!(
            "Gross {} less exemptions {} less deductions {} = {}, rounded to {}",
            income.gross_income, exemptions.total, deductions.total, unrounded, taxable_income
        ),
    });
    step_number += 1;

    // Tax
    let slab = calculate_slab_tax(taxable_income, config, &input.profile, step_number);
    steps.push(slab.audit_step);
    step_number += 1;
    let tax_before_rebate = slab.tax;

    let rebate = calculate_rebate(
        taxable_income,
        tax_before_rebate,
        &config.rebate,
        &input.profile,
        step_number,
    );
    steps.push(rebate.audit_step);
    step_number += 1;

    let (table, _) = config.slabs.table_for(&input.profile);
    let surcharge = calculate_surcharge(
        tax_before_rebate,
        taxable_income,
        income.gross_income,
        table,
        &config.surcharge,
        step_number,
    );
    steps.push(surcharge.audit_step);
    step_number += 1;

    let tax_after_rebate = non_negative(tax_before_rebate - rebate.rebate);
    let cess = calculate_cess(
        tax_after_rebate,
        surcharge.surcharge,
        config.cess_rate,
        config.rounding.cess,
        step_number,
    );
    steps.push(cess.audit_step);
    step_number += 1;

    let unrounded_total = tax_after_rebate + surcharge.surcharge + cess.cess;
    let total_tax = non_negative(config.rounding.total_tax.apply(unrounded_total));
    let effective_rate = if income.gross_income > Decimal::ZERO {
        round_half_up(total_tax / income.gross_income * Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    };
    steps.push(AuditStep {
        step_number,
        rule_id: "total_tax".to_string(),
        rule_name: "Total Tax".to_string(),
        clause_ref: "288B".to_string(),
        input: serde_json::json!({
            "tax_after_rebate": tax_after_rebate.to_string(),
            "surcharge": surcharge.surcharge.to_string(),
            "cess": cess.cess.to_string(),
        }),
        output: serde_json::json!({
            "total_tax": total_tax.to_string(),
            "effective_rate": effective_rate.to_string(),
        }),
        reasoning: format!(
            "Tax {} + surcharge {} + cess {} = {}, rounded to {}",
            tax_after_rebate, surcharge.surcharge, cess.cess, unrounded_total, total_tax
        ),
    });
    step_number += 1;

    // Withholding
    let projection = project_withholding(total_tax, &input.withholding, step_number)?;
    steps.push(projection.audit_step);

    debug!(
        employee_id = %input.profile.employee_id,
        tax_year = %tax_year.tax_year,
        regime = %regime,
        taxable_income = %taxable_income,
        total_tax = %total_tax,
        "Computed tax"
    );

    Ok(TaxComputationResult {
        employee_id: input.profile.employee_id.clone(),
        tax_year: tax_year.tax_year.clone(),
        regime,
        gross_income: income.gross_income,
        total_exemptions: exemptions.total,
        total_deductions: deductions.total,
        taxable_income,
        tax_before_rebate,
        rebate: rebate.rebate,
        surcharge: surcharge.surcharge,
        marginal_relief: surcharge.marginal_relief,
        cess: cess.cess,
        total_tax,
        effective_rate,
        monthly_tds: projection.projection.per_period,
        exemptions: exemptions.claims,
        deductions: deductions.claims,
        slab_breakdown: slab.lines,
        projection: projection.projection,
        audit_trace: AuditTrace { steps, warnings },
    })
}
