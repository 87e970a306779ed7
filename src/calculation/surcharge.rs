//! Surcharge with marginal relief, and health and education cess.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{RoundingRule, Slab, SurchargeBasis, SurchargeConfig, SurchargeTier};
use crate::models::AuditStep;

use super::rounding::{non_negative, round_half_up};
use super::slab::slab_tax;

/// The result of surcharge calculation.
#[derive(Debug, Clone)]
pub struct SurchargeResult {
    /// Surcharge after marginal relief.
    pub surcharge: Decimal,
    /// Surcharge removed by marginal relief.
    pub marginal_relief: Decimal,
    /// Rate of the tier applied, zero below the first tier.
    pub rate: Decimal,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// The result of cess calculation.
#[derive(Debug, Clone)]
pub struct CessResult {
    /// Cess payable.
    pub cess: Decimal,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

fn tier_for(tiers: &[SurchargeTier], income: Decimal) -> Option<&SurchargeTier> {
    tiers
        .iter()
        .find(|t| income > t.from && t.to.is_none_or(|to| income <= to))
}

fn rate_for(tiers: &[SurchargeTier], income: Decimal) -> Decimal {
    tier_for(tiers, income).map_or(Decimal::ZERO, |t| t.rate)
}

/// Computes surcharge on tax before rebate.
///
/// The tier is selected by the configured basis income. With marginal
/// relief, tax plus surcharge may not exceed the tax and surcharge payable
/// at the tier threshold plus the income earned beyond the threshold.
///
/// # Arguments
///
/// * `tax_before_rebate` - Slab tax
/// * `taxable_income` - Income the slab tax was computed on
/// * `gross_income` - Gross income, for a gross basis
/// * `slabs` - The slab table used, to price tax at the threshold
/// * `config` - Surcharge configuration of the regime
/// * `step_number` - The audit step number
pub fn calculate_surcharge(
    tax_before_rebate: Decimal,
    taxable_income: Decimal,
    gross_income: Decimal,
    slabs: &[Slab],
    config: &SurchargeConfig,
    step_number: u32,
) -> SurchargeResult {
    let basis_income = match config.basis {
        SurchargeBasis::GrossIncome => gross_income,
        SurchargeBasis::TaxableIncome => taxable_income,
    };

    let Some(tier) = tier_for(&config.tiers, basis_income) else {
        return SurchargeResult {
            surcharge: Decimal::ZERO,
            marginal_relief: Decimal::ZERO,
            rate: Decimal::ZERO,
            audit_step: AuditStep {
                step_number,
                rule_id: "surcharge".to_string(),
                rule_name: "Surcharge".to_string(),
                clause_ref: config.clause_ref.clone(),
                input: serde_json::json!({
                    "basis": config.basis,
                    "basis_income": basis_income.to_string(),
                    "tax_before_rebate": tax_before_rebate.to_string(),
                }),
                output: serde_json::json!({ "surcharge": "0", "rate": "0" }),
                reasoning: format!("Income {} is below every surcharge tier", basis_income),
            },
        };
    };

    let gross_surcharge = round_half_up(tax_before_rebate * tier.rate);
    let mut surcharge = gross_surcharge;
    let mut relief_detail = serde_json::Value::Null;

    if config.marginal_relief {
        let excess = basis_income - tier.from;
        // Income the slab tax would have been computed on had the basis sat at the threshold.
        let taxable_at_threshold = non_negative(taxable_income - excess);
        let (tax_at_threshold, _) = slab_tax(slabs, taxable_at_threshold);
        let surcharge_at_threshold =
            round_half_up(tax_at_threshold * rate_for(&config.tiers, tier.from));
        let ceiling = tax_at_threshold + surcharge_at_threshold + excess;

        if tax_before_rebate + gross_surcharge > ceiling {
            surcharge = non_negative(ceiling - tax_before_rebate).min(gross_surcharge);
        }
        relief_detail = serde_json::json!({
            "threshold": tier.from.to_string(),
            "income_above_threshold": excess.to_string(),
            "tax_at_threshold": tax_at_threshold.to_string(),
            "surcharge_at_threshold": surcharge_at_threshold.to_string(),
            "ceiling": ceiling.to_string(),
        });
    }

    let marginal_relief = gross_surcharge - surcharge;

    debug!(
        basis_income = %basis_income,
        rate = %tier.rate,
        surcharge = %surcharge,
        marginal_relief = %marginal_relief,
        "Computed surcharge"
    );

    let reasoning = if marginal_relief > Decimal::ZERO {
        format!(
            "Surcharge at {} of {} is {}, reduced by marginal relief of {} to {}",
            tier.rate, tax_before_rebate, gross_surcharge, marginal_relief, surcharge
        )
    } else {
        format!(
            "Income {} falls in the tier above {}: surcharge at {} of {} is {}",
            basis_income, tier.from, tier.rate, tax_before_rebate, surcharge
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "surcharge".to_string(),
        rule_name: "Surcharge".to_string(),
        clause_ref: config.clause_ref.clone(),
        input: serde_json::json!({
            "basis": config.basis,
            "basis_income": basis_income.to_string(),
            "tax_before_rebate": tax_before_rebate.to_string(),
        }),
        output: serde_json::json!({
            "rate": tier.rate.to_string(),
            "surcharge_before_relief": gross_surcharge.to_string(),
            "marginal_relief": marginal_relief.to_string(),
            "surcharge": surcharge.to_string(),
            "relief": relief_detail,
        }),
        reasoning,
    };

    SurchargeResult {
        surcharge,
        marginal_relief,
        rate: tier.rate,
        audit_step,
    }
}

/// Computes cess on tax after rebate plus surcharge.
pub fn calculate_cess(
    tax_after_rebate: Decimal,
    surcharge: Decimal,
    cess_rate: Decimal,
    rounding: RoundingRule,
    step_number: u32,
) -> CessResult {
    let base = non_negative(tax_after_rebate) + surcharge;
    let cess = rounding.apply(base * cess_rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: "cess".to_string(),
        rule_name: "Health and Education Cess".to_string(),
        clause_ref: "Finance Act, health and education cess".to_string(),
        input: serde_json::json!({
            "tax_after_rebate": tax_after_rebate.to_string(),
            "surcharge": surcharge.to_string(),
            "cess_rate": cess_rate.to_string(),
        }),
        output: serde_json::json!({ "cess": cess.to_string() }),
        reasoning: format!("Cess at {} of {} is {}", cess_rate, base, cess),
    };

    CessResult { cess, audit_step }
}
