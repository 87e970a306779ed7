//! Rebate against slab tax for low incomes.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::RebateConfig;
use crate::models::{AuditStep, TaxpayerProfile};

use super::rounding::{non_negative, round_half_up};

/// The result of rebate calculation.
#[derive(Debug, Clone)]
pub struct RebateResult {
    /// Rebate applied; never more than tax before rebate.
    pub rebate: Decimal,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Computes the rebate for a taxable income.
///
/// At or below the threshold the rebate is the lesser of the cap and the tax
/// itself. Above it the rebate is zero unless the regime configures a
/// phase-out, in which case it falls linearly to zero at the upper bound.
/// A residents-only rebate is denied to non-residents.
pub fn calculate_rebate(
    taxable_income: Decimal,
    tax_before_rebate: Decimal,
    config: &RebateConfig,
    profile: &TaxpayerProfile,
    step_number: u32,
) -> RebateResult {
    let full = config.max_amount.min(non_negative(tax_before_rebate));

    let (rebate, reasoning) = if config.residents_only && !profile.is_resident() {
        (
            Decimal::ZERO,
            "Rebate is available to residents only".to_string(),
        )
    } else if taxable_income <= config.income_threshold {
        (
            full,
            format!(
                "Taxable income {} is within the threshold {}: rebate is the lesser of cap {} and tax {}",
                taxable_income, config.income_threshold, config.max_amount, tax_before_rebate
            ),
        )
    } else {
        match config.phase_out_upper {
            Some(upper) if taxable_income < upper => {
                let share = (upper - taxable_income) / (upper - config.income_threshold);
                let rebate = round_half_up(full * share).min(full);
                (
                    rebate,
                    format!(
                        "Taxable income {} is in the phase-out band up to {}: rebate reduced to {}",
                        taxable_income, upper, rebate
                    ),
                )
            }
            _ => (
                Decimal::ZERO,
                format!(
                    "Taxable income {} exceeds the threshold {}: no rebate",
                    taxable_income, config.income_threshold
                ),
            ),
        }
    };

    debug!(taxable_income = %taxable_income, rebate = %rebate, "Computed rebate");

    let audit_step = AuditStep {
        step_number,
        rule_id: "rebate".to_string(),
        rule_name: "Rebate".to_string(),
        clause_ref: config.clause_ref.clone(),
        input: serde_json::json!({
            "taxable_income": taxable_income.to_string(),
            "tax_before_rebate": tax_before_rebate.to_string(),
            "income_threshold": config.income_threshold.to_string(),
            "max_amount": config.max_amount.to_string(),
            "phase_out_upper": config.phase_out_upper.map(|u| u.to_string()),
            "resident": profile.is_resident(),
        }),
        output: serde_json::json!({ "rebate": rebate.to_string() }),
        reasoning,
    };

    RebateResult { rebate, audit_step }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResidentialStatus;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config(phase_out_upper: Option<&str>) -> RebateConfig {
        RebateConfig {
            clause_ref: "87A".to_string(),
            income_threshold: dec("500000"),
            max_amount: dec("12500"),
            phase_out_upper: phase_out_upper.map(dec),
            residents_only: true,
        }
    }

    fn resident() -> TaxpayerProfile {
        TaxpayerProfile {
            employee_id: "emp_001".to_string(),
            age: 30,
            residential_status: ResidentialStatus::Resident,
        }
    }

    #[test]
    fn test_rebate_covers_tax_below_threshold() {
        let result = calculate_rebate(dec("480000"), dec("11500"), &config(None), &resident(), 8);
        assert_eq!(result.rebate, dec("11500"));
        assert_eq!(result.audit_step.clause_ref, "87A");
    }

    #[test]
    fn test_rebate_capped_at_threshold() {
        let result = calculate_rebate(dec("500000"), dec("13000"), &config(None), &resident(), 8);
        assert_eq!(result.rebate, dec("12500"));
    }

    #[test]
    fn test_no_rebate_above_threshold() {
        let result = calculate_rebate(dec("500010"), dec("12502"), &config(None), &resident(), 8);
        assert_eq!(result.rebate, Decimal::ZERO);
    }

    #[test]
    fn test_linear_phase_out() {
        // Halfway between 500000 and 600000 keeps half the rebate
        let result =
            calculate_rebate(dec("550000"), dec("22500"), &config(Some("600000")), &resident(), 8);
        assert_eq!(result.rebate, dec("6250"));

        let result =
            calculate_rebate(dec("600000"), dec("32500"), &config(Some("600000")), &resident(), 8);
        assert_eq!(result.rebate, Decimal::ZERO);
    }

    #[test]
    fn test_non_resident_denied() {
        let mut profile = resident();
        profile.residential_status = ResidentialStatus::NonResident;
        let result = calculate_rebate(dec("480000"), dec("11500"), &config(None), &profile, 8);
        assert_eq!(result.rebate, Decimal::ZERO);
    }

    #[test]
    fn test_rebate_never_exceeds_tax() {
        for tax in ["0", "1", "12499.99", "12500", "40000"] {
            let result = calculate_rebate(dec("400000"), dec(tax), &config(None), &resident(), 8);
            assert!(result.rebate <= dec(tax));
        }
    }
}
