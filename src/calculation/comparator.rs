//! Side-by-side comparison of both regimes.

use tracing::debug;

use crate::config::TaxYearConfig;
use crate::error::EngineResult;
use crate::models::{Regime, RegimeComparison, TaxComputationInput, TieBreak};

use super::pipeline::compute_tax;

/// Computes tax under both regimes and recommends the cheaper one.
///
/// When both totals are equal the recommendation follows `tie_break`, or
/// the tax year's configured rule when none is given. `savings` is the
/// absolute difference between the two totals.
///
/// # Errors
///
/// Any error either computation raises; no partial comparison is returned.
pub fn compare_regimes(
    input: &TaxComputationInput,
    tax_year: &TaxYearConfig,
    tie_break: Option<TieBreak>,
) -> EngineResult<RegimeComparison> {
    let old_regime = compute_tax(input, tax_year, Regime::Old)?;
    let new_regime = compute_tax(input, tax_year, Regime::New)?;
    let tie_break = tie_break.unwrap_or(tax_year.tie_break);

    let recommended = match old_regime.total_tax.cmp(&new_regime.total_tax) {
        std::cmp::Ordering::Less => Regime::Old,
        std::cmp::Ordering::Greater => Regime::New,
        std::cmp::Ordering::Equal => tie_break.preferred(),
    };
    let savings = (old_regime.total_tax - new_regime.total_tax).abs();

    debug!(
        employee_id = %input.profile.employee_id,
        old_total = %old_regime.total_tax,
        new_total = %new_regime.total_tax,
        recommended = %recommended,
        "Compared regimes"
    );

    Ok(RegimeComparison {
        old_regime,
        new_regime,
        recommended,
        savings,
        tie_break,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    use crate::config::ConfigLoader;
    use crate::models::{
        ComponentCatalogue, ComponentKind, ExemptionDeclarations, ResidentialStatus,
        SalaryComponent, SalarySource, TaxpayerProfile, ValueKind, WithholdingStatus,
    };

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tax_year() -> TaxYearConfig {
        ConfigLoader::load("./config")
            .unwrap()
            .get_tax_year("2024-25")
            .unwrap()
            .clone()
    }

    fn input(basic: &str) -> TaxComputationInput {
        TaxComputationInput {
            tax_year: "2024-25".to_string(),
            profile: TaxpayerProfile {
                employee_id: "emp_001".to_string(),
                age: 35,
                residential_status: ResidentialStatus::Resident,
            },
            catalogue: ComponentCatalogue::new(vec![SalaryComponent {
                code: "BASIC".to_string(),
                name: "Basic salary".to_string(),
                kind: ComponentKind::Earning,
                value_kind: ValueKind::Fixed,
                taxable: true,
                exemption_section: None,
                default_value: Decimal::ZERO,
                formula: None,
                tax_exemption_cap: None,
            }])
            .unwrap(),
            salary: SalarySource::Resolved {
                values: BTreeMap::from([("BASIC".to_string(), dec(basic))]),
            },
            pay_periods_per_year: 1,
            other_income: BTreeMap::new(),
            deduction_claims: BTreeMap::new(),
            exemption_claims: ExemptionDeclarations::default(),
            withholding: WithholdingStatus {
                remaining_periods: 1,
                tds_already_withheld: Decimal::ZERO,
            },
        }
    }

    #[test]
    fn test_recommends_lower_total() {
        let comparison = compare_regimes(&input("1250000"), &tax_year(), None).unwrap();

        // Old: 12,00,000 taxable -> 1,72,500 + 6,900 cess
        assert_eq!(comparison.old_regime.total_tax, dec("179400"));
        // New: 11,75,000 taxable -> 76,250 + 3,050 cess
        assert_eq!(comparison.new_regime.total_tax, dec("79300"));
        assert_eq!(comparison.recommended, Regime::New);
        assert_eq!(comparison.savings, dec("100100"));
    }

    #[test]
    fn test_old_regime_wins_with_large_deductions() {
        let mut input = input("1250000");
        input.deduction_claims.insert("80C".to_string(), dec("150000"));
        input.deduction_claims.insert("80CCD(1B)".to_string(), dec("50000"));
        input.deduction_claims.insert("80D".to_string(), dec("25000"));
        input.deduction_claims.insert("24(b)".to_string(), dec("200000"));
        input.deduction_claims.insert("80E".to_string(), dec("300000"));

        let comparison = compare_regimes(&input, &tax_year(), None).unwrap();
        assert_eq!(comparison.recommended, Regime::Old);
        assert!(comparison.old_regime.total_tax < comparison.new_regime.total_tax);
        assert_eq!(
            comparison.savings,
            comparison.new_regime.total_tax - comparison.old_regime.total_tax
        );
    }

    #[test]
    fn test_tie_follows_configured_rule() {
        let comparison = compare_regimes(&input("300000"), &tax_year(), None).unwrap();
        assert_eq!(comparison.old_regime.total_tax, Decimal::ZERO);
        assert_eq!(comparison.new_regime.total_tax, Decimal::ZERO);
        assert_eq!(comparison.savings, Decimal::ZERO);
        assert_eq!(comparison.tie_break, TieBreak::PreferNew);
        assert_eq!(comparison.recommended, Regime::New);
    }

    #[test]
    fn test_tie_break_override() {
        let comparison =
            compare_regimes(&input("300000"), &tax_year(), Some(TieBreak::PreferOld)).unwrap();
        assert_eq!(comparison.recommended, Regime::Old);
        assert_eq!(comparison.tie_break, TieBreak::PreferOld);
    }

    #[test]
    fn test_recommended_total_is_the_minimum() {
        for basic in ["0", "500000", "900000", "2500000", "6000000"] {
            let comparison = compare_regimes(&input(basic), &tax_year(), None).unwrap();
            let recommended = comparison.result_for(comparison.recommended).total_tax;
            assert_eq!(
                recommended,
                comparison
                    .old_regime
                    .total_tax
                    .min(comparison.new_regime.total_tax)
            );
        }
    }
}
