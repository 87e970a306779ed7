//! Annualisation of per-period component values into gross income.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{AuditStep, ComponentCatalogue, ComponentKind};

use super::resolver::decimal_strings;
use super::rounding::round_half_up;

/// Annual income figures derived from one period's resolved components.
#[derive(Debug, Clone)]
pub struct AnnualIncome {
    /// Every resolved component multiplied up to a full year.
    pub annual_components: BTreeMap<String, Decimal>,
    /// Taxable earnings and reimbursements for the year.
    pub salary_income: Decimal,
    /// Sum of non-salary income.
    pub other_income: Decimal,
    /// Salary income plus other income.
    pub gross_income: Decimal,
    /// Annual amounts withheld by deduction components, keyed by the section they count towards.
    pub component_deductions: BTreeMap<String, Decimal>,
    /// The audit step recording the annualisation.
    pub audit_step: AuditStep,
}

/// Scales period values to a year and totals gross income.
///
/// Earnings and reimbursements count towards salary income only when the
/// component is flagged taxable. Deduction components never add to income;
/// those tagged with a section contribute their annual value as a claim
/// under that section.
pub fn annualise_income(
    catalogue: &ComponentCatalogue,
    period_values: &BTreeMap<String, Decimal>,
    pay_periods_per_year: u32,
    other_income: &BTreeMap<String, Decimal>,
    step_number: u32,
) -> AnnualIncome {
    let periods = Decimal::from(pay_periods_per_year);
    let mut annual_components = BTreeMap::new();
    let mut component_deductions: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut salary_income = Decimal::ZERO;
    let mut excluded = Vec::new();

    for (code, value) in period_values {
        let annual = round_half_up(*value * periods);
        annual_components.insert(code.clone(), annual);

        let Some(component) = catalogue.get(code) else {
            continue;
        };
        match component.kind {
            ComponentKind::Earning | ComponentKind::Reimbursement => {
                if component.taxable {
                    salary_income += annual;
                } else {
                    excluded.push(code.clone());
                }
            }
            ComponentKind::Deduction => {
                if let Some(section) = &component.exemption_section {
                    *component_deductions.entry(section.clone()).or_default() += annual;
                }
            }
        }
    }

    let other_total: Decimal = other_income.values().copied().sum();
    let gross_income = salary_income + other_total;

    let audit_step = AuditStep {
        step_number,
        rule_id: "gross_income".to_string(),
        rule_name: "Gross Income".to_string(),
        clause_ref: "15-17".to_string(),
        input: serde_json::json!({
            "pay_periods_per_year": pay_periods_per_year,
            "period_values": decimal_strings(period_values),
            "other_income": decimal_strings(other_income),
        }),
        output: serde_json::json!({
            "salary_income": salary_income.to_string(),
            "other_income": other_total.to_string(),
            "gross_income": gross_income.to_string(),
            "component_deductions": decimal_strings(&component_deductions),
            "non_taxable_components": excluded,
        }),
        reasoning: format!(
            "Annualised {} components over {} pay periods: salary {} + other income {} = gross {}",
            period_values.len(),
            pay_periods_per_year,
            salary_income,
            other_total,
            gross_income
        ),
    };

    AnnualIncome {
        annual_components,
        salary_income,
        other_income: other_total,
        gross_income,
        component_deductions,
        audit_step,
    }
}
