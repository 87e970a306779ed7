//! Input validation run before any computation.
//!
//! Rejects negative or implausibly large amounts, unknown claim sections,
//! out-of-range counts and cyclic catalogues, naming the offending field.
//! Claims that are valid for the year but not honoured by one regime pass
//! validation; the regime drops them.

use rust_decimal::Decimal;

use crate::config::TaxYearConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{ComponentKind, SalarySource, TaxComputationInput};

use super::resolver::ensure_acyclic;

/// Oldest age accepted on a taxpayer profile.
pub const MAX_AGE: u32 = 130;

/// Most pay periods a year may be divided into.
pub const MAX_PAY_PERIODS: u32 = 366;

/// Largest amount accepted anywhere on an input: ₹10^15.
///
/// Annualising and summing amounts below this bound stays well inside
/// `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

fn check_amount(field: impl Into<String>, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_input(field, "must not be negative"));
    }
    if value > MAX_AMOUNT {
        return Err(EngineError::invalid_input(
            field,
            format!("must not exceed {}", MAX_AMOUNT),
        ));
    }
    Ok(())
}

/// Validates a computation input against the tax year it names.
///
/// # Errors
///
/// `InvalidInput` identifying the first offending field.
pub fn validate_input(input: &TaxComputationInput, tax_year: &TaxYearConfig) -> EngineResult<()> {
    if input.tax_year != tax_year.tax_year {
        return Err(EngineError::invalid_input(
            "tax_year",
            format!(
                "input is for '{}' but configuration is for '{}'",
                input.tax_year, tax_year.tax_year
            ),
        ));
    }

    if input.profile.employee_id.trim().is_empty() {
        return Err(EngineError::invalid_input(
            "profile.employee_id",
            "must not be empty",
        ));
    }
    if input.profile.age > MAX_AGE {
        return Err(EngineError::invalid_input(
            "profile.age",
            format!("{} is not a plausible age", input.profile.age),
        ));
    }

    if input.pay_periods_per_year == 0 || input.pay_periods_per_year > MAX_PAY_PERIODS {
        return Err(EngineError::invalid_input(
            "pay_periods_per_year",
            format!("must be between 1 and {}", MAX_PAY_PERIODS),
        ));
    }
    if input.withholding.remaining_periods == 0
        || input.withholding.remaining_periods > input.pay_periods_per_year
    {
        return Err(EngineError::invalid_input(
            "withholding.remaining_periods",
            format!("must be between 1 and {}", input.pay_periods_per_year),
        ));
    }
    check_amount(
        "withholding.tds_already_withheld",
        input.withholding.tds_already_withheld,
    )?;

    for (category, amount) in &input.other_income {
        check_amount(format!("other_income.{}", category), *amount)?;
    }

    let known_sections = tax_year.known_deduction_sections();
    for (section, amount) in &input.deduction_claims {
        if !known_sections.contains(section.as_str()) {
            return Err(EngineError::invalid_input(
                format!("deduction_claims.{}", section),
                "unknown deduction section",
            ));
        }
        check_amount(format!("deduction_claims.{}", section), *amount)?;
    }

    let known_categories = tax_year.known_exemption_categories();
    for (category, amount) in &input.exemption_claims.allowances {
        if !known_categories.contains(category.as_str()) {
            return Err(EngineError::invalid_input(
                format!("exemption_claims.allowances.{}", category),
                "unknown exemption category",
            ));
        }
        check_amount(format!("exemption_claims.allowances.{}", category), *amount)?;
    }
    if let Some(house_rent) = &input.exemption_claims.house_rent {
        check_amount(
            "exemption_claims.house_rent.annual_rent_paid",
            house_rent.annual_rent_paid,
        )?;
    }

    match &input.salary {
        SalarySource::Resolved { values } => {
            for (code, value) in values {
                check_amount(format!("salary.values.{}", code), *value)?;
            }
        }
        SalarySource::Assignments { history, .. } => {
            for assignment in history.assignments() {
                for line in &assignment.lines {
                    if let Some(value) = line.value {
                        check_amount(format!("assignment.lines.{}.value", line.code), value)?;
                    }
                }
            }
        }
    }

    for component in input.catalogue.iter() {
        check_amount(
            format!("catalogue.{}.default_value", component.code),
            component.default_value,
        )?;
        if let Some(cap) = component.tax_exemption_cap {
            check_amount(format!("catalogue.{}.tax_exemption_cap", component.code), cap)?;
        }
        if component.kind != ComponentKind::Deduction {
            continue;
        }
        if let Some(section) = &component.exemption_section {
            if !known_sections.contains(section.as_str()) {
                return Err(EngineError::invalid_input(
                    format!("catalogue.{}.exemption_section", component.code),
                    format!("'{}' is not a deduction section of {}", section, tax_year.tax_year),
                ));
            }
        }
    }

    ensure_acyclic(&input.catalogue)?;

    Ok(())
}
