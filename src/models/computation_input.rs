//! The input snapshot a tax computation runs over.
//!
//! Everything the engine needs is supplied up front in a
//! [`TaxComputationInput`]; the engine performs no lookups of its own
//! beyond the regime configuration passed alongside it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ComponentCatalogue, ExemptionDeclarations, SalaryAssignmentHistory, TaxpayerProfile};

/// Where the per-period salary component values come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SalarySource {
    /// Values already resolved by the caller, per pay period.
    Resolved {
        /// Component code to value per pay period.
        values: BTreeMap<String, Decimal>,
    },
    /// Resolve from the assignment in force on `as_of`.
    Assignments {
        /// The employee's assignment history.
        history: SalaryAssignmentHistory,
        /// The date whose assignment is used.
        as_of: NaiveDate,
    },
}

fn default_periods() -> u32 {
    12
}

/// Withholding position for the current tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingStatus {
    /// Pay periods left in the year, including the current one.
    #[serde(default = "default_periods")]
    pub remaining_periods: u32,
    /// Tax already deducted at source in earlier periods of the year.
    #[serde(default)]
    pub tds_already_withheld: Decimal,
}

impl Default for WithholdingStatus {
    fn default() -> Self {
        Self {
            remaining_periods: default_periods(),
            tds_already_withheld: Decimal::ZERO,
        }
    }
}

/// A complete, self-contained snapshot for one employee and tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputationInput {
    /// Tax year identifier (e.g. "2024-25").
    pub tax_year: String,
    /// Personal facts about the taxpayer.
    pub profile: TaxpayerProfile,
    /// The employer's salary component catalogue.
    pub catalogue: ComponentCatalogue,
    /// Source of per-period component values.
    pub salary: SalarySource,
    /// Number of pay periods in the tax year, used to annualise.
    #[serde(default = "default_periods")]
    pub pay_periods_per_year: u32,
    /// Annual income from other sources, by category.
    #[serde(default)]
    pub other_income: BTreeMap<String, Decimal>,
    /// Declared annual deduction claims, by section code.
    #[serde(default)]
    pub deduction_claims: BTreeMap<String, Decimal>,
    /// Declared exemption claims.
    #[serde(default)]
    pub exemption_claims: ExemptionDeclarations,
    /// Tax withheld so far and periods remaining.
    #[serde(default)]
    pub withholding: WithholdingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_input_applies_defaults() {
        let json = r#"{
            "tax_year": "2024-25",
            "profile": {"employee_id": "emp_001", "age": 30},
            "catalogue": [
                {"code": "BASIC", "name": "Basic", "kind": "earning", "value_kind": "fixed"}
            ],
            "salary": {"source": "resolved", "values": {"BASIC": "50000"}}
        }"#;

        let input: TaxComputationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.pay_periods_per_year, 12);
        assert_eq!(input.withholding.remaining_periods, 12);
        assert_eq!(input.withholding.tds_already_withheld, Decimal::ZERO);
        assert!(input.other_income.is_empty());
        assert!(input.exemption_claims.is_empty());
        match input.salary {
            SalarySource::Resolved { values } => {
                assert_eq!(values["BASIC"], Decimal::from(50000));
            }
            other => panic!("Expected resolved salary, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_assignment_source() {
        let json = r#"{
            "source": "assignments",
            "as_of": "2024-06-30",
            "history": {
                "employee_id": "emp_001",
                "assignments": [
                    {"employee_id": "emp_001", "effective_from": "2024-04-01",
                     "lines": [{"code": "BASIC", "value": "50000"}]}
                ]
            }
        }"#;

        let source: SalarySource = serde_json::from_str(json).unwrap();
        match source {
            SalarySource::Assignments { history, as_of } => {
                assert_eq!(as_of, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
                assert_eq!(history.assignments().len(), 1);
            }
            other => panic!("Expected assignment source, got {:?}", other),
        }
    }
}
