//! Declared exemptions and deductions, and their capped outcomes.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AuditWarning;

/// Rent details needed for the house-rent-allowance exemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseRentDeclaration {
    /// Rent paid over the year.
    pub annual_rent_paid: Decimal,
    /// Whether the rented accommodation is in a metro city.
    #[serde(default)]
    pub metro: bool,
}

/// Exemption claims declared by the employee, keyed by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionDeclarations {
    /// Rent details for the house-rent-allowance rule.
    #[serde(default)]
    pub house_rent: Option<HouseRentDeclaration>,
    /// Claimed amounts for the other allowance categories (e.g. "lta").
    #[serde(default)]
    pub allowances: BTreeMap<String, Decimal>,
}

impl ExemptionDeclarations {
    /// Returns true if nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.house_rent.is_none() && self.allowances.is_empty()
    }
}

/// The outcome of one exemption claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionClaim {
    /// Exemption category (e.g. "hra", "lta").
    pub category: String,
    /// Statutory section the exemption falls under.
    pub section: String,
    /// Amount claimed (for house rent, the allowance received).
    pub claimed: Decimal,
    /// Amount allowed after applying the rule and caps.
    pub eligible: Decimal,
    /// The ceiling that applied, if any.
    pub cap: Option<Decimal>,
}

/// The outcome of one deduction section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionClaim {
    /// Statutory section code (e.g. "80C").
    pub section: String,
    /// Amount claimed, including amounts sourced from salary components.
    pub claimed: Decimal,
    /// Amount allowed after capping.
    pub eligible: Decimal,
    /// The section ceiling; `None` means no limit.
    pub cap: Option<Decimal>,
}

/// A claim that was truncated to its cap. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapExceededWarning {
    /// The section, category or combined-cap group that was capped.
    pub section: String,
    /// Amount claimed before capping.
    pub claimed: Decimal,
    /// The ceiling the claim was truncated to.
    pub cap: Decimal,
}

impl From<CapExceededWarning> for AuditWarning {
    fn from(warning: CapExceededWarning) -> Self {
        AuditWarning {
            code: "CAP_EXCEEDED".to_string(),
            message: format!(
                "Claim under '{}' of {} exceeds the cap of {}; truncated to the cap",
                warning.section,
                warning.claimed.normalize(),
                warning.cap.normalize()
            ),
            severity: "low".to_string(),
        }
    }
}
