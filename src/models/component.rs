//! Salary component definitions and the component catalogue.
//!
//! A [`SalaryComponent`] describes one line of an employee's pay structure
//! (basic salary, house-rent allowance, provident fund contribution, ...).
//! The [`ComponentCatalogue`] is the validated set of components an
//! employer has configured, keyed by component code.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Whether a component adds to pay, is withheld from it, or reimburses expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Part of gross salary.
    Earning,
    /// Withheld from pay (e.g. employee provident fund, professional tax).
    Deduction,
    /// Reimbursement of expenses incurred by the employee.
    Reimbursement,
}

/// How a component's value is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// A fixed amount from the catalogue or assignment.
    Fixed,
    /// Derived from other components by a formula.
    Formula,
    /// Varies per employee; the assignment value overrides the default.
    Variable,
}

fn default_taxable() -> bool {
    true
}

/// A configured salary component.
///
/// # Example
///
/// ```
/// use tax_engine::models::{ComponentKind, SalaryComponent, ValueKind};
/// use rust_decimal::Decimal;
///
/// let hra = SalaryComponent {
///     code: "HRA".to_string(),
///     name: "House Rent Allowance".to_string(),
///     kind: ComponentKind::Earning,
///     value_kind: ValueKind::Formula,
///     taxable: true,
///     exemption_section: Some("10(13A)".to_string()),
///     default_value: Decimal::ZERO,
///     formula: Some("BASIC * 0.4".to_string()),
///     tax_exemption_cap: None,
/// };
/// assert!(hra.is_formula());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponent {
    /// Unique component code referenced by formulas (e.g. "BASIC").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Earning, deduction or reimbursement.
    pub kind: ComponentKind,
    /// Fixed, formula-derived or variable.
    pub value_kind: ValueKind,
    /// Whether the component counts towards gross taxable income.
    #[serde(default = "default_taxable")]
    pub taxable: bool,
    /// Statutory section this component is linked to, if any.
    #[serde(default)]
    pub exemption_section: Option<String>,
    /// Value per pay period used when the assignment gives none.
    #[serde(default)]
    pub default_value: Decimal,
    /// Formula expression; present only for [`ValueKind::Formula`].
    #[serde(default)]
    pub formula: Option<String>,
    /// Annual ceiling on any exemption sourced from this component.
    #[serde(default)]
    pub tax_exemption_cap: Option<Decimal>,
}

impl SalaryComponent {
    /// Returns true if the component is derived by formula.
    pub fn is_formula(&self) -> bool {
        self.value_kind == ValueKind::Formula
    }

    fn validate(&self) -> EngineResult<()> {
        let field = |name: &str| format!("catalogue.{}.{}", self.code, name);

        if self.code.trim().is_empty() {
            return Err(EngineError::invalid_input("catalogue.code", "must not be empty"));
        }
        if self.default_value < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                field("default_value"),
                "must not be negative",
            ));
        }
        if let Some(cap) = self.tax_exemption_cap {
            if cap < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    field("tax_exemption_cap"),
                    "must not be negative",
                ));
            }
        }
        match (self.value_kind, &self.formula) {
            (ValueKind::Formula, None) => Err(EngineError::invalid_input(
                field("formula"),
                "formula components require an expression",
            )),
            (ValueKind::Fixed | ValueKind::Variable, Some(_)) => Err(EngineError::invalid_input(
                field("formula"),
                "only formula components may carry an expression",
            )),
            _ => Ok(()),
        }
    }
}

/// The validated set of salary components keyed by code.
///
/// Serialized as a plain list of components; duplicate codes are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SalaryComponent>", into = "Vec<SalaryComponent>")]
pub struct ComponentCatalogue {
    components: BTreeMap<String, SalaryComponent>,
}

impl ComponentCatalogue {
    /// Builds a catalogue, validating every component.
    pub fn new(components: Vec<SalaryComponent>) -> EngineResult<Self> {
        let mut map = BTreeMap::new();
        for component in components {
            component.validate()?;
            let code = component.code.clone();
            if map.insert(code.clone(), component).is_some() {
                return Err(EngineError::invalid_input(
                    "catalogue",
                    format!("duplicate component code '{}'", code),
                ));
            }
        }
        Ok(Self { components: map })
    }

    /// Looks up a component by code.
    pub fn get(&self, code: &str) -> Option<&SalaryComponent> {
        self.components.get(code)
    }

    /// Looks up a component by code, failing with `UnknownComponent`.
    pub fn require(&self, code: &str) -> EngineResult<&SalaryComponent> {
        self.get(code).ok_or_else(|| EngineError::UnknownComponent {
            code: code.to_string(),
        })
    }

    /// Iterates components in code order.
    pub fn iter(&self) -> impl Iterator<Item = &SalaryComponent> {
        self.components.values()
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the catalogue has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl TryFrom<Vec<SalaryComponent>> for ComponentCatalogue {
    type Error = EngineError;

    fn try_from(components: Vec<SalaryComponent>) -> EngineResult<Self> {
        Self::new(components)
    }
}

impl From<ComponentCatalogue> for Vec<SalaryComponent> {
    fn from(catalogue: ComponentCatalogue) -> Self {
        catalogue.components.into_values().collect()
    }
}
