//! Exemption calculation for allowances such as HRA and LTA.
//!
//! Each exemption category is computed by the rule the regime configures for
//! it. Categories the regime does not list are dropped without a trace in
//! the breakdown, and a regime that honours no exemptions yields an empty
//! breakdown and a zero total.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::{ExemptionRule, RegimeConfig};
use crate::models::{
    AuditStep, CapExceededWarning, ComponentCatalogue, ExemptionClaim, ExemptionDeclarations,
};

use super::rounding::{non_negative, round_half_up};

/// The result of exemption calculation.
#[derive(Debug, Clone)]
pub struct ExemptionResult {
    /// Sum of eligible exemptions.
    pub total: Decimal,
    /// One entry per honoured, declared category.
    pub claims: Vec<ExemptionClaim>,
    /// Claims truncated to a cap.
    pub warnings: Vec<CapExceededWarning>,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Computes exemptions under a regime.
///
/// # Arguments
///
/// * `regime` - The active regime configuration
/// * `catalogue` - Component catalogue, for component-level exemption caps
/// * `annual_components` - Annual value of each resolved component
/// * `declarations` - What the employee declared
/// * `step_number` - The audit step number
///
/// # House rent
///
/// The exemption is the least of the allowance received, rent paid less the
/// configured share of salary, and the metro or non-metro share of salary,
/// where salary is the sum of the rule's basic components. Negative
/// intermediate values count as zero.
///
/// An allowance paid through a non-taxable component never reached gross
/// income, so it counts as zero received.
pub fn calculate_exemptions(
    regime: &RegimeConfig,
    catalogue: &ComponentCatalogue,
    annual_components: &BTreeMap<String, Decimal>,
    declarations: &ExemptionDeclarations,
    step_number: u32,
) -> ExemptionResult {
    if !regime.honors_exemptions {
        debug!(regime = %regime.regime, "Regime does not honour exemptions");
        return ExemptionResult {
            total: Decimal::ZERO,
            claims: Vec::new(),
            warnings: Vec::new(),
            audit_step: AuditStep {
                step_number,
                rule_id: "exemptions".to_string(),
                rule_name: "Salary Exemptions".to_string(),
                clause_ref: "10".to_string(),
                input: serde_json::json!({
                    "regime": regime.regime,
                    "declared_categories": declared_categories(declarations),
                }),
                output: serde_json::json!({ "total": "0", "claims": [] }),
                reasoning: format!("The {} regime does not honour exemptions", regime.regime),
            },
        };
    }

    let received = |code: &str| annual_components.get(code).copied().unwrap_or(Decimal::ZERO);
    // Only an allowance already counted in gross income can be exempted from it.
    let taxable_received = |code: &str| {
        if catalogue.get(code).is_some_and(|c| c.taxable) {
            received(code)
        } else {
            Decimal::ZERO
        }
    };
    let component_cap = |code: &str| catalogue.get(code).and_then(|c| c.tax_exemption_cap);

    let mut claims = Vec::new();
    let mut warnings = Vec::new();
    let mut workings = serde_json::Map::new();

    for (category, rule) in &regime.exemptions {
        match rule {
            ExemptionRule::HouseRent {
                section,
                component,
                basic_components,
                metro_rate,
                non_metro_rate,
                rent_offset_rate,
            } => {
                let Some(house_rent) = &declarations.house_rent else {
                    continue;
                };
                let allowance = taxable_received(component.as_str());
                let salary: Decimal = basic_components
                    .iter()
                    .map(|code| received(code.as_str()))
                    .sum();
                let rent_excess =
                    non_negative(house_rent.annual_rent_paid - *rent_offset_rate * salary);
                let share_rate = if house_rent.metro {
                    *metro_rate
                } else {
                    *non_metro_rate
                };
                let salary_share = non_negative(share_rate * salary);

                let mut eligible = round_half_up(allowance.min(rent_excess).min(salary_share));
                let cap = component_cap(component.as_str());
                if let Some(cap) = cap {
                    if eligible > cap {
                        warnings.push(CapExceededWarning {
                            section: category.clone(),
                            claimed: eligible,
                            cap,
                        });
                        eligible = cap;
                    }
                }

                workings.insert(
                    category.clone(),
                    serde_json::json!({
                        "allowance_received": allowance.to_string(),
                        "salary": salary.to_string(),
                        "rent_paid_less_offset": rent_excess.to_string(),
                        "salary_share": salary_share.to_string(),
                        "metro": house_rent.metro,
                        "eligible": eligible.to_string(),
                    }),
                );
                claims.push(ExemptionClaim {
                    category: category.clone(),
                    section: section.clone(),
                    claimed: allowance,
                    eligible,
                    cap,
                });
            }
            ExemptionRule::Capped {
                section,
                component,
                cap,
            } => {
                let Some(claimed) = declarations.allowances.get(category).copied() else {
                    continue;
                };
                let mut eligible = claimed;
                if let Some(code) = component {
                    eligible = eligible.min(taxable_received(code.as_str()));
                }
                let cap = match (*cap, component.as_deref().and_then(component_cap)) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
                if let Some(cap) = cap {
                    if eligible > cap {
                        warnings.push(CapExceededWarning {
                            section: category.clone(),
                            claimed: eligible,
                            cap,
                        });
                        eligible = cap;
                    }
                }
                let eligible = round_half_up(eligible);

                workings.insert(
                    category.clone(),
                    serde_json::json!({
                        "claimed": claimed.to_string(),
                        "received": component.as_deref().map(|c| taxable_received(c).to_string()),
                        "cap": cap.map(|c| c.to_string()),
                        "eligible": eligible.to_string(),
                    }),
                );
                claims.push(ExemptionClaim {
                    category: category.clone(),
                    section: section.clone(),
                    claimed,
                    eligible,
                    cap,
                });
            }
        }
    }

    for warning in &warnings {
        warn!(
            category = %warning.section,
            claimed = %warning.claimed,
            cap = %warning.cap,
            "Exemption truncated to cap"
        );
    }

    let total: Decimal = claims.iter().map(|c| c.eligible).sum();
    debug!(regime = %regime.regime, total = %total, claims = claims.len(), "Computed exemptions");

    let audit_step = AuditStep {
        step_number,
        rule_id: "exemptions".to_string(),
        rule_name: "Salary Exemptions".to_string(),
        clause_ref: "10".to_string(),
        input: serde_json::json!({
            "regime": regime.regime,
            "declared_categories": declared_categories(declarations),
        }),
        output: serde_json::json!({
            "total": total.to_string(),
            "claims": serde_json::Value::Object(workings),
        }),
        reasoning: format!(
            "Allowed {} exemption categories totalling {}",
            claims.len(),
            total
        ),
    };

    ExemptionResult {
        total,
        claims,
        warnings,
        audit_step,
    }
}

fn declared_categories(declarations: &ExemptionDeclarations) -> Vec<String> {
    let mut categories: Vec<String> = declarations.allowances.keys().cloned().collect();
    if declarations.house_rent.is_some() {
        categories.insert(0, "house_rent".to_string());
    }
    categories
}
