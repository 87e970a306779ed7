//! Deduction aggregation.
//!
//! Declared claims and component-sourced claims are merged by section,
//! filtered to the sections the regime honours, capped per section and then
//! per combined group. The standard deduction is always added as its own
//! line.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::RegimeConfig;
use crate::models::{AuditStep, CapExceededWarning, DeductionClaim};

use super::rounding::round_half_up;

/// Section under which the standard deduction is reported.
pub const STANDARD_DEDUCTION_SECTION: &str = "16(ia)";

/// The result of deduction aggregation.
#[derive(Debug, Clone)]
pub struct DeductionResult {
    /// Standard deduction allowed.
    pub standard_deduction: Decimal,
    /// Standard deduction plus every eligible claim.
    pub total: Decimal,
    /// The standard deduction line followed by honoured sections in code order.
    pub claims: Vec<DeductionClaim>,
    /// Claims truncated to a section or group cap.
    pub warnings: Vec<CapExceededWarning>,
    /// Sections dropped because the regime does not honour them.
    pub dropped_sections: Vec<String>,
    /// The audit step recording the aggregation.
    pub audit_step: AuditStep,
}

/// Aggregates deductions under a regime.
///
/// # Arguments
///
/// * `regime` - The active regime configuration
/// * `declared` - Declared claims by section
/// * `component_claims` - Claims sourced from deduction components, by section
/// * `salary_income` - Annual salary income, which bounds the standard deduction
/// * `step_number` - The audit step number
///
/// # Example
///
/// ```no_run
/// use std::collections::BTreeMap;
/// use rust_decimal::Decimal;
/// use tax_engine::calculation::aggregate_deductions;
/// use tax_engine::config::ConfigLoader;
/// use tax_engine::models::Regime;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let old = loader.get_regime("2024-25", Regime::Old).unwrap();
/// let declared = BTreeMap::from([("80C".to_string(), Decimal::from(200000))]);
///
/// let result = aggregate_deductions(old, &declared, &BTreeMap::new(), Decimal::from(900000), 4);
/// assert_eq!(result.total, Decimal::from(200000)); // 50000 standard + 150000 capped 80C
/// ```
pub fn aggregate_deductions(
    regime: &RegimeConfig,
    declared: &BTreeMap<String, Decimal>,
    component_claims: &BTreeMap<String, Decimal>,
    salary_income: Decimal,
    step_number: u32,
) -> DeductionResult {
    let mut merged: BTreeMap<&str, Decimal> = BTreeMap::new();
    for (section, amount) in declared.iter().chain(component_claims.iter()) {
        *merged.entry(section.as_str()).or_default() += *amount;
    }

    let standard_deduction = regime.standard_deduction.min(salary_income).max(Decimal::ZERO);
    let mut claims = Vec::new();
    if regime.standard_deduction > Decimal::ZERO {
        claims.push(DeductionClaim {
            section: STANDARD_DEDUCTION_SECTION.to_string(),
            claimed: regime.standard_deduction,
            eligible: standard_deduction,
            cap: Some(regime.standard_deduction),
        });
    }

    let mut warnings = Vec::new();
    let mut dropped_sections = Vec::new();
    let mut section_lines: BTreeMap<&str, DeductionClaim> = BTreeMap::new();

    for (section, claimed) in merged {
        let cap = match regime.deductions.get(section) {
            Some(cap) if regime.honors_deductions => cap.cap,
            _ => {
                dropped_sections.push(section.to_string());
                continue;
            }
        };
        let mut eligible = claimed;
        if let Some(cap) = cap {
            if claimed > cap {
                warnings.push(CapExceededWarning {
                    section: section.to_string(),
                    claimed,
                    cap,
                });
                eligible = cap;
            }
        }
        section_lines.insert(
            section,
            DeductionClaim {
                section: section.to_string(),
                claimed,
                eligible: round_half_up(eligible),
                cap,
            },
        );
    }

    // Groups share one ceiling, allocated in the order the group lists its sections.
    for group in &regime.combined_caps {
        let group_total: Decimal = group
            .sections
            .iter()
            .filter_map(|s| section_lines.get(s.as_str()))
            .map(|line| line.eligible)
            .sum();
        if group_total <= group.cap {
            continue;
        }
        let mut remaining = group.cap;
        for section in &group.sections {
            if let Some(line) = section_lines.get_mut(section.as_str()) {
                line.eligible = line.eligible.min(remaining);
                remaining -= line.eligible;
            }
        }
        warnings.push(CapExceededWarning {
            section: group.name.clone(),
            claimed: group_total,
            cap: group.cap,
        });
    }

    claims.extend(section_lines.into_values());

    for warning in &warnings {
        warn!(
            regime = %regime.regime,
            section = %warning.section,
            claimed = %warning.claimed,
            cap = %warning.cap,
            "Deduction truncated to cap"
        );
    }

    let total: Decimal = claims.iter().map(|c| c.eligible).sum();
    debug!(
        regime = %regime.regime,
        total = %total,
        dropped = dropped_sections.len(),
        "Aggregated deductions"
    );

    let lines: Vec<serde_json::Value> = claims
        .iter()
        .map(|c| {
            serde_json::json!({
                "section": c.section,
                "claimed": c.claimed.to_string(),
                "eligible": c.eligible.to_string(),
                "cap": c.cap.map(|cap| cap.to_string()),
            })
        })
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "deductions".to_string(),
        rule_name: "Deductions".to_string(),
        clause_ref: "16, Chapter VI-A".to_string(),
        input: serde_json::json!({
            "regime": regime.regime,
            "honors_deductions": regime.honors_deductions,
            "salary_income": salary_income.to_string(),
            "claimed_sections": declared.len() + component_claims.len(),
        }),
        output: serde_json::json!({
            "standard_deduction": standard_deduction.to_string(),
            "lines": lines,
            "dropped_sections": dropped_sections,
            "total": total.to_string(),
        }),
        reasoning: format!(
            "Standard deduction {} plus {} honoured sections; {} sections not honoured by the {} regime",
            standard_deduction,
            lines.len().saturating_sub(usize::from(regime.standard_deduction > Decimal::ZERO)),
            dropped_sections.len(),
            regime.regime
        ),
    };

    DeductionResult {
        standard_deduction,
        total,
        claims,
        warnings,
        dropped_sections,
        audit_step,
    }
}
