//! Progressive slab taxation.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{RegimeConfig, Slab};
use crate::models::{AgeBand, AuditStep, SlabLine, TaxpayerProfile};

use super::rounding::round_half_up;

/// The result of slab taxation, including the per-slab breakdown.
#[derive(Debug, Clone)]
pub struct SlabTaxResult {
    /// Tax before rebate, surcharge and cess.
    pub tax: Decimal,
    /// One line per slab the income reaches.
    pub lines: Vec<SlabLine>,
    /// The age band whose table was used, for age-banded regimes.
    pub age_band: Option<AgeBand>,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Taxes an income against an ordered slab table.
///
/// Each slab taxes the portion of income above its lower bound and up to its
/// upper bound; the top slab has no upper bound. Each line is rounded to the
/// paisa before summing.
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use tax_engine::calculation::slab_tax;
/// use tax_engine::config::Slab;
///
/// let slabs = vec![
///     Slab { from: Decimal::ZERO, to: Some(Decimal::from(300000)), rate: Decimal::ZERO },
///     Slab { from: Decimal::from(300000), to: None, rate: Decimal::new(5, 2) },
/// ];
/// let (tax, lines) = slab_tax(&slabs, Decimal::from(500000));
/// assert_eq!(tax, Decimal::from(10000));
/// assert_eq!(lines.len(), 2);
/// ```
pub fn slab_tax(slabs: &[Slab], income: Decimal) -> (Decimal, Vec<SlabLine>) {
    let mut total = Decimal::ZERO;
    let mut lines = Vec::new();

    for (index, slab) in slabs.iter().enumerate() {
        if income <= slab.from {
            break;
        }
        // The top slab taxes everything above its lower bound.
        let to = if index + 1 == slabs.len() { None } else { slab.to };
        let upper = to.map_or(income, |to| to.min(income));
        let taxable_amount = upper - slab.from;
        let tax = round_half_up(taxable_amount * slab.rate);
        total += tax;
        lines.push(SlabLine {
            from: slab.from,
            to,
            rate: slab.rate,
            taxable_amount,
            tax,
        });
    }

    (total, lines)
}

/// Computes tax before rebate for a taxpayer under a regime.
///
/// The slab table comes from the regime: one fixed table, or the variant
/// for the taxpayer's age band where the regime varies by age.
pub fn calculate_slab_tax(
    taxable_income: Decimal,
    regime: &RegimeConfig,
    profile: &TaxpayerProfile,
    step_number: u32,
) -> SlabTaxResult {
    let (table, age_band) = regime.slabs.table_for(profile);
    let (tax, lines) = slab_tax(table, taxable_income);
    let band_name = age_band.map(|b| b.as_str());

    debug!(
        regime = %regime.regime,
        taxable_income = %taxable_income,
        age_band = band_name.unwrap_or("all"),
        tax = %tax,
        "Computed slab tax"
    );

    let breakdown: Vec<serde_json::Value> = lines
        .iter()
        .map(|line| {
            serde_json::json!({
                "from": line.from.to_string(),
                "to": line.to.map(|to| to.to_string()),
                "rate": line.rate.to_string(),
                "taxable_amount": line.taxable_amount.to_string(),
                "tax": line.tax.to_string(),
            })
        })
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "slab_tax".to_string(),
        rule_name: "Slab Tax".to_string(),
        clause_ref: regime.clause_ref.clone(),
        input: serde_json::json!({
            "taxable_income": taxable_income.to_string(),
            "regime": regime.regime,
            "age": profile.age,
            "age_band": band_name,
        }),
        output: serde_json::json!({
            "slabs": breakdown,
            "tax_before_rebate": tax.to_string(),
        }),
        reasoning: format!(
            "Applied {} slabs of the {} regime to taxable income {}: tax {}",
            lines.len(),
            regime.regime,
            taxable_income,
            tax
        ),
    };

    SlabTaxResult {
        tax,
        lines,
        age_band,
        audit_step,
    }
}
