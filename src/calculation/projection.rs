//! Withholding projection across the remaining pay periods.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, MonthlyProjection, TaxComputationResult, WithholdingStatus};

use super::rounding::{floor_to_paise, non_negative};
use super::validation::MAX_PAY_PERIODS;

/// The result of a withholding projection.
#[derive(Debug, Clone)]
pub struct ProjectionResult {
    /// The projected schedule.
    pub projection: MonthlyProjection,
    /// The audit step recording the projection.
    pub audit_step: AuditStep,
}

/// Spreads the unwithheld balance of the annual tax over the remaining periods.
///
/// Every period but the last receives the balance divided evenly and
/// truncated to the paisa; the last period absorbs the remainder so the
/// schedule sums exactly to the balance. When prior withholding already
/// covers the annual tax, every period is zero and the excess is reported
/// instead of being refunded mid-year.
///
/// # Errors
///
/// `InvalidInput` when `remaining_periods` is zero or above [`MAX_PAY_PERIODS`],
/// or withholding is negative.
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use tax_engine::calculation::project_withholding;
/// use tax_engine::models::WithholdingStatus;
///
/// let status = WithholdingStatus { remaining_periods: 3, tds_already_withheld: Decimal::ZERO };
/// let result = project_withholding(Decimal::from(100), &status, 1).unwrap();
///
/// assert_eq!(result.projection.per_period, Decimal::new(3333, 2));
/// assert_eq!(result.projection.schedule.iter().sum::<Decimal>(), Decimal::from(100));
/// ```
pub fn project_withholding(
    annual_tax: Decimal,
    status: &WithholdingStatus,
    step_number: u32,
) -> EngineResult<ProjectionResult> {
    if status.remaining_periods == 0 || status.remaining_periods > MAX_PAY_PERIODS {
        return Err(EngineError::invalid_input(
            "withholding.remaining_periods",
            format!("must be between 1 and {}", MAX_PAY_PERIODS),
        ));
    }
    if status.tds_already_withheld < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "withholding.tds_already_withheld",
            "must not be negative",
        ));
    }

    let periods = status.remaining_periods;
    let balance = annual_tax - status.tds_already_withheld;
    let due = non_negative(balance);
    let excess_withheld = non_negative(-balance);

    let base = floor_to_paise(due / Decimal::from(periods));
    let last = due - base * Decimal::from(periods - 1);
    let mut schedule = vec![base; periods as usize];
    if let Some(final_period) = schedule.last_mut() {
        *final_period = last;
    }
    let per_period = schedule.first().copied().unwrap_or(Decimal::ZERO);

    debug!(
        annual_tax = %annual_tax,
        balance = %balance,
        remaining_periods = periods,
        per_period = %per_period,
        "Projected withholding"
    );

    let reasoning = if excess_withheld > Decimal::ZERO {
        format!(
            "Already withheld {} exceeds annual tax {}: nothing further due; excess {} carried forward",
            status.tds_already_withheld, annual_tax, excess_withheld
        )
    } else {
        format!(
            "Balance {} spread over {} periods: {} per period, final period {}",
            due, periods, base, last
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "withholding_projection".to_string(),
        rule_name: "Withholding Projection".to_string(),
        clause_ref: "192".to_string(),
        input: serde_json::json!({
            "annual_tax": annual_tax.to_string(),
            "tds_already_withheld": status.tds_already_withheld.to_string(),
            "remaining_periods": periods,
        }),
        output: serde_json::json!({
            "per_period": per_period.to_string(),
            "final_period": last.to_string(),
            "excess_withheld": excess_withheld.to_string(),
        }),
        reasoning,
    };

    Ok(ProjectionResult {
        projection: MonthlyProjection {
            annual_tax,
            already_withheld: status.tds_already_withheld,
            balance: due,
            remaining_periods: periods,
            per_period,
            schedule,
            excess_withheld,
        },
        audit_step,
    })
}

/// Re-projects withholding for an existing result after withholding has moved on.
///
/// Used each period as tax is deducted, without recomputing the tax itself.
pub fn reproject(
    result: &TaxComputationResult,
    status: &WithholdingStatus,
) -> EngineResult<MonthlyProjection> {
    let step_number = result.audit_trace.steps.len() as u32 + 1;
    Ok(project_withholding(result.total_tax, status, step_number)?.projection)
}
