//! Rounding helpers shared by the calculation stages.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::RoundingRule;

/// Rounds a value to two decimal places, midpoint away from zero.
///
/// # Examples
///
/// ```
/// use tax_engine::calculation::round_half_up;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let d = |s| Decimal::from_str(s).unwrap();
/// assert_eq!(round_half_up(d("123.454")), d("123.45"));
/// assert_eq!(round_half_up(d("123.455")), d("123.46"));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncates a value to two decimal places towards zero.
pub fn floor_to_paise(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

impl RoundingRule {
    /// Applies the rule, rounding midpoints away from zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use tax_engine::config::RoundingRule;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(RoundingRule::NearestTen.apply(Decimal::new(12345, 0)), Decimal::new(12350, 0));
    /// assert_eq!(RoundingRule::Rupee.apply(Decimal::new(12345, 2)), Decimal::new(123, 0));
    /// ```
    pub fn apply(&self, value: Decimal) -> Decimal {
        match self {
            RoundingRule::Paise => round_half_up(value),
            RoundingRule::Rupee => {
                value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            }
            RoundingRule::NearestTen => {
                (value / Decimal::TEN)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    * Decimal::TEN
            }
        }
    }
}

/// Returns `value` if positive, otherwise zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
