//! Regime tags and the tie-break rule used when both regimes cost the same.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two mutually exclusive rule sets for computing tax.
///
/// # Example
///
/// ```
/// use tax_engine::models::Regime;
///
/// assert_eq!(Regime::New.to_string(), "new");
/// assert_eq!(Regime::New.other(), Regime::Old);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// The older regime honouring most deductions and exemptions.
    Old,
    /// The simplified regime with lower rates and few deductions.
    New,
}

impl Regime {
    /// Both regimes, in a fixed order.
    pub const ALL: [Regime; 2] = [Regime::Old, Regime::New];

    /// Returns the lowercase tag used in configuration and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Old => "old",
            Regime::New => "new",
        }
    }

    /// Returns the opposite regime.
    pub fn other(&self) -> Regime {
        match self {
            Regime::Old => Regime::New,
            Regime::New => Regime::Old,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which regime to recommend when both produce the same total tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Recommend the new regime (simpler compliance).
    #[default]
    PreferNew,
    /// Recommend the old regime.
    PreferOld,
}

impl TieBreak {
    /// The regime this rule favours on a tie.
    pub fn preferred(&self) -> Regime {
        match self {
            TieBreak::PreferNew => Regime::New,
            TieBreak::PreferOld => Regime::Old,
        }
    }
}
