//! Request types for the Tax Computation Engine API.
//!
//! This module defines the JSON request structures for the `/compute` and
//! `/compare` endpoints.

use serde::{Deserialize, Serialize};

use crate::models::{Regime, TaxComputationInput, TieBreak};

/// Request body for the `/compute` endpoint.
///
/// Carries the complete computation snapshot and the regime to compute under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeRequest {
    /// The regime to compute under.
    pub regime: Regime,
    /// The computation input.
    pub input: TaxComputationInput,
}

/// Request body for the `/compare` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    /// The computation input, run under both regimes.
    pub input: TaxComputationInput,
    /// Overrides the tax year's tie-break rule.
    #[serde(default)]
    pub tie_break: Option<TieBreak>,
}
