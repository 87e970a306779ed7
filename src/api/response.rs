//! Response types for the Tax Computation Engine API.
//!
//! This module defines the success envelopes and the error response
//! structures for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{RegimeComparison, TaxComputationResult};

/// Version of this engine, reported on every response.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Envelope for a `/compute` response.
///
/// Identifiers and timestamps live here, outside the result, so the result
/// itself stays a pure function of the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeResponse {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The engine version.
    pub engine_version: String,
    /// Version of the rule configuration used.
    pub config_version: String,
    /// The computation result.
    pub result: TaxComputationResult,
}

/// Envelope for a `/compare` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResponse {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The engine version.
    pub engine_version: String,
    /// Version of the rule configuration used.
    pub config_version: String,
    /// Both results and the recommendation.
    pub comparison: RegimeComparison,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl ApiErrorResponse {
    fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    fn internal(error: ApiError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { path } => Self::internal(ApiError::with_details(
                "CONFIG_ERROR",
                "Configuration error",
                format!("Configuration file not found: {}", path),
            )),
            EngineError::ConfigParseError { path, message } => {
                Self::internal(ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ))
            }
            EngineError::InvalidConfig { .. } => Self::internal(ApiError::with_details(
                "CONFIG_ERROR",
                "Invalid configuration",
                message,
            )),
            EngineError::TaxYearNotFound { tax_year } => Self::bad_request(ApiError::with_details(
                "TAX_YEAR_NOT_FOUND",
                message,
                format!("No regime configuration is loaded for tax year '{}'", tax_year),
            )),
            EngineError::InvalidExpression { .. }
            | EngineError::UnknownReference { .. }
            | EngineError::DivisionByZero { .. } => Self::bad_request(ApiError::with_details(
                "INVALID_FORMULA",
                message,
                "A salary component formula could not be evaluated",
            )),
            EngineError::CyclicDependency { .. } => Self::bad_request(ApiError::with_details(
                "CYCLIC_DEPENDENCY",
                message,
                "Salary component formulas must not reference each other in a cycle",
            )),
            EngineError::UnknownComponent { code } => Self::bad_request(ApiError::with_details(
                "UNKNOWN_COMPONENT",
                message,
                format!("The component code '{}' is not in the catalogue", code),
            )),
            EngineError::InvalidInput { field, .. } => Self::bad_request(ApiError::with_details(
                "VALIDATION_ERROR",
                message,
                format!("Field '{}' failed validation", field),
            )),
            EngineError::CalculationError { message } => Self::internal(
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
        }
    }
}
