//! HTTP request handlers for the Tax Computation Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{compare_regimes, compute_tax};
use crate::error::EngineError;

use super::request::{CompareRequest, ComputeRequest};
use super::response::{
    ApiError, ApiErrorResponse, CompareResponse, ComputeResponse, ENGINE_VERSION,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/compute", post(compute_handler))
        .route("/compare", post(compare_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(err: EngineError) -> Response {
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

/// Maps a body that could not be deserialized to a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the failure
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /compute endpoint.
///
/// Computes tax for one employee under the requested regime.
async fn compute_handler(
    State(state): State<AppState>,
    payload: Result<Json<ComputeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing compute request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let tax_year = match state.tax_year(&request.input.tax_year) {
        Ok(tax_year) => tax_year,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                tax_year = %request.input.tax_year,
                "Tax year not found"
            );
            return error_response(err);
        }
    };

    let start_time = Instant::now();
    match compute_tax(&request.input, tax_year, request.regime) {
        Ok(result) => {
            let duration = start_time.elapsed();
            info!(
                correlation_id = %correlation_id,
                employee_id = %result.employee_id,
                regime = %result.regime,
                total_tax = %result.total_tax,
                warnings = result.audit_trace.warnings.len(),
                duration_us = duration.as_micros(),
                "Computation completed successfully"
            );
            json_response(
                StatusCode::OK,
                ComputeResponse {
                    calculation_id: correlation_id,
                    timestamp: Utc::now(),
                    engine_version: ENGINE_VERSION.to_string(),
                    config_version: state.config_version().to_string(),
                    result,
                },
            )
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Computation failed"
            );
            error_response(err)
        }
    }
}

/// Handler for POST /compare endpoint.
///
/// Computes tax under both regimes and recommends the cheaper one.
async fn compare_handler(
    State(state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing compare request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let tax_year = match state.tax_year(&request.input.tax_year) {
        Ok(tax_year) => tax_year,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                tax_year = %request.input.tax_year,
                "Tax year not found"
            );
            return error_response(err);
        }
    };

    let start_time = Instant::now();
    match compare_regimes(&request.input, tax_year, request.tie_break) {
        Ok(comparison) => {
            let duration = start_time.elapsed();
            info!(
                correlation_id = %correlation_id,
                employee_id = %request.input.profile.employee_id,
                recommended = %comparison.recommended,
                savings = %comparison.savings,
                duration_us = duration.as_micros(),
                "Comparison completed successfully"
            );
            json_response(
                StatusCode::OK,
                CompareResponse {
                    calculation_id: correlation_id,
                    timestamp: Utc::now(),
                    engine_version: ENGINE_VERSION.to_string(),
                    config_version: state.config_version().to_string(),
                    comparison,
                },
            )
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Comparison failed"
            );
            error_response(err)
        }
    }
}
