//! HTTP API module for the Tax Computation Engine.
//!
//! This module provides the REST API endpoints for computing tax under one
//! regime and for comparing both regimes.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CompareRequest, ComputeRequest};
pub use response::{ApiError, CompareResponse, ComputeResponse, ENGINE_VERSION};
pub use state::AppState;
