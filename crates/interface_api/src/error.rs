//! API error handling
//!
//! Every error surface answers with a FHIR OperationOutcome so
//! clients see one diagnostic shape regardless of which layer failed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use domain_claim::{report, ClaimError};
use fhir_model::{OperationOutcome, Resource};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request")]
    BadRequest(Vec<String>),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, outcome) = match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, report::error(&[message]))
            }
            ApiError::BadRequest(messages) => {
                (StatusCode::BAD_REQUEST, report::error(&messages))
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    report::fatal(&["An unexpected error occurred".to_string()]),
                )
            }
        };
        outcome_response(status, outcome)
    }
}

fn outcome_response(
    status: StatusCode,
    outcome: Result<OperationOutcome, report::ReportError>,
) -> Response {
    match outcome {
        Ok(outcome) => (status, Json(Resource::OperationOutcome(outcome))).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Failed to build an OperationOutcome response");
            status.into_response()
        }
    }
}
