//! Claim operation handler
//!
//! The `$claim` operation is only defined against the ServiceRequest
//! resource type; any other resource/operation pair on the FHIR route
//! answers not-found.

use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use fhir_model::Resource;

use crate::error::ApiError;
use crate::AppState;

const CLAIM_RESOURCE_TYPE: &str = "ServiceRequest";
const CLAIM_OPERATION: &str = "$claim";

/// Placeholder for the repository-wide FHIR endpoint
///
/// Only the typed operation route is served; anything posted here
/// gets pointed at it.
pub async fn capability() -> ApiError {
    ApiError::NotFound(format!(
        "Only the {CLAIM_OPERATION} operation on {CLAIM_RESOURCE_TYPE} is served; \
         use /fhir/{CLAIM_RESOURCE_TYPE}/{CLAIM_OPERATION}"
    ))
}

/// Invokes a FHIR operation by resource type and operation name
pub async fn invoke(
    State(state): State<AppState>,
    Path((resource_type, operation)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    if resource_type != CLAIM_RESOURCE_TYPE || operation != CLAIM_OPERATION {
        return Err(ApiError::NotFound(format!(
            "No {operation} operation is defined for {resource_type}"
        )));
    }

    let Json(body) = body.map_err(|rejection| {
        ApiError::BadRequest(vec![format!(
            "The request body could not be read as JSON: {rejection}"
        )])
    })?;

    let parameters = match serde_json::from_value(body) {
        Ok(Resource::Parameters(parameters)) => parameters,
        Ok(other) => {
            return Err(ApiError::BadRequest(vec![format!(
                "The {CLAIM_OPERATION} operation requires a Parameters resource body, got {other:?}"
            )]))
        }
        Err(err) => {
            return Err(ApiError::BadRequest(vec![format!(
                "The request body is not a valid FHIR resource: {err}"
            )]))
        }
    };

    let response = state.operation.process(&parameters).await?;
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    Ok((status, Json(response.resource)).into_response())
}
