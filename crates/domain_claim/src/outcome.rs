//! Outcome mapping
//!
//! Converts the orchestrator's terminal state into one of the four
//! fixed response shapes. Not-found conditions are business outcomes
//! and answer 200 with a machine-readable result code; malformed
//! input is a client error and answers 400 with a diagnostic report.

use fhir_model::{Coding, Parameter, ParameterValue, Parameters, Reference, Resource};

use crate::report::{self, ReportError};

/// Code system the `result` parameter codes are drawn from
pub const CLAIM_RESULT_TYPE_SYSTEM: &str =
    "http://fhir.example.org/CodeSystem/eorder-claim-result-type";

pub(crate) const RESULT_PARAMETER: &str = "result";
pub(crate) const GROUP_TASK_PARAMETER: &str = "groupTask";

/// Terminal state of one claim operation call
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimDisposition {
    /// Ownership transferred; the new group task's assigned id
    Claimed { group_task_id: String },
    /// The claimant organization could not be resolved
    OrganizationNotFound,
    /// No tasks exist for the requisition identifier
    RequisitionNotFound,
    /// The request failed validation
    Rejected { messages: Vec<String> },
}

/// The operation's response payload and HTTP status code
///
/// Constructed once per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimResponse {
    pub resource: Resource,
    pub status: u16,
}

impl ClaimDisposition {
    /// Maps this terminal state to its fixed response shape
    pub fn into_response(self) -> Result<ClaimResponse, ReportError> {
        match self {
            ClaimDisposition::Claimed { group_task_id } => Ok(ClaimResponse {
                resource: success_payload(&group_task_id).into(),
                status: 200,
            }),
            ClaimDisposition::OrganizationNotFound => Ok(ClaimResponse {
                resource: result_payload("organization-not-found").into(),
                status: 200,
            }),
            ClaimDisposition::RequisitionNotFound => Ok(ClaimResponse {
                resource: result_payload("requisition-not-found").into(),
                status: 200,
            }),
            ClaimDisposition::Rejected { messages } => {
                let messages = if messages.is_empty() {
                    // Reaching here with nothing to report is a bug in
                    // the orchestrator; answer with a placeholder
                    // rather than an empty report.
                    tracing::error!(
                        "Rejected claim reached the outcome mapper with zero error messages"
                    );
                    vec!["Unknown error".to_string()]
                } else {
                    messages
                };
                Ok(ClaimResponse {
                    resource: report::error(&messages)?.into(),
                    status: 400,
                })
            }
        }
    }
}

fn result_coding(code: &str) -> ParameterValue {
    ParameterValue::Coding(Coding::new(CLAIM_RESULT_TYPE_SYSTEM, code))
}

fn result_payload(code: &str) -> Parameters {
    Parameters {
        parameter: vec![Parameter::new(RESULT_PARAMETER, result_coding(code))],
    }
}

fn success_payload(group_task_id: &str) -> Parameters {
    Parameters {
        parameter: vec![
            Parameter::new(
                GROUP_TASK_PARAMETER,
                ParameterValue::Reference(Reference::literal(
                    format!("Task/{group_task_id}"),
                    "Group Task",
                )),
            ),
            Parameter::new(RESULT_PARAMETER, result_coding("ok")),
        ],
    }
}
