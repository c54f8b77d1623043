//! Claim operation errors

use thiserror::Error;

use fhir_repository::RepositoryError;

use crate::report::ReportError;

/// Unrecoverable failures of the claim operation
///
/// These are collaborator contract violations or infrastructure
/// failures, not business outcomes: they propagate upward uncaught
/// and map to a 500-class response at the transport boundary.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Report(#[from] ReportError),

    /// The claim transaction response did not contain the group task
    #[error("No group task found in the claim transaction response bundle")]
    GroupTaskMissing,

    /// The repository returned a resource without a field the
    /// operation depends on
    #[error("Repository returned a resource missing {0}")]
    IncompleteResource(&'static str),
}
