//! Domain Claim - the claim operation core
//!
//! Implements the `$claim` operation: claiming a requisition's group
//! of outstanding Task resources on behalf of a filler organization.
//!
//! The flow is a straight line per request: validate the incoming
//! Parameters, resolve the claimant organization, fetch the
//! requisition's tasks, check every task is in a claimable state,
//! identify the group task, cancel the previous placer's tasks, then
//! recreate them under the new owner. Terminal results map to fixed
//! response shapes:
//! - success and the two not-found conditions answer 200 with a
//!   `result` code (absence is a business outcome, not an error)
//! - malformed input answers 400 with an itemized OperationOutcome

pub mod error;
pub mod operation;
pub mod outcome;
pub mod report;
pub mod request;

pub use error::ClaimError;
pub use operation::{ClaimOperation, ClaimSettings};
pub use outcome::{ClaimDisposition, ClaimResponse};
pub use request::ClaimRequest;
