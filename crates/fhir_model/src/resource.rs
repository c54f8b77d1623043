//! Resource envelope
//!
//! FHIR JSON tags every resource with a `resourceType` discriminator;
//! this enum mirrors that on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bundle::Bundle;
use crate::operation_outcome::OperationOutcome;
use crate::organization::Organization;
use crate::parameters::Parameters;
use crate::task::Task;

/// Resource type names as they appear in references and URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Task,
    Organization,
    Parameters,
    Bundle,
    OperationOutcome,
    ServiceRequest,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceType::Task => "Task",
            ResourceType::Organization => "Organization",
            ResourceType::Parameters => "Parameters",
            ResourceType::Bundle => "Bundle",
            ResourceType::OperationOutcome => "OperationOutcome",
            ResourceType::ServiceRequest => "ServiceRequest",
        };
        f.write_str(name)
    }
}

/// Any resource this service reads or writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Task(Task),
    Organization(Organization),
    Parameters(Parameters),
    Bundle(Bundle),
    OperationOutcome(OperationOutcome),
}

impl Resource {
    /// The task inside, if this is a Task resource
    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Resource::Task(task) => Some(task),
            _ => None,
        }
    }

    /// Consumes the envelope, yielding the task if this is one
    pub fn into_task(self) -> Option<Task> {
        match self {
            Resource::Task(task) => Some(task),
            _ => None,
        }
    }

    /// Consumes the envelope, yielding the organization if this is one
    pub fn into_organization(self) -> Option<Organization> {
        match self {
            Resource::Organization(organization) => Some(organization),
            _ => None,
        }
    }
}

impl From<Task> for Resource {
    fn from(task: Task) -> Self {
        Resource::Task(task)
    }
}

impl From<Organization> for Resource {
    fn from(organization: Organization) -> Self {
        Resource::Organization(organization)
    }
}

impl From<Parameters> for Resource {
    fn from(parameters: Parameters) -> Self {
        Resource::Parameters(parameters)
    }
}

impl From<OperationOutcome> for Resource {
    fn from(outcome: OperationOutcome) -> Self {
        Resource::OperationOutcome(outcome)
    }
}
