//! Test data builders
//!
//! Builders with sensible defaults so tests only spell out the fields
//! they care about.

use fhir_model::{
    Coding, Identifier, Meta, Organization, Parameter, ParameterValue, Parameters, Reference, Task,
    TaskStatus,
};

/// Group task tag system used across the test suite
pub const GROUP_TAG_SYSTEM: &str = "http://fhir.example.org/CodeSystem/task-tag";
/// Group task tag code used across the test suite
pub const GROUP_TAG_CODE: &str = "group-task";

/// Builder for Task resources
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    /// A Ready task at version 1 with the given id
    pub fn new(id: &str) -> Self {
        Self {
            task: Task {
                id: Some(id.to_string()),
                meta: Some(Meta {
                    version_id: Some("1".to_string()),
                    tag: Vec::new(),
                }),
                status: Some(TaskStatus::Ready),
                intent: Some("order".to_string()),
                business_status: None,
                group_identifier: None,
                owner: None,
            },
        }
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.task.status = Some(status);
        self
    }

    /// Clears the status entirely, as a misbehaving repository might
    pub fn no_status(mut self) -> Self {
        self.task.status = None;
        self
    }

    pub fn version(mut self, version_id: &str) -> Self {
        if let Some(meta) = self.task.meta.as_mut() {
            meta.version_id = Some(version_id.to_string());
        }
        self
    }

    pub fn tag(mut self, system: &str, code: &str) -> Self {
        if let Some(meta) = self.task.meta.as_mut() {
            meta.tag.push(Coding::new(system, code));
        }
        self
    }

    /// Marks this task as the requisition's group task
    pub fn group_tag(self) -> Self {
        self.tag(GROUP_TAG_SYSTEM, GROUP_TAG_CODE)
    }

    pub fn group_identifier(mut self, system: &str, value: &str) -> Self {
        self.task.group_identifier = Some(Identifier::new(system, value));
        self
    }

    pub fn owner(mut self, reference: &str) -> Self {
        self.task.owner = Some(Reference {
            reference: Some(reference.to_string()),
            ..Default::default()
        });
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// An organization with an id, a name, and one business identifier
pub fn organization(id: &str, name: &str) -> Organization {
    Organization {
        id: Some(id.to_string()),
        meta: None,
        identifier: vec![Identifier::new("urn:org", name)],
        name: Some(name.to_string()),
    }
}

/// A literal reference to `Organization/{id}`
pub fn organization_reference(id: &str) -> Reference {
    Reference {
        reference: Some(format!("Organization/{id}")),
        ..Default::default()
    }
}

/// A logical reference carrying an organization identifier
pub fn organization_identifier_reference(system: &str, value: &str) -> Reference {
    Reference {
        identifier: Some(Identifier::new(system, value)),
        ..Default::default()
    }
}

/// A well-formed claim Parameters resource
pub fn claim_parameters(
    requisition_system: &str,
    requisition_value: &str,
    organization: Reference,
) -> Parameters {
    Parameters {
        parameter: vec![
            Parameter::new(
                "requisition",
                ParameterValue::Identifier(Identifier::new(requisition_system, requisition_value)),
            ),
            Parameter::new("organization", ParameterValue::Reference(organization)),
        ],
    }
}
