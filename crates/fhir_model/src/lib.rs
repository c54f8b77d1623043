//! FHIR Model - Typed subset of FHIR R4 resources
//!
//! This crate provides the resource and datatype subset the claim
//! operation works with:
//! - Common datatypes (Identifier, Coding, Reference, Meta, Narrative)
//! - Task and Organization resources
//! - Parameters for operation input and output
//! - Bundle for transactions and search results
//! - OperationOutcome for diagnostic reporting
//!
//! All types serialize to and from FHIR JSON via serde.

pub mod bundle;
pub mod datatypes;
pub mod operation_outcome;
pub mod organization;
pub mod parameters;
pub mod resource;
pub mod task;

pub use bundle::{Bundle, BundleEntry, BundleRequest, BundleType, HttpVerb};
pub use datatypes::{CodeableConcept, Coding, Identifier, Meta, Narrative, NarrativeStatus, Reference};
pub use operation_outcome::{Issue, IssueSeverity, IssueType, OperationOutcome};
pub use organization::Organization;
pub use parameters::{Parameter, ParameterValue, Parameters};
pub use resource::{Resource, ResourceType};
pub use task::{Task, TaskStatus};
