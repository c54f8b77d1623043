//! Test Utilities
//!
//! Shared helpers for the claim service test suite: builders for the
//! FHIR resources the tests exercise, and an in-memory
//! `FhirRepository` fake that records every transaction submitted to
//! it.

pub mod builders;
pub mod repository;

pub use builders::{
    claim_parameters, organization, organization_identifier_reference, organization_reference,
    TaskBuilder, GROUP_TAG_CODE, GROUP_TAG_SYSTEM,
};
pub use repository::InMemoryRepository;
