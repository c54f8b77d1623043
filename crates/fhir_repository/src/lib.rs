//! FHIR Repository - client facade over a remote resource store
//!
//! This crate defines the interface the claim operation consumes
//! (`FhirRepository`: search, read by reference, submit transaction)
//! and an HTTP implementation of it. Repositories are addressed by a
//! short code through `RepositoryRegistry`, so the operation never
//! handles base URLs directly.
//!
//! Search results come back as a request-scoped `SearchOutcome`
//! working set owned by the caller; there is no cache shared between
//! requests or between steps of one request.

pub mod error;
pub mod http;
pub mod ports;
pub mod query;

pub use error::RepositoryError;
pub use http::{HttpFhirRepository, RepositoryRegistry, RepositorySettings};
pub use ports::{FhirRepository, SearchOutcome};
pub use query::SearchQuery;
