//! Repository port consumed by the claim operation

use async_trait::async_trait;

use fhir_model::{Organization, Reference, Resource, ResourceType, Task};

use crate::error::RepositoryError;
use crate::query::SearchQuery;

/// The working set produced by one search call
///
/// Owned by the request that issued the search; nothing here is shared
/// with other in-flight requests, so there is no cache to clear
/// between steps.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// The repository's match count for the query
    pub total: u32,
    /// The matched resources, in repository order
    pub resources: Vec<Resource>,
}

impl SearchOutcome {
    /// The matched Task resources
    pub fn tasks(self) -> Vec<Task> {
        self.resources
            .into_iter()
            .filter_map(Resource::into_task)
            .collect()
    }

    /// The matched Organization resources
    pub fn organizations(self) -> Vec<Organization> {
        self.resources
            .into_iter()
            .filter_map(Resource::into_organization)
            .collect()
    }
}

/// Search, read, and transaction operations against a resource store
///
/// All calls are non-blocking at the boundary and may suspend the
/// task while awaiting I/O. Transactions are applied atomically by
/// the repository: the whole bundle commits or none of it does.
#[async_trait]
pub trait FhirRepository: Send + Sync {
    /// Searches for resources of one type matching the query
    async fn search(
        &self,
        resource_type: ResourceType,
        query: &SearchQuery,
    ) -> Result<SearchOutcome, RepositoryError>;

    /// Reads the resource a literal reference points at
    ///
    /// Absence is a `None`, not an error: a missing resource is an
    /// expected outcome for the callers of this port.
    async fn read(&self, reference: &Reference) -> Result<Option<Resource>, RepositoryError>;

    /// Submits a transaction bundle and returns the response bundle,
    /// with ids and version tags assigned on created entries
    async fn transaction(
        &self,
        bundle: fhir_model::Bundle,
    ) -> Result<fhir_model::Bundle, RepositoryError>;
}
