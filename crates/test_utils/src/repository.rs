//! In-memory repository fake
//!
//! Behaves like a small FHIR store for the search/read/transaction
//! surface the claim operation uses, and records every transaction
//! bundle submitted so tests can assert on what was (or was not)
//! written.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use fhir_model::{
    Bundle, BundleEntry, BundleType, HttpVerb, Meta, Organization, Reference, Resource,
    ResourceType, Task,
};
use fhir_repository::{FhirRepository, RepositoryError, SearchOutcome, SearchQuery};

/// A scripted repository holding fixed organizations and tasks
#[derive(Default)]
pub struct InMemoryRepository {
    organizations: Vec<Organization>,
    tasks: Vec<Task>,
    transactions: Mutex<Vec<Bundle>>,
    searches: Mutex<Vec<(ResourceType, SearchQuery)>>,
    fail_next_transaction: AtomicBool,
    next_id: AtomicU32,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an organization
    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organizations.push(organization);
        self
    }

    /// Seeds a task
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Seeds several tasks
    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Makes the next transaction fail with a version conflict
    pub fn fail_next_transaction(&self) {
        self.fail_next_transaction.store(true, Ordering::SeqCst);
    }

    /// The transaction bundles submitted so far, in order
    pub fn submitted_transactions(&self) -> Vec<Bundle> {
        self.transactions
            .lock()
            .expect("transaction log poisoned")
            .clone()
    }

    /// The searches issued so far, in order
    pub fn recorded_searches(&self) -> Vec<(ResourceType, SearchQuery)> {
        self.searches.lock().expect("search log poisoned").clone()
    }

    fn search_tasks(&self, query: &SearchQuery) -> Vec<Task> {
        let group_token = query.get("group-identifier");
        let excluded_status = query.get("status:not");

        self.tasks
            .iter()
            .filter(|task| {
                group_token
                    .map(|token| {
                        task.group_identifier
                            .as_ref()
                            .is_some_and(|id| id.as_token() == token)
                    })
                    .unwrap_or(true)
            })
            .filter(|task| {
                excluded_status
                    .map(|code| {
                        task.status
                            .map(|status| status.as_code() != code)
                            .unwrap_or(true)
                    })
                    .unwrap_or(true)
            })
            .cloned()
            .collect()
    }

    fn search_organizations(&self, query: &SearchQuery) -> Vec<Organization> {
        let token = query.get("identifier");
        self.organizations
            .iter()
            .filter(|organization| {
                token
                    .map(|token| {
                        organization
                            .identifier
                            .iter()
                            .any(|id| id.as_token() == token)
                    })
                    .unwrap_or(true)
            })
            .cloned()
            .collect()
    }

    /// Echoes a transaction back the way a FHIR server would: created
    /// entries get fresh ids and version tags, updated entries keep
    /// their resource as submitted.
    fn transaction_response(&self, bundle: &Bundle) -> Bundle {
        let entry = bundle
            .entry
            .iter()
            .map(|entry| {
                let resource = entry.resource.clone().map(|resource| {
                    let created = entry
                        .request
                        .as_ref()
                        .is_some_and(|request| request.method == HttpVerb::Post);
                    match resource {
                        Resource::Task(mut task) if created => {
                            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                            task.id = Some(format!("created-{id}"));
                            let meta = task.meta.get_or_insert_with(Meta::default);
                            meta.version_id = Some("1".to_string());
                            Resource::Task(task)
                        }
                        other => other,
                    }
                });
                BundleEntry {
                    full_url: None,
                    resource,
                    request: None,
                }
            })
            .collect();

        Bundle {
            bundle_type: BundleType::TransactionResponse,
            timestamp: None,
            total: None,
            entry,
        }
    }
}

#[async_trait]
impl FhirRepository for InMemoryRepository {
    async fn search(
        &self,
        resource_type: ResourceType,
        query: &SearchQuery,
    ) -> Result<SearchOutcome, RepositoryError> {
        self.searches
            .lock()
            .expect("search log poisoned")
            .push((resource_type, query.clone()));

        let resources: Vec<Resource> = match resource_type {
            ResourceType::Task => self.search_tasks(query).into_iter().map(Into::into).collect(),
            ResourceType::Organization => self
                .search_organizations(query)
                .into_iter()
                .map(Into::into)
                .collect(),
            _ => Vec::new(),
        };
        Ok(SearchOutcome {
            total: resources.len() as u32,
            resources,
        })
    }

    async fn read(&self, reference: &Reference) -> Result<Option<Resource>, RepositoryError> {
        let target = reference.reference.as_deref().unwrap_or_default();

        if let Some(id) = target.strip_prefix("Organization/") {
            return Ok(self
                .organizations
                .iter()
                .find(|organization| organization.id.as_deref() == Some(id))
                .cloned()
                .map(Into::into));
        }
        if let Some(id) = target.strip_prefix("Task/") {
            return Ok(self
                .tasks
                .iter()
                .find(|task| task.id.as_deref() == Some(id))
                .cloned()
                .map(Into::into));
        }
        Ok(None)
    }

    async fn transaction(&self, bundle: Bundle) -> Result<Bundle, RepositoryError> {
        if self.fail_next_transaction.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Conflict {
                url: "in-memory".to_string(),
                status: 409,
            });
        }

        let response = self.transaction_response(&bundle);
        self.transactions
            .lock()
            .expect("transaction log poisoned")
            .push(bundle);
        Ok(response)
    }
}
