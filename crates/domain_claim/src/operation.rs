//! Claim orchestration
//!
//! Drives one claim request end to end. Every step's output gates the
//! next; there is no parallelism inside a request and no state shared
//! with other in-flight requests. The ownership transfer itself is
//! two repository transactions: cancel the previous placer's tasks,
//! then recreate them under the new owner. Each transaction is atomic
//! on its own; the pair is not atomic together, so a failure between
//! them leaves the tasks cancelled with no successor.

use std::sync::Arc;

use uuid::Uuid;

use fhir_model::{
    Bundle, BundleEntry, BundleRequest, CodeableConcept, HttpVerb, Identifier, Organization,
    Parameters, Reference, Resource, ResourceType, Task, TaskStatus,
};
use fhir_repository::{FhirRepository, SearchQuery};

use crate::error::ClaimError;
use crate::outcome::{ClaimDisposition, ClaimResponse};
use crate::request::ClaimRequest;

/// Statuses ownership transfer is permitted from
///
/// See the Task state machine: https://hl7.org/fhir/R4/task.html#statemachine
const CLAIMABLE_STATUSES: [TaskStatus; 5] = [
    TaskStatus::Ready,
    TaskStatus::Requested,
    TaskStatus::Received,
    TaskStatus::Accepted,
    TaskStatus::Rejected,
];

/// Externally supplied configuration the operation consumes
#[derive(Debug, Clone)]
pub struct ClaimSettings {
    /// Tag system marking the group task within a requisition's set
    pub group_tag_system: String,
    /// Tag code marking the group task
    pub group_tag_code: String,
}

/// The `$claim` operation
pub struct ClaimOperation {
    repository: Arc<dyn FhirRepository>,
    settings: ClaimSettings,
}

impl ClaimOperation {
    pub fn new(repository: Arc<dyn FhirRepository>, settings: ClaimSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Processes one claim request from Parameters to response
    ///
    /// Business failures (validation, not-found) come back as
    /// responses; collaborator contract violations and repository
    /// failures come back as `ClaimError`.
    pub async fn process(&self, parameters: &Parameters) -> Result<ClaimResponse, ClaimError> {
        let request = match ClaimRequest::from_parameters(parameters) {
            Ok(request) => request,
            Err(messages) => {
                log_rejection("[unknown]", &messages);
                return Ok(ClaimDisposition::Rejected { messages }.into_response()?);
            }
        };

        log_incoming_request(&request);

        let disposition = self.run(&request).await?;
        Ok(disposition.into_response()?)
    }

    async fn run(&self, request: &ClaimRequest) -> Result<ClaimDisposition, ClaimError> {
        let requisition = request.requisition.value.as_deref().unwrap_or_default();

        let organization = match self.resolve_organization(&request.organization).await? {
            Some(organization) => organization,
            None => {
                tracing::info!(
                    requisition,
                    "Claim failed as no claimant Organization resource was found"
                );
                return Ok(ClaimDisposition::OrganizationNotFound);
            }
        };
        let organization_id = organization
            .id
            .clone()
            .ok_or(ClaimError::IncompleteResource("Organization.id"))?;
        let organization_name = organization.name.clone().unwrap_or_default();
        tracing::info!(
            requisition,
            %organization_id,
            %organization_name,
            "Found claimant organization"
        );

        let tasks = match self.fetch_request_tasks(&request.requisition).await? {
            Some(tasks) => tasks,
            None => {
                tracing::info!(
                    requisition,
                    identifier = %request.requisition.as_token(),
                    "Claim failed as no Task resources were found for the requisition identifier"
                );
                return Ok(ClaimDisposition::RequisitionNotFound);
            }
        };
        tracing::info!(requisition, count = tasks.len(), "Found request Task resources");

        if let Err(messages) = validate_claimable(&tasks) {
            log_rejection(requisition, &messages);
            return Ok(ClaimDisposition::Rejected { messages });
        }
        tracing::info!(requisition, "Request is claimable");

        let group_task = match self.find_group_task(&tasks) {
            Ok(task) => task,
            Err(message) => {
                let messages = vec![message];
                log_rejection(requisition, &messages);
                return Ok(ClaimDisposition::Rejected { messages });
            }
        };
        tracing::info!(
            requisition,
            group_task_id = group_task.id.as_deref().unwrap_or_default(),
            "Found group Task resource"
        );

        let cancel_bundle = build_cancel_bundle(&tasks)?;
        self.repository.transaction(cancel_bundle).await?;
        tracing::info!(requisition, "Previous placer's Tasks cancelled");

        let claim_bundle = build_claim_bundle(&tasks, &organization_id, &organization_name);
        let response_bundle = self.repository.transaction(claim_bundle).await?;

        let new_group_task_id = self.find_group_task_id(&response_bundle)?;
        tracing::info!(requisition, %new_group_task_id, "Request claimed successfully");

        Ok(ClaimDisposition::Claimed {
            group_task_id: new_group_task_id,
        })
    }

    /// Resolves the claimant organization
    ///
    /// A literal reference is read directly; otherwise the identifier
    /// is searched and the first match taken. The search path does not
    /// enforce a unique match, unlike the group-task rule.
    async fn resolve_organization(
        &self,
        reference: &Reference,
    ) -> Result<Option<Organization>, ClaimError> {
        if reference.has_literal() {
            let resource = self.repository.read(reference).await?;
            return Ok(resource.and_then(Resource::into_organization));
        }

        let identifier = match reference.identifier.as_ref() {
            Some(identifier) => identifier,
            None => return Ok(None),
        };
        let query = SearchQuery::new().add("identifier", identifier.as_token());
        let outcome = self
            .repository
            .search(ResourceType::Organization, &query)
            .await?;
        Ok(outcome.organizations().into_iter().next())
    }

    /// Fetches the requisition's non-cancelled tasks
    async fn fetch_request_tasks(
        &self,
        requisition: &Identifier,
    ) -> Result<Option<Vec<Task>>, ClaimError> {
        let query = SearchQuery::new()
            .add("group-identifier", requisition.as_token())
            .add("status:not", TaskStatus::Cancelled.as_code());

        let outcome = self.repository.search(ResourceType::Task, &query).await?;
        if outcome.total == 0 {
            return Ok(None);
        }
        Ok(Some(outcome.tasks()))
    }

    /// The one task carrying the configured group tag
    fn find_group_task<'a>(&self, tasks: &'a [Task]) -> Result<&'a Task, String> {
        let mut tagged = tasks
            .iter()
            .filter(|task| task.has_tag(&self.settings.group_tag_system, &self.settings.group_tag_code));

        match (tagged.next(), tagged.next()) {
            (Some(task), None) => Ok(task),
            (first, _) => {
                let found = if first.is_some() {
                    2 + tagged.count()
                } else {
                    0
                };
                Err(format!(
                    "The request can not be claimed as none, or many, group Task resources were \
                     found for the request. Group Task resources found: {found}"
                ))
            }
        }
    }

    /// The group task's newly assigned id in the claim response
    ///
    /// The repository contract guarantees the created group task comes
    /// back; its absence is fatal, not a user-facing failure.
    fn find_group_task_id(&self, bundle: &Bundle) -> Result<String, ClaimError> {
        bundle
            .resources()
            .filter_map(Resource::as_task)
            .find(|task| {
                task.has_tag(&self.settings.group_tag_system, &self.settings.group_tag_code)
            })
            .and_then(|task| task.id.clone())
            .ok_or(ClaimError::GroupTaskMissing)
    }
}

/// Checks every task is in a claimable state
///
/// Any violation aborts the whole operation; there is no partial
/// claim.
fn validate_claimable(tasks: &[Task]) -> Result<(), Vec<String>> {
    for task in tasks {
        let status = match task.status {
            Some(status) => status,
            None => {
                return Err(vec![
                    "A request task status was found to be empty; every Task resource must have \
                     a status defined"
                        .to_string(),
                ])
            }
        };
        if !CLAIMABLE_STATUSES.contains(&status) {
            return Err(vec![format!(
                "Task {} status is assigned {} which can not be claimed",
                task.id.as_deref().unwrap_or("[no id]"),
                status.as_code()
            )]);
        }
    }
    Ok(())
}

/// The cancellation transaction: conditional updates flipping every
/// task to cancelled with business status "Claimed"
fn build_cancel_bundle(tasks: &[Task]) -> Result<Bundle, ClaimError> {
    let mut bundle = Bundle::transaction();
    for task in tasks {
        let id = task
            .id
            .as_deref()
            .ok_or(ClaimError::IncompleteResource("Task.id"))?;
        let version_id = task
            .version_id()
            .ok_or(ClaimError::IncompleteResource("Task.meta.versionId"))?;

        let mut cancelled = task.clone();
        cancelled.status = Some(TaskStatus::Cancelled);
        cancelled.business_status = Some(CodeableConcept::text("Claimed"));

        bundle.entry.push(BundleEntry {
            full_url: None,
            resource: Some(Resource::Task(cancelled)),
            request: Some(BundleRequest {
                method: HttpVerb::Put,
                url: format!("{}/{id}", ResourceType::Task),
                if_match: Some(format!("W/\"{version_id}\"")),
            }),
        });
    }
    Ok(bundle)
}

/// The claim transaction: creates of every task under the new owner
fn build_claim_bundle(tasks: &[Task], organization_id: &str, organization_name: &str) -> Bundle {
    let mut bundle = Bundle::transaction();
    for task in tasks {
        let mut claimed = task.clone();
        claimed.id = None;
        claimed.business_status = None;
        claimed.status = Some(TaskStatus::Requested);
        claimed.owner = Some(Reference::literal(
            format!("{}/{organization_id}", ResourceType::Organization),
            organization_name,
        ));

        bundle.entry.push(BundleEntry {
            full_url: Some(format!("urn:uuid:{}", Uuid::new_v4())),
            resource: Some(Resource::Task(claimed)),
            request: Some(BundleRequest {
                method: HttpVerb::Post,
                url: ResourceType::Task.to_string(),
                if_match: None,
            }),
        });
    }
    bundle
}

fn log_incoming_request(request: &ClaimRequest) {
    let requisition = request.requisition.value.as_deref().unwrap_or_default();
    if let Some(reference) = request.organization.reference.as_deref() {
        tracing::info!(
            requisition,
            organization = reference,
            identifier = %request.requisition.as_token(),
            "Organization claim for requisition"
        );
        return;
    }
    let organization = request
        .organization
        .identifier
        .as_ref()
        .map(Identifier::as_token)
        .unwrap_or_default();
    tracing::info!(
        requisition,
        %organization,
        identifier = %request.requisition.as_token(),
        "Organization claim for requisition"
    );
}

fn log_rejection(requisition: &str, messages: &[String]) {
    for message in messages {
        tracing::info!(requisition, %message, "Claim rejected");
    }
}
