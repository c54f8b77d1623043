//! End-to-end tests for the claim operation against an in-memory repository

use std::sync::Arc;

use domain_claim::{ClaimError, ClaimOperation, ClaimResponse, ClaimSettings};
use fhir_model::{
    HttpVerb, OperationOutcome, ParameterValue, Parameters, Resource, ResourceType, TaskStatus,
};
use fhir_repository::RepositoryError;
use test_utils::{
    claim_parameters, organization, organization_identifier_reference, organization_reference,
    InMemoryRepository, TaskBuilder, GROUP_TAG_CODE, GROUP_TAG_SYSTEM,
};

fn settings() -> ClaimSettings {
    ClaimSettings {
        group_tag_system: GROUP_TAG_SYSTEM.to_string(),
        group_tag_code: GROUP_TAG_CODE.to_string(),
    }
}

fn operation(repository: &Arc<InMemoryRepository>) -> ClaimOperation {
    ClaimOperation::new(repository.clone(), settings())
}

/// A repository seeded with Organization/42 and the requisition
/// urn:req|R1: one group task and one member task, both Ready.
fn seeded_repository() -> Arc<InMemoryRepository> {
    Arc::new(
        InMemoryRepository::new()
            .with_organization(organization("42", "Acme Pathology"))
            .with_tasks([
                TaskBuilder::new("t-group")
                    .group_tag()
                    .group_identifier("urn:req", "R1")
                    .build(),
                TaskBuilder::new("t-member")
                    .group_identifier("urn:req", "R1")
                    .build(),
            ]),
    )
}

fn payload_parameters(response: &ClaimResponse) -> &Parameters {
    match &response.resource {
        Resource::Parameters(parameters) => parameters,
        other => panic!("expected Parameters payload, got {other:?}"),
    }
}

fn payload_outcome(response: &ClaimResponse) -> &OperationOutcome {
    match &response.resource {
        Resource::OperationOutcome(outcome) => outcome,
        other => panic!("expected OperationOutcome payload, got {other:?}"),
    }
}

fn result_code(parameters: &Parameters) -> String {
    parameters
        .named("result")
        .next()
        .and_then(|p| match &p.value {
            Some(ParameterValue::Coding(coding)) => coding.code.clone(),
            _ => None,
        })
        .expect("result parameter with a coding")
}

fn outcome_messages(outcome: &OperationOutcome) -> Vec<String> {
    outcome
        .issue
        .iter()
        .filter_map(|issue| issue.details.as_ref())
        .filter_map(|details| details.text.clone())
        .collect()
}

// ============================================================================
// Scenario A: successful claim
// ============================================================================

#[tokio::test]
async fn claims_a_two_task_requisition_end_to_end() {
    let repository = seeded_repository();
    let response = operation(&repository)
        .process(&claim_parameters("urn:req", "R1", organization_reference("42")))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    let payload = payload_parameters(&response);
    assert_eq!(result_code(payload), "ok");

    let transactions = repository.submitted_transactions();
    assert_eq!(transactions.len(), 2);

    // First transaction: both tasks cancelled via conditional updates.
    let cancel = &transactions[0];
    assert_eq!(cancel.entry.len(), 2);
    for entry in &cancel.entry {
        let request = entry.request.as_ref().unwrap();
        assert_eq!(request.method, HttpVerb::Put);
        assert!(request.if_match.as_deref().unwrap().starts_with("W/\""));
        let task = entry.resource.as_ref().unwrap().as_task().unwrap();
        assert_eq!(task.status, Some(TaskStatus::Cancelled));
        assert_eq!(
            task.business_status.as_ref().unwrap().text.as_deref(),
            Some("Claimed")
        );
    }

    // Second transaction: both tasks recreated under the new owner.
    let claim = &transactions[1];
    assert_eq!(claim.entry.len(), 2);
    for entry in &claim.entry {
        let request = entry.request.as_ref().unwrap();
        assert_eq!(request.method, HttpVerb::Post);
        assert_eq!(request.url, "Task");
        let task = entry.resource.as_ref().unwrap().as_task().unwrap();
        assert!(task.id.is_none());
        assert_eq!(task.status, Some(TaskStatus::Requested));
        let owner = task.owner.as_ref().unwrap();
        assert_eq!(owner.reference.as_deref(), Some("Organization/42"));
        assert_eq!(owner.display.as_deref(), Some("Acme Pathology"));
    }

    // The payload references the group task's newly assigned id.
    let group_reference = payload
        .named("groupTask")
        .next()
        .and_then(|p| match &p.value {
            Some(ParameterValue::Reference(reference)) => reference.reference.clone(),
            _ => None,
        })
        .expect("groupTask reference");
    assert!(group_reference.starts_with("Task/created-"));
}

#[tokio::test]
async fn resolves_the_organization_by_identifier_search() {
    let repository = Arc::new(
        InMemoryRepository::new()
            .with_organization(organization("42", "Acme Pathology"))
            .with_tasks([
                TaskBuilder::new("t-group")
                    .group_tag()
                    .group_identifier("urn:req", "R1")
                    .build(),
            ]),
    );

    let response = operation(&repository)
        .process(&claim_parameters(
            "urn:req",
            "R1",
            organization_identifier_reference("urn:org", "Acme Pathology"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(result_code(payload_parameters(&response)), "ok");
}

// ============================================================================
// Scenario B: organization not found
// ============================================================================

#[tokio::test]
async fn answers_organization_not_found_before_searching_tasks() {
    let repository = Arc::new(InMemoryRepository::new().with_tasks([
        TaskBuilder::new("t-group")
            .group_tag()
            .group_identifier("urn:req", "R1")
            .build(),
    ]));

    let response = operation(&repository)
        .process(&claim_parameters("urn:req", "R1", organization_reference("42")))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(
        result_code(payload_parameters(&response)),
        "organization-not-found"
    );

    // No Task search was performed and nothing was written.
    assert!(repository
        .recorded_searches()
        .iter()
        .all(|(resource_type, _)| *resource_type != ResourceType::Task));
    assert!(repository.submitted_transactions().is_empty());
}

// ============================================================================
// Scenario C: requisition not found
// ============================================================================

#[tokio::test]
async fn answers_requisition_not_found_when_no_tasks_match() {
    let repository =
        Arc::new(InMemoryRepository::new().with_organization(organization("42", "Acme Pathology")));

    let response = operation(&repository)
        .process(&claim_parameters("urn:req", "R1", organization_reference("42")))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(
        result_code(payload_parameters(&response)),
        "requisition-not-found"
    );
    assert!(repository.submitted_transactions().is_empty());
}

// ============================================================================
// Scenario D and claimability
// ============================================================================

#[tokio::test]
async fn rejects_a_completed_task_naming_it_in_the_report() {
    let repository = Arc::new(
        InMemoryRepository::new()
            .with_organization(organization("42", "Acme Pathology"))
            .with_task(
                TaskBuilder::new("t-done")
                    .group_tag()
                    .group_identifier("urn:req", "R1")
                    .status(TaskStatus::Completed)
                    .build(),
            ),
    );

    let response = operation(&repository)
        .process(&claim_parameters("urn:req", "R1", organization_reference("42")))
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    let messages = outcome_messages(payload_outcome(&response));
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("t-done"));
    assert!(messages[0].contains("completed"));
    assert!(repository.submitted_transactions().is_empty());
}

#[tokio::test]
async fn rejects_a_task_with_no_status() {
    let repository = Arc::new(
        InMemoryRepository::new()
            .with_organization(organization("42", "Acme Pathology"))
            .with_task(
                TaskBuilder::new("t-blank")
                    .group_tag()
                    .group_identifier("urn:req", "R1")
                    .no_status()
                    .build(),
            ),
    );

    let response = operation(&repository)
        .process(&claim_parameters("urn:req", "R1", organization_reference("42")))
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    assert!(repository.submitted_transactions().is_empty());
}

// ============================================================================
// Group task uniqueness
// ============================================================================

#[tokio::test]
async fn rejects_a_requisition_with_no_group_task() {
    let repository = Arc::new(
        InMemoryRepository::new()
            .with_organization(organization("42", "Acme Pathology"))
            .with_task(
                TaskBuilder::new("t-member")
                    .group_identifier("urn:req", "R1")
                    .build(),
            ),
    );

    let response = operation(&repository)
        .process(&claim_parameters("urn:req", "R1", organization_reference("42")))
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    let messages = outcome_messages(payload_outcome(&response));
    assert!(messages[0].contains("Group Task resources found: 0"));
    assert!(repository.submitted_transactions().is_empty());
}

#[tokio::test]
async fn rejects_a_requisition_with_two_group_tasks() {
    let repository = Arc::new(
        InMemoryRepository::new()
            .with_organization(organization("42", "Acme Pathology"))
            .with_tasks([
                TaskBuilder::new("t-a")
                    .group_tag()
                    .group_identifier("urn:req", "R1")
                    .build(),
                TaskBuilder::new("t-b")
                    .group_tag()
                    .group_identifier("urn:req", "R1")
                    .build(),
            ]),
    );

    let response = operation(&repository)
        .process(&claim_parameters("urn:req", "R1", organization_reference("42")))
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    let messages = outcome_messages(payload_outcome(&response));
    assert!(messages[0].contains("Group Task resources found: 2"));
    assert!(repository.submitted_transactions().is_empty());
}

// ============================================================================
// Validation via the full operation
// ============================================================================

#[tokio::test]
async fn rejects_an_empty_parameters_resource() {
    let repository = Arc::new(InMemoryRepository::new());
    let response = operation(&repository)
        .process(&Parameters::default())
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    assert!(!outcome_messages(payload_outcome(&response)).is_empty());
}

#[tokio::test]
async fn rejects_parameters_missing_the_organization() {
    let repository = Arc::new(InMemoryRepository::new());
    let mut parameters = claim_parameters("urn:req", "R1", organization_reference("42"));
    parameters.parameter.remove(1);

    let response = operation(&repository)
        .process(&parameters)
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    let messages = outcome_messages(payload_outcome(&response));
    assert!(messages[0].contains("organization"));
}

// ============================================================================
// Repository failures
// ============================================================================

#[tokio::test]
async fn a_conflict_on_the_cancellation_transaction_propagates() {
    let repository = seeded_repository();
    repository.fail_next_transaction();

    let error = operation(&repository)
        .process(&claim_parameters("urn:req", "R1", organization_reference("42")))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ClaimError::Repository(RepositoryError::Conflict { .. })
    ));
    // Nothing was committed; the claim transaction was never attempted.
    assert!(repository.submitted_transactions().is_empty());
}
