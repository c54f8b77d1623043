//! Task resource

use serde::{Deserialize, Serialize};

use crate::datatypes::{CodeableConcept, Identifier, Meta, Reference};

/// Task lifecycle status
///
/// The full R4 value set; the claim operation only transfers tasks
/// whose status is in the claimable subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Draft,
    Requested,
    Received,
    Accepted,
    Rejected,
    Ready,
    Cancelled,
    InProgress,
    OnHold,
    Failed,
    Completed,
    EnteredInError,
}

impl TaskStatus {
    /// Wire-format code for this status
    pub fn as_code(&self) -> &'static str {
        match self {
            TaskStatus::Draft => "draft",
            TaskStatus::Requested => "requested",
            TaskStatus::Received => "received",
            TaskStatus::Accepted => "accepted",
            TaskStatus::Rejected => "rejected",
            TaskStatus::Ready => "ready",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::OnHold => "on-hold",
            TaskStatus::Failed => "failed",
            TaskStatus::Completed => "completed",
            TaskStatus::EnteredInError => "entered-in-error",
        }
    }
}

/// A unit of work requested against the repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_status: Option<CodeableConcept>,
    /// Requisition identifier shared by all tasks in the group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_identifier: Option<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Reference>,
}

impl Task {
    /// True when `meta.tag` carries the given (system, code) pair,
    /// compared case-insensitively
    pub fn has_tag(&self, system: &str, code: &str) -> bool {
        self.meta
            .as_ref()
            .map(|meta| meta.tag.iter().any(|tag| tag.matches(system, code)))
            .unwrap_or(false)
    }

    /// The version tag used for conditional updates, if any
    pub fn version_id(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|meta| meta.version_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::Coding;

    #[test]
    fn status_codes_follow_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let status: TaskStatus = serde_json::from_str("\"entered-in-error\"").unwrap();
        assert_eq!(status, TaskStatus::EnteredInError);
    }

    #[test]
    fn tag_lookup_checks_all_meta_tags() {
        let task = Task {
            meta: Some(Meta {
                version_id: Some("3".into()),
                tag: vec![
                    Coding::new("http://example.org/other", "x"),
                    Coding::new("http://example.org/tags", "group"),
                ],
            }),
            ..Default::default()
        };
        assert!(task.has_tag("http://example.org/tags", "GROUP"));
        assert!(!task.has_tag("http://example.org/tags", "member"));
        assert_eq!(task.version_id(), Some("3"));
    }

    #[test]
    fn task_without_meta_has_no_tags() {
        let task = Task::default();
        assert!(!task.has_tag("s", "c"));
        assert!(task.version_id().is_none());
    }
}
