//! Diagnostic report builder
//!
//! Builds OperationOutcome resources from message lists, merges
//! existing reports, and extracts their messages back out. Every
//! built report carries a generated XHTML narrative: one paragraph
//! for a single issue, an ordered list for several.

use thiserror::Error;

use fhir_model::{
    CodeableConcept, Issue, IssueSeverity, IssueType, Narrative, NarrativeStatus, OperationOutcome,
};

/// Misuse of the report builder
///
/// An empty report is a programming error in the caller, not a
/// recoverable condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("An operation outcome requires at least one message or one report to merge")]
    Empty,
}

/// Builds a fatal report (issue type `exception`)
pub fn fatal(messages: &[String]) -> Result<OperationOutcome, ReportError> {
    build(IssueSeverity::Fatal, IssueType::Exception, messages)
}

/// Builds an error report (issue type `processing`)
pub fn error(messages: &[String]) -> Result<OperationOutcome, ReportError> {
    build(IssueSeverity::Error, IssueType::Processing, messages)
}

/// Builds a warning report (issue type `informational`)
pub fn warning(messages: &[String]) -> Result<OperationOutcome, ReportError> {
    build(IssueSeverity::Warning, IssueType::Informational, messages)
}

/// Builds an information report (issue type `informational`)
pub fn information(messages: &[String]) -> Result<OperationOutcome, ReportError> {
    build(IssueSeverity::Information, IssueType::Informational, messages)
}

/// Merges reports into one, concatenating issues in order
///
/// Inputs are consumed, never mutated in place; the narrative is
/// re-derived from the combined issue list.
pub fn merge(
    outcomes: impl IntoIterator<Item = OperationOutcome>,
) -> Result<OperationOutcome, ReportError> {
    let issue: Vec<Issue> = outcomes.into_iter().flat_map(|o| o.issue).collect();
    if issue.is_empty() {
        return Err(ReportError::Empty);
    }
    let text = Some(narrative(&issue));
    Ok(OperationOutcome { text, issue })
}

/// The message texts carried by a report's issues, in order
pub fn extract_messages(outcome: &OperationOutcome) -> Vec<String> {
    outcome
        .issue
        .iter()
        .filter_map(|issue| issue.details.as_ref())
        .filter_map(|details| details.text.clone())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

fn build(
    severity: IssueSeverity,
    code: IssueType,
    messages: &[String],
) -> Result<OperationOutcome, ReportError> {
    if messages.is_empty() {
        return Err(ReportError::Empty);
    }

    let issue: Vec<Issue> = messages
        .iter()
        .map(|message| Issue {
            severity,
            code,
            details: Some(CodeableConcept::text(message.clone())),
        })
        .collect();

    let text = Some(narrative(&issue));
    Ok(OperationOutcome { text, issue })
}

fn narrative(issues: &[Issue]) -> Narrative {
    let mut div = String::from(r#"<div xmlns="http://www.w3.org/1999/xhtml">"#);

    let texts: Vec<&str> = issues
        .iter()
        .filter_map(|issue| issue.details.as_ref())
        .filter_map(|details| details.text.as_deref())
        .collect();

    match texts.as_slice() {
        [] => {}
        [single] => {
            div.push_str("<p>");
            div.push_str(&escape_xhtml(single));
            div.push_str("</p>");
        }
        many => {
            div.push_str("<ol>");
            for text in many {
                div.push_str("<li>");
                div.push_str(&escape_xhtml(text));
                div.push_str("</li>");
            }
            div.push_str("</ol>");
        }
    }

    div.push_str("</div>");
    Narrative {
        status: NarrativeStatus::Generated,
        div,
    }
}

fn escape_xhtml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
