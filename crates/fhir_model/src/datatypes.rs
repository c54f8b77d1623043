//! Common FHIR datatypes

use serde::{Deserialize, Serialize};

/// A business identifier: a (system, value) pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    /// Namespace the value is unique within
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// The identifier value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Identifier {
    /// Creates an identifier with both system and value populated
    pub fn new(system: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            value: Some(value.into()),
        }
    }

    /// Renders the identifier as a `system|value` search token
    pub fn as_token(&self) -> String {
        format!(
            "{}|{}",
            self.system.as_deref().unwrap_or_default(),
            self.value.as_deref().unwrap_or_default()
        )
    }

    /// True when both system and value are present and non-blank
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.system) && !is_blank(&self.value)
    }
}

/// A coded value from a code system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    /// Creates a coding with system and code populated
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            display: None,
        }
    }

    /// Case-insensitive match on system and code
    pub fn matches(&self, system: &str, code: &str) -> bool {
        self.system
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(system))
            && self
                .code
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(code))
    }
}

/// A concept expressed as codings and/or plain text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Creates a text-only concept
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.into()),
        }
    }
}

/// A reference from one resource to another
///
/// Either a direct literal reference (`Organization/42`) or a logical
/// reference by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// Creates a literal reference with a display label
    pub fn literal(reference: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            identifier: None,
            display: Some(display.into()),
        }
    }

    /// True when the literal reference is present and non-blank
    pub fn has_literal(&self) -> bool {
        !is_blank(&self.reference)
    }
}

/// Resource metadata: version tag and tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<Coding>,
}

/// Narrative status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeStatus {
    Generated,
    Extensions,
    Additional,
    Empty,
}

/// Human-readable rendering of a resource as XHTML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub status: NarrativeStatus,
    pub div: String,
}

pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|v| v.trim().is_empty())
        .unwrap_or(true)
}
