//! Parameters resource
//!
//! Operation input and output are carried as named parameters. The
//! value is a tagged union over the datatypes the claim operation
//! accepts, so a parameter's type is known once it is decoded rather
//! than being discovered by runtime type probing.

use serde::{Deserialize, Serialize};

use crate::datatypes::{Coding, Identifier, Reference};

/// A single named parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    #[serde(rename = "valueIdentifier")]
    Identifier(Identifier),
    #[serde(rename = "valueReference")]
    Reference(Reference),
    #[serde(rename = "valueCoding")]
    Coding(Coding),
    #[serde(rename = "valueString")]
    String(String),
}

/// One entry in a Parameters resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub value: Option<ParameterValue>,
}

impl Parameter {
    /// Creates a named parameter with a value
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }
}

/// A list of named parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<Parameter>,
}

impl Parameters {
    /// All parameters whose name matches, case-insensitively
    ///
    /// The iterator borrows only this resource, not the name, so it
    /// may outlive the lookup string.
    pub fn named(&self, name: &str) -> impl Iterator<Item = &Parameter> {
        let name = name.to_ascii_lowercase();
        self.parameter
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(&name))
    }
}
