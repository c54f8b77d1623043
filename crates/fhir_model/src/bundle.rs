//! Bundle resource
//!
//! Used in two roles: transaction bundles submitted to the repository
//! (applied atomically, all-or-nothing) and search result sets coming
//! back from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// Bundle purpose codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Transaction,
    TransactionResponse,
    Searchset,
    Batch,
    BatchResponse,
}

/// HTTP method for a transaction entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

/// The write instruction attached to a transaction entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRequest {
    pub method: HttpVerb,
    pub url: String,
    /// Version guard for conditional updates (`W/"<versionId>"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_match: Option<String>,
}

/// One entry in a bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<BundleRequest>,
}

/// A collection of resources with an overall purpose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(rename = "type")]
    pub bundle_type: BundleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Match count for searchset bundles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// Creates an empty transaction bundle stamped with the current time
    pub fn transaction() -> Self {
        Self {
            bundle_type: BundleType::Transaction,
            timestamp: Some(Utc::now()),
            total: None,
            entry: Vec::new(),
        }
    }

    /// The resources carried by this bundle's entries
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|entry| entry.resource.as_ref())
    }
}
