//! HTTP repository client
//!
//! Talks FHIR JSON to a remote repository over REST: searches are
//! GETs returning searchset bundles, reads are GETs of a literal
//! reference, transactions are POSTs of a bundle to the base URL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use fhir_model::{Bundle, Reference, Resource, ResourceType};

use crate::error::RepositoryError;
use crate::ports::{FhirRepository, SearchOutcome};
use crate::query::SearchQuery;

/// Connection settings for one repository
#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySettings {
    /// Short code the repository is addressed by
    pub code: String,
    /// Base URL of the FHIR endpoint (no trailing slash)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            code: "default".to_string(),
            base_url: "http://localhost:8080/fhir".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Repository clients addressable by code
///
/// Mirrors how the operation layer thinks about repositories: it is
/// handed a code from configuration and asks the registry for the
/// matching client.
#[derive(Debug, Clone, Default)]
pub struct RepositoryRegistry {
    clients: HashMap<String, Arc<HttpFhirRepository>>,
}

impl RepositoryRegistry {
    /// Builds a registry from repository settings
    pub fn from_settings(
        settings: impl IntoIterator<Item = RepositorySettings>,
    ) -> Result<Self, RepositoryError> {
        let mut clients = HashMap::new();
        for entry in settings {
            let client = HttpFhirRepository::new(&entry)?;
            clients.insert(entry.code.clone(), Arc::new(client));
        }
        Ok(Self { clients })
    }

    /// The client registered under `code`
    pub fn client_for(&self, code: &str) -> Result<Arc<HttpFhirRepository>, RepositoryError> {
        self.clients
            .get(code)
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownRepository(code.to_string()))
    }
}

/// `FhirRepository` backed by a remote store over HTTP
#[derive(Debug)]
pub struct HttpFhirRepository {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFhirRepository {
    /// Creates a client for the configured endpoint
    pub fn new(settings: &RepositorySettings) -> Result<Self, RepositoryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL this client targets
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_resource(&self, url: &str) -> Result<Option<Resource>, RepositoryError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/fhir+json")
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => return Ok(None),
            status if !status.is_success() => {
                return Err(remote_error(url, status, response.text().await.ok()));
            }
            _ => {}
        }

        let body = response.text().await?;
        decode(url, &body).map(Some)
    }
}

#[async_trait]
impl FhirRepository for HttpFhirRepository {
    async fn search(
        &self,
        resource_type: ResourceType,
        query: &SearchQuery,
    ) -> Result<SearchOutcome, RepositoryError> {
        let url = format!("{}/{}?{}", self.base_url, resource_type, query);
        tracing::debug!(%url, "Repository search");

        let resource = self
            .get_resource(&url)
            .await?
            .ok_or_else(|| remote_error(&url, StatusCode::NOT_FOUND, None))?;

        let bundle = match resource {
            Resource::Bundle(bundle) => bundle,
            other => {
                return Err(RepositoryError::Decode {
                    url,
                    message: format!("expected a searchset Bundle, got {other:?}"),
                })
            }
        };

        let resources: Vec<Resource> = bundle.resources().cloned().collect();
        let total = bundle.total.unwrap_or(resources.len() as u32);
        Ok(SearchOutcome { total, resources })
    }

    async fn read(&self, reference: &Reference) -> Result<Option<Resource>, RepositoryError> {
        let target = reference.reference.as_deref().unwrap_or_default();
        let url = format!("{}/{}", self.base_url, target);
        tracing::debug!(%url, "Repository read");
        self.get_resource(&url).await
    }

    async fn transaction(&self, bundle: Bundle) -> Result<Bundle, RepositoryError> {
        let url = self.base_url.clone();
        tracing::debug!(%url, entries = bundle.entry.len(), "Repository transaction");

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/fhir+json")
            .header("Content-Type", "application/fhir+json")
            .json(&Resource::Bundle(bundle))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT || status == StatusCode::PRECONDITION_FAILED {
            return Err(RepositoryError::Conflict {
                url,
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(remote_error(&url, status, response.text().await.ok()));
        }

        let body = response.text().await?;
        match decode(&url, &body)? {
            Resource::Bundle(bundle) => Ok(bundle),
            other => Err(RepositoryError::Decode {
                url,
                message: format!("expected a transaction-response Bundle, got {other:?}"),
            }),
        }
    }
}

fn decode(url: &str, body: &str) -> Result<Resource, RepositoryError> {
    serde_json::from_str(body).map_err(|err| RepositoryError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    })
}

fn remote_error(url: &str, status: StatusCode, body: Option<String>) -> RepositoryError {
    RepositoryError::Remote {
        url: url.to_string(),
        status: status.as_u16(),
        body: body.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_configured_codes() {
        let registry = RepositoryRegistry::from_settings([RepositorySettings {
            code: "primary".into(),
            base_url: "http://localhost:8080/fhir/".into(),
            timeout_secs: 5,
        }])
        .unwrap();

        let client = registry.client_for("primary").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/fhir");

        let missing = registry.client_for("secondary");
        assert!(matches!(
            missing,
            Err(RepositoryError::UnknownRepository(code)) if code == "secondary"
        ));
    }
}
