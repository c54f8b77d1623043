//! API configuration

use serde::Deserialize;

use fhir_repository::RepositorySettings;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Code of the repository claim requests are served from
    pub default_repository: String,
    /// Base URL of the default repository's FHIR endpoint
    pub repository_base_url: String,
    /// Outbound request timeout in seconds
    pub repository_timeout_secs: u64,
    /// Tag system marking a requisition's group task
    pub group_tag_system: String,
    /// Tag code marking a requisition's group task
    pub group_tag_code: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            default_repository: "default".to_string(),
            repository_base_url: "http://localhost:8090/fhir".to_string(),
            repository_timeout_secs: 30,
            group_tag_system: "http://fhir.example.org/CodeSystem/task-tag".to_string(),
            group_tag_code: "group-task".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("CLAIM"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for the default repository client
    pub fn repository_settings(&self) -> RepositorySettings {
        RepositorySettings {
            code: self.default_repository.clone(),
            base_url: self.repository_base_url.clone(),
            timeout_secs: self.repository_timeout_secs,
        }
    }
}
