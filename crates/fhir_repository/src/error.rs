//! Repository error types

use thiserror::Error;

/// Errors raised by repository operations
///
/// The claim operation never retries these; retry and backoff policy
/// belongs to the repository client's caller, so every variant
/// propagates upward unchanged.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The request never produced a usable response
    #[error("Transport failure talking to the repository: {0}")]
    Transport(String),

    /// A version guard on a conditional update was not met
    #[error("Version conflict applying {url}: {status}")]
    Conflict { url: String, status: u16 },

    /// The repository answered with a non-success status
    #[error("Repository returned status {status} for {url}: {body}")]
    Remote {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded as the expected resource
    #[error("Failed to decode repository response from {url}: {message}")]
    Decode { url: String, message: String },

    /// No repository is configured under the requested code
    #[error("No repository configured for code '{0}'")]
    UnknownRepository(String),
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        RepositoryError::Transport(err.to_string())
    }
}
