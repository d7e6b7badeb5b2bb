//! Error types for the REST API client

use n8n_api_contract::ApiErrorBody;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when using the REST API client
#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("URL cannot be used as an API base: {0}")]
    InvalidBaseUrl(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Request failed with status code {status}: {}", .body.message)]
    ServerError { status: StatusCode, body: ApiErrorBody },

    #[error("Unexpected response ({status}): {body}")]
    UnexpectedResponse { status: StatusCode, body: String },
}

impl RestClientError {
    /// HTTP status of a failed response, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RestClientError::ServerError { status, .. }
            | RestClientError::UnexpectedResponse { status, .. } => Some(*status),
            RestClientError::Http(err) => err.status(),
            _ => None,
        }
    }
}

/// Result type alias for REST client operations
pub type RestClientResult<T> = Result<T, RestClientError>;

/// Errors raised while loading instance configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing environment variable {0}")]
    MissingEnvVar(&'static str),

    #[error("No n8n instances configured")]
    NoEnvironments,

    #[error("Default instance '{0}' is not configured")]
    UnknownDefault(String),

    #[error("Instance '{instance}' not found. Available instances: {}", .available.join(", "))]
    UnknownInstance {
        instance: String,
        available: Vec<String>,
    },

    #[error("Invalid host for instance '{instance}': {reason}")]
    InvalidHost { instance: String, reason: String },

    #[error("Failed to create client for instance '{instance}': {source}")]
    Client {
        instance: String,
        #[source]
        source: RestClientError,
    },
}
