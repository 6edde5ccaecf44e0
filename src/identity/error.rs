use reqwest::StatusCode;
use thiserror::Error;

/// Message used when a provider error body carries no `error.message`.
pub const UNKNOWN_ERROR: &str = "unknown error occurred";

/// Message returned by custom-token sign-in on any non-200 status.
pub const CUSTOM_TOKEN_FAILED: &str = "signInWithCustomToken failed";

#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not set: {0}")]
    MissingCredential(String),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("failed to encode request payload")]
    Serialization(#[source] serde_json::Error),
    #[error("request to identity provider failed")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body")]
    Decode(#[source] serde_json::Error),
    #[error("{message}")]
    Provider { status: StatusCode, message: String },
    #[error("failed to extract key material")]
    KeyExtraction(#[from] KeyError),
}

impl Error {
    /// HTTP status of a provider failure, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the key material extractor.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("malformed ID token")]
    MalformedToken,
    #[error("ID token header has no key id")]
    MissingKeyId,
    #[error("unknown key id: {0}")]
    UnknownKeyId(String),
    #[error("failed to fetch signing certificates: {0}")]
    Fetch(String),
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
