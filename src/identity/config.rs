use crate::identity::Error;
use secrecy::{ExposeSecret, SecretString};
use std::{env, time::Duration};

pub const API_KEY_ENV: &str = "GCP_IDENTITY_API_KEY";
pub const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

/// Where the API key comes from.
///
/// The key is resolved on every call and never cached, so rotating the
/// environment variable takes effect on the next request.
#[derive(Debug, Clone)]
pub enum KeySource {
    Static(SecretString),
    Env(String),
}

impl KeySource {
    /// Resolve the API key.
    ///
    /// # Errors
    /// Returns `Error::MissingCredential` if the key is empty or the variable is unset.
    pub fn resolve(&self) -> Result<SecretString, Error> {
        match self {
            Self::Static(key) => {
                if key.expose_secret().is_empty() {
                    Err(Error::MissingCredential("static API key is empty".to_string()))
                } else {
                    Ok(key.clone())
                }
            }
            Self::Env(name) => api_key_from_env(name),
        }
    }
}

impl Default for KeySource {
    fn default() -> Self {
        Self::Env(API_KEY_ENV.to_string())
    }
}

/// Read an API key from the environment.
///
/// # Errors
/// Returns `Error::MissingCredential` if the variable is unset or empty.
pub fn api_key_from_env(name: &str) -> Result<SecretString, Error> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
        _ => Err(Error::MissingCredential(name.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub key_source: KeySource,
    pub endpoint: String,
    /// Published x509 certificates used to sign ID tokens.
    pub certs_url: String,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl IdentityConfig {
    #[must_use]
    pub fn new(key_source: KeySource) -> Self {
        Self {
            key_source,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_certs_url(mut self, certs_url: impl Into<String>) -> Self {
        self.certs_url = certs_url.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            key_source: KeySource::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            certs_url: crate::identity::GOOGLE_CERTS_URL.to_string(),
            timeout: None,
            user_agent: crate::identity::APP_USER_AGENT.to_string(),
        }
    }
}
