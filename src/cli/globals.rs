use crate::identity::{
    IdentityClient, IdentityConfig, KeySource, API_KEY_ENV, DEFAULT_ENDPOINT, GOOGLE_CERTS_URL,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_key: Option<SecretString>,
    pub endpoint: String,
    pub certs_url: String,
    pub timeout: Option<Duration>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            api_key: None,
            endpoint,
            certs_url: GOOGLE_CERTS_URL.to_string(),
            timeout: None,
        }
    }

    pub fn set_api_key(&mut self, api_key: SecretString) {
        self.api_key = Some(api_key);
    }

    /// Client configuration; without `--api-key` the key is read from the environment on each call.
    #[must_use]
    pub fn config(&self) -> IdentityConfig {
        let key_source = self.api_key.clone().map_or_else(
            || KeySource::Env(API_KEY_ENV.to_string()),
            KeySource::Static,
        );

        IdentityConfig::new(key_source)
            .with_endpoint(self.endpoint.clone())
            .with_certs_url(self.certs_url.clone())
            .with_timeout(self.timeout)
    }

    /// Build the identity client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn client(&self) -> Result<IdentityClient> {
        IdentityClient::new(self.config()).context("failed to build identity client")
    }
}

impl Default for GlobalArgs {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT.to_string())
    }
}
