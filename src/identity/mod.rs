pub mod config;
pub use self::config::{api_key_from_env, IdentityConfig, KeySource, API_KEY_ENV, DEFAULT_ENDPOINT};

pub mod error;
pub use self::error::{Error, KeyError, CUSTOM_TOKEN_FAILED, UNKNOWN_ERROR};

pub mod keys;
pub use self::keys::{GoogleCertificates, KeyMaterialExtractor, GOOGLE_CERTS_URL};

pub mod types;
pub use self::types::{Credentials, ProviderObject, Session};

use self::types::{CredentialsPayload, CustomTokenPayload, IdTokenRequest};
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{fmt, sync::Arc};
use tracing::{debug, error, info_span, instrument, Instrument};
use url::Url;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Identity Platform endpoints, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    SignUp,
    SignInWithPassword,
    SignInWithCustomToken,
    Lookup,
}

impl Endpoint {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SignUp => "accounts:signUp",
            Self::SignInWithPassword => "accounts:signInWithPassword",
            Self::SignInWithCustomToken => "accounts:signInWithCustomToken",
            Self::Lookup => "accounts:lookup",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Build `<base>/<endpoint>?key=<api key>`.
///
/// The path is appended as text: `Url::join` would read `accounts:` as a scheme.
///
/// # Errors
/// Returns `Error::InvalidEndpoint` if the base URL cannot be parsed.
pub fn endpoint_url(base: &str, endpoint: Endpoint, api_key: &str) -> Result<Url, Error> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), endpoint.path());

    let mut url = Url::parse(&raw).map_err(|e| Error::InvalidEndpoint(format!("{base}: {e}")))?;
    url.query_pairs_mut().append_pair("key", api_key);

    Ok(url)
}

/// Pull `error.message` out of a provider error envelope.
#[must_use]
pub fn provider_error_message(json_response: &Value) -> Option<&str> {
    json_response
        .get("error")
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
}

/// Raw outcome of one provider call. The body has already been read to the end.
struct ProviderResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ProviderResponse {
    /// Decode a 200 body into `T`, or turn any other status into `Error::Provider`.
    fn into_result<T: DeserializeOwned>(self, endpoint: Endpoint) -> Result<T, Error> {
        if self.status != StatusCode::OK {
            let json_response: Value = serde_json::from_slice(&self.body).map_err(Error::Decode)?;

            let message = provider_error_message(&json_response)
                .map_or_else(|| UNKNOWN_ERROR.to_string(), |msg| format!("error: {msg}"));

            error!("{} failed: {} - {}", endpoint, self.status, message);

            return Err(Error::Provider {
                status: self.status,
                message,
            });
        }

        serde_json::from_slice(&self.body).map_err(Error::Decode)
    }
}

/// Client for the Identity Platform REST API.
///
/// Cheap to clone and safe to share between tasks; it holds no per-call state.
#[derive(Clone)]
pub struct IdentityClient {
    config: IdentityConfig,
    client: Client,
    extractor: Arc<dyn KeyMaterialExtractor>,
}

impl fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityClient")
            .field("endpoint", &self.config.endpoint)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl IdentityClient {
    /// Build a client that attaches the provider's signing certificate as key material.
    ///
    /// The certificate fetch shares the provider client, so the configured
    /// timeout bounds it too.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: IdentityConfig) -> Result<Self, Error> {
        let client = http_client(&config)?;
        let extractor = Arc::new(GoogleCertificates::new(
            client.clone(),
            config.certs_url.clone(),
        ));

        Ok(Self {
            config,
            client,
            extractor,
        })
    }

    /// Build a client with a custom key material extractor.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_extractor(
        config: IdentityConfig,
        extractor: Arc<dyn KeyMaterialExtractor>,
    ) -> Result<Self, Error> {
        Ok(Self {
            client: http_client(&config)?,
            config,
            extractor,
        })
    }

    /// Serialize `payload`, POST it to `endpoint` and read the whole response body.
    async fn post<P: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        payload: &P,
    ) -> Result<ProviderResponse, Error> {
        // resolved on every call, never cached
        let api_key = self.config.key_source.resolve()?;

        let url = endpoint_url(&self.config.endpoint, endpoint, api_key.expose_secret())?;

        let body = serde_json::to_vec(payload).map_err(Error::Serialization)?;

        // the url carries the API key, only the endpoint name is recorded
        let span = info_span!(
            "identity.request",
            http.method = "POST",
            endpoint = %endpoint
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();

        debug!("{} responded {} ({} bytes)", endpoint, status, body.len());

        Ok(ProviderResponse { status, body })
    }

    async fn attach_key_material(&self, mut session: Session) -> Result<Session, Error> {
        session.public_key = self.extractor.extract(&session.id_token).await?;

        Ok(session)
    }

    /// Validate an ID token with `accounts:lookup` and return the account data.
    ///
    /// # Errors
    /// Returns an error if the API key is missing, the request fails, the provider
    /// rejects the token, or the body cannot be decoded.
    #[instrument(skip_all)]
    pub async fn validate_id_token(&self, id_token: &str) -> Result<ProviderObject, Error> {
        self.post(Endpoint::Lookup, &IdTokenRequest { id_token })
            .await?
            .into_result(Endpoint::Lookup)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    /// Returns an error if the API key is missing, the request fails, the provider
    /// rejects the credentials, the body cannot be decoded, or key extraction fails.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, Error> {
        let session: Session = self
            .post(
                Endpoint::SignInWithPassword,
                &CredentialsPayload::sign_in(credentials),
            )
            .await?
            .into_result(Endpoint::SignInWithPassword)?;

        self.attach_key_material(session).await
    }

    /// Create an account. Empty email or password creates an anonymous user.
    ///
    /// # Errors
    /// Returns an error if the API key is missing, the request fails, the provider
    /// refuses the sign-up, the body cannot be decoded, or key extraction fails.
    #[instrument(skip(self, credentials), fields(anonymous = credentials.is_anonymous()))]
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<Session, Error> {
        let session: Session = self
            .post(Endpoint::SignUp, &CredentialsPayload::sign_up(credentials))
            .await?
            .into_result(Endpoint::SignUp)?;

        self.attach_key_material(session).await
    }

    /// Exchange a custom token for a provider session.
    ///
    /// The body is decoded before the status is checked, and any non-200 status
    /// yields [`CUSTOM_TOKEN_FAILED`] without reading the provider's message.
    ///
    /// # Errors
    /// Returns an error if the API key is missing, the request fails, the body is
    /// not a JSON object, or the status is not 200.
    #[instrument(skip_all)]
    pub async fn sign_in_with_custom_token(&self, token: &str) -> Result<ProviderObject, Error> {
        let response = self
            .post(
                Endpoint::SignInWithCustomToken,
                &CustomTokenPayload {
                    token,
                    return_secure_token: true,
                },
            )
            .await?;

        let body: ProviderObject = serde_json::from_slice(&response.body).map_err(Error::Decode)?;

        if response.status != StatusCode::OK {
            error!(
                "{} failed: {}",
                Endpoint::SignInWithCustomToken,
                response.status
            );

            return Err(Error::Provider {
                status: response.status,
                message: CUSTOM_TOKEN_FAILED.to_string(),
            });
        }

        Ok(body)
    }
}

fn http_client(config: &IdentityConfig) -> Result<Client, Error> {
    let mut builder = Client::builder().user_agent(config.user_agent.as_str());

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}
