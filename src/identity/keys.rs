use crate::identity::KeyError;
use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error, info_span, instrument, Instrument};

/// Public certificates for ID tokens minted by Identity Platform, keyed by `kid`.
pub const GOOGLE_CERTS_URL: &str =
    "https://www.googleapis.com/robot/v1/metadata/x509/securetoken@system.gserviceaccount.com";

/// Derives key material for an ID token.
///
/// Called after a successful password sign-in or sign-up; a failure here fails
/// the whole operation.
#[async_trait]
pub trait KeyMaterialExtractor: Send + Sync {
    async fn extract(&self, id_token: &str) -> Result<String, KeyError>;
}

/// Read the `kid` from the JOSE header of a compact JWT.
///
/// # Errors
/// Returns `KeyError::MalformedToken` if the token is not three base64url segments
/// with a JSON header, or `KeyError::MissingKeyId` if the header has no `kid`.
pub fn key_id(id_token: &str) -> Result<String, KeyError> {
    let mut segments = id_token.split('.');
    let (Some(header), Some(_), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(KeyError::MalformedToken);
    };

    let decoded = Base64UrlUnpadded::decode_vec(header).map_err(|_| KeyError::MalformedToken)?;
    let header: Value = serde_json::from_slice(&decoded).map_err(|_| KeyError::MalformedToken)?;

    header
        .get("kid")
        .and_then(Value::as_str)
        .filter(|kid| !kid.is_empty())
        .map(str::to_string)
        .ok_or(KeyError::MissingKeyId)
}

/// Looks up the PEM certificate that signed an ID token from the provider's
/// published x509 certificate map.
#[derive(Debug, Clone)]
pub struct GoogleCertificates {
    client: Client,
    certs_url: String,
}

impl GoogleCertificates {
    #[must_use]
    pub fn new(client: Client, certs_url: impl Into<String>) -> Self {
        Self {
            client,
            certs_url: certs_url.into(),
        }
    }

    /// Fetch the current `kid -> PEM` map.
    ///
    /// # Errors
    /// Returns an error if the request fails, the status is not a success, or the body is not a JSON object of strings.
    #[instrument(skip(self), fields(url = %self.certs_url))]
    pub async fn certificates(&self) -> Result<HashMap<String, String>, KeyError> {
        let span = info_span!("identity.certificates", http.method = "GET");
        let response = self
            .client
            .get(&self.certs_url)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            error!("Failed to fetch signing certificates: {}", status);

            return Err(KeyError::Fetch(status.to_string()));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl KeyMaterialExtractor for GoogleCertificates {
    async fn extract(&self, id_token: &str) -> Result<String, KeyError> {
        let kid = key_id(id_token)?;

        debug!("looking up certificate for kid {}", kid);

        let mut certificates = self.certificates().await?;

        certificates
            .remove(&kid)
            .ok_or(KeyError::UnknownKeyId(kid))
    }
}
