use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped JSON object returned by lookup and custom-token sign-in.
pub type ProviderObject = Map<String, Value>;

/// Email and password sent to `signUp` and `signInWithPassword`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Credentials for an anonymous sign-up.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(String::new(), String::new())
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.email.is_empty() || self.password.expose_secret().is_empty()
    }
}

/// Wire shape of [`Credentials`]; borrowed so the password is only exposed while serializing.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CredentialsPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    pub return_secure_token: bool,
}

impl<'a> CredentialsPayload<'a> {
    pub fn sign_in(credentials: &'a Credentials) -> Self {
        Self {
            email: Some(&credentials.email),
            password: Some(credentials.password.expose_secret()),
            return_secure_token: true,
        }
    }

    // email and password are only sent when both are present
    pub fn sign_up(credentials: &'a Credentials) -> Self {
        if credentials.is_anonymous() {
            Self {
                email: None,
                password: None,
                return_secure_token: true,
            }
        } else {
            Self::sign_in(credentials)
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomTokenPayload<'a> {
    pub token: &'a str,
    pub return_secure_token: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IdTokenRequest<'a> {
    pub id_token: &'a str,
}

/// Session returned by password sign-in and sign-up.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub local_id: String,
    pub expires_in: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered: Option<bool>,
    /// Key material for `id_token`, filled in after the provider responds.
    #[serde(default, skip_deserializing)]
    pub public_key: String,
}

impl Session {
    /// Token lifetime in seconds, if the provider sent a number.
    #[must_use]
    pub fn expires_in_secs(&self) -> Option<u64> {
        self.expires_in.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sign_up_payload_is_anonymous_when_fields_missing() {
        let credentials = Credentials::anonymous();
        let payload = serde_json::to_value(CredentialsPayload::sign_up(&credentials)).unwrap();
        assert_eq!(payload, json!({ "returnSecureToken": true }));

        let only_email = Credentials::new("alice@example.com", "");
        let payload = serde_json::to_value(CredentialsPayload::sign_up(&only_email)).unwrap();
        assert_eq!(payload, json!({ "returnSecureToken": true }));
    }

    #[test]
    fn sign_in_payload_includes_credentials() {
        let credentials = Credentials::new("alice@example.com", "hunter2");
        let payload = serde_json::to_value(CredentialsPayload::sign_in(&credentials)).unwrap();
        assert_eq!(
            payload,
            json!({
                "email": "alice@example.com",
                "password": "hunter2",
                "returnSecureToken": true
            })
        );
    }

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials::new("alice@example.com", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn session_ignores_public_key_from_provider() {
        let session: Session = serde_json::from_value(json!({
            "idToken": "id",
            "refreshToken": "refresh",
            "localId": "uid",
            "expiresIn": "3600",
            "publicKey": "should not be read"
        }))
        .unwrap();
        assert_eq!(session.public_key, "");
        assert_eq!(session.expires_in_secs(), Some(3600));
        assert_eq!(session.email, None);
    }

    #[test]
    fn session_rejects_missing_id_token() {
        let result: Result<Session, _> = serde_json::from_value(json!({
            "refreshToken": "refresh",
            "localId": "uid",
            "expiresIn": "3600"
        }));
        assert!(result.is_err());
    }
}
