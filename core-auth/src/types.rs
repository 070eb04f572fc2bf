use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretBox, SecretString};
use serde::Deserialize;

use crate::error::{AuthError, Result};

/// Default OAuth 2.0 token endpoint for Google service accounts
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Decoded service-account key.
///
/// Only the fields needed to sign a JWT assertion are kept. The private key is
/// wrapped in a [`SecretString`] so it is zeroized on drop and redacted from
/// `Debug` output.
///
/// # Examples
///
/// ```ignore
/// use core_auth::ServiceAccountKey;
///
/// let key = ServiceAccountKey::from_base64(&std::env::var("DRIVE_UPLOAD_CREDENTIALS")?)?;
/// println!("Authenticating as {}", key.client_email);
/// ```
#[derive(Debug)]
pub struct ServiceAccountKey {
    /// Service account identity (`iss` of the assertion)
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: SecretString,
    /// Key id, sent as the JWT `kid` header when present
    pub private_key_id: Option<String>,
    /// Token endpoint (`aud` of the assertion)
    pub token_uri: String,
}

#[derive(Deserialize)]
struct RawServiceAccountKey {
    #[serde(rename = "type")]
    key_type: Option<String>,
    client_email: Option<String>,
    private_key: Option<String>,
    private_key_id: Option<String>,
    token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Decode a base64-encoded JSON key file.
    ///
    /// Whitespace inside the blob (line-wrapped secrets) is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] if the blob is not valid
    /// base64, not a JSON object, not a service-account key, or lacks
    /// `client_email` / `private_key`.
    pub fn from_base64(blob: &str) -> Result<Self> {
        let compact: String = blob.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(AuthError::InvalidCredential(
                "credential blob is empty".to_string(),
            ));
        }

        let decoded = STANDARD
            .decode(compact.as_bytes())
            .map(|bytes| SecretBox::new(Box::new(bytes)))
            .map_err(|e| AuthError::InvalidCredential(format!("not valid base64: {}", e)))?;

        Self::from_json(decoded.expose_secret())
    }

    /// Parse a JSON key file.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        let raw: RawServiceAccountKey = serde_json::from_slice(json)
            .map_err(|e| AuthError::InvalidCredential(format!("not a JSON key file: {}", e)))?;

        if let Some(key_type) = raw.key_type.as_deref() {
            if key_type != "service_account" {
                return Err(AuthError::InvalidCredential(format!(
                    "expected a service_account key, got '{}'",
                    key_type
                )));
            }
        }

        let client_email = raw
            .client_email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| AuthError::InvalidCredential("missing client_email".to_string()))?;

        let private_key = raw
            .private_key
            .filter(|key| key.contains("PRIVATE KEY"))
            .map(SecretString::from)
            .ok_or_else(|| {
                AuthError::InvalidCredential("missing or malformed private_key".to_string())
            })?;

        Ok(Self {
            client_email,
            private_key,
            private_key_id: raw.private_key_id.filter(|id| !id.is_empty()),
            token_uri: raw
                .token_uri
                .filter(|uri| !uri.is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}

/// Bearer token for provider API calls.
///
/// Valid for a bounded time (typically one hour); the uploader never refreshes
/// it mid-run. The token value is redacted from `Debug` output.
#[derive(Debug)]
pub struct AccessToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token that expires `expires_in` seconds after `issued_at`
    pub fn new(token: impl Into<String>, issued_at: DateTime<Utc>, expires_in: i64) -> Self {
        Self {
            token: SecretString::from(token.into()),
            expires_at: issued_at + Duration::seconds(expires_in),
        }
    }

    /// The raw bearer value, for building `Authorization` headers only
    pub fn secret(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
