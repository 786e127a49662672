//! Signed, time-bounded bearer tokens.
//!
//! Tokens are compact HS256 JWTs carrying `sub`, `iat` and `exp` in whole
//! seconds. Validation is stateless: a token is accepted while its signature
//! verifies under the process secret and the injected clock reads strictly
//! before `exp`. There is no revocation list; expiry is the only way a token
//! stops working.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::{Error, Username};

const BEARER_SCHEME: &str = "bearer";
const FINGERPRINT_HEX_LEN: usize = 8;

/// Reasons a token could not be issued or accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Encoding, header, claims or subject could not be read.
    #[error("token is malformed: {message}")]
    Malformed { message: String },
    /// The signature does not match the payload under this secret.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The token was valid until `expired_at`.
    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
    /// The token could not be produced.
    #[error("token signing failed: {message}")]
    Signing { message: String },
}

impl TokenError {
    fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Machine-readable reason passed to transport adapters.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired { .. } => "expired",
            Self::Signing { .. } => "signing_failed",
        }
    }
}

impl From<TokenError> for Error {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Signing { message } => Error::internal(format!("token signing failed: {message}")),
            TokenError::Expired { expired_at } => Error::invalid_token("expired").with_details(json!({
                "reason": "expired",
                "expiredAt": expired_at.to_rfc3339(),
            })),
            other => Error::invalid_token(other.reason()),
        }
    }
}

/// Validation failures for [`TokenSettings`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenSettingsError {
    /// The signing secret held no bytes.
    #[error("token signing secret must not be empty")]
    EmptySecret,
    /// The TTL is shorter than a second or too large to represent.
    #[error("token ttl of {secs}s is out of range")]
    TtlOutOfRange { secs: u64 },
}

/// Process-wide signing secret, zeroised on drop.
#[derive(Clone)]
pub struct TokenSecret(Zeroizing<Vec<u8>>);

impl TokenSecret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenSettingsError> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.is_empty() {
            return Err(TokenSettingsError::EmptySecret);
        }
        Ok(Self(bytes))
    }

    /// Short SHA-256 fingerprint safe to log when comparing deployments.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_slice());
        let mut encoded = hex::encode(digest);
        encoded.truncate(FINGERPRINT_HEX_LEN);
        encoded
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSecret({})", self.fingerprint())
    }
}

/// Secret and lifetime shared by every token the process issues.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    secret: TokenSecret,
    ttl: Duration,
}

impl TokenSettings {
    /// Validate a secret and TTL pair.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use sns_backend::domain::{TokenSecret, TokenSettings};
    ///
    /// let secret = TokenSecret::new(b"0123456789abcdef".to_vec()).unwrap();
    /// let settings = TokenSettings::new(secret, Duration::from_secs(3600)).unwrap();
    /// assert_eq!(settings.ttl(), Duration::from_secs(3600));
    /// ```
    pub fn new(secret: TokenSecret, ttl: Duration) -> Result<Self, TokenSettingsError> {
        let secs = ttl.as_secs();
        if secs == 0 || i64::try_from(secs).is_err() {
            return Err(TokenSettingsError::TtlOutOfRange { secs });
        }
        Ok(Self { secret, ttl })
    }

    /// Signing secret.
    pub fn secret(&self) -> &TokenSecret {
        &self.secret
    }

    /// Lifetime of issued tokens, truncated to whole seconds when signing.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// A freshly issued bearer token and the claims it asserts.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    token: String,
    subject: Username,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Compact token string to hand to the client.
    pub fn as_str(&self) -> &str {
        self.token.as_str()
    }

    /// Username the token asserts.
    pub fn subject(&self) -> &Username {
        &self.subject
    }

    /// Issue instant, truncated to whole seconds.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// First instant at which the token is rejected.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("subject", &self.subject)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Issues and validates bearer tokens under one secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Build a service from validated settings and a clock.
    pub fn new(settings: &TokenSettings, clock: Arc<dyn Clock>) -> Self {
        let secret = settings.secret().as_bytes();
        // Expiry is checked against the injected clock rather than the
        // library's wall-clock check.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(settings.ttl().as_secs()).unwrap_or(i64::MAX),
            clock,
        }
    }

    /// Sign a token asserting `subject`, valid from now until now + TTL.
    pub fn issue(&self, subject: &Username) -> Result<AuthToken, TokenError> {
        let issued_at = self.clock.utc().timestamp();
        let expires_at = issued_at
            .checked_add(self.ttl_secs)
            .ok_or_else(|| TokenError::Signing {
                message: "expiry overflows the timestamp range".to_owned(),
            })?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at,
            exp: expires_at,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(
            |err| TokenError::Signing {
                message: err.to_string(),
            },
        )?;

        let to_signing_error = |err: TokenError| TokenError::Signing {
            message: err.to_string(),
        };
        Ok(AuthToken {
            token,
            subject: subject.clone(),
            issued_at: timestamp_to_datetime(issued_at).map_err(to_signing_error)?,
            expires_at: timestamp_to_datetime(expires_at).map_err(to_signing_error)?,
        })
    }

    /// Check signature and expiry, returning the asserted subject.
    ///
    /// The subject is not looked up; callers resolve it against the user
    /// directory when they need the identity.
    pub fn validate(&self, token: &str) -> Result<Username, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::malformed(err.to_string()),
            }
        })?;
        let claims = data.claims;

        if self.clock.utc().timestamp() >= claims.exp {
            return Err(TokenError::Expired {
                expired_at: timestamp_to_datetime(claims.exp)?,
            });
        }

        Username::new(&claims.sub).map_err(|err| TokenError::malformed(format!("subject: {err}")))
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

fn timestamp_to_datetime(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| TokenError::malformed(format!("timestamp {secs} is out of range")))
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
///
/// # Examples
/// ```
/// use sns_backend::domain::bearer_token;
///
/// assert_eq!(bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
/// assert!(bearer_token("Basic dXNlcjpwdw==").is_err());
/// ```
pub fn bearer_token(header_value: &str) -> Result<&str, TokenError> {
    let (scheme, token) = header_value
        .trim()
        .split_once(' ')
        .ok_or_else(|| TokenError::malformed("authorization header lacks a scheme"))?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(TokenError::malformed("authorization scheme is not Bearer"));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::malformed("bearer token is empty"));
    }
    Ok(token)
}
