pub mod bootstrap;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bootstrap::{BootstrapError, PrincipalBootstrap};

/// Longest lifetime a token may be issued with (one year)
pub const MAX_TOKEN_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, alias = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Identity asserted by a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimedIdentity {
    /// No identity claim; the token speaks for the configured user
    Unspecified,
    User(i64),
    /// A `sub` that is not a numeric user id
    Foreign(String),
}

impl Claims {
    /// Claims for `user_id` expiring `expiry_hours` from now.
    /// Lifetimes outside `1..=MAX_TOKEN_EXPIRY_HOURS` are refused.
    pub fn new(user_id: i64, expiry_hours: u64) -> Result<Self, JwtError> {
        if !(1..=MAX_TOKEN_EXPIRY_HOURS).contains(&expiry_hours) {
            return Err(JwtError::InvalidExpiry(expiry_hours));
        }

        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            user_id: Some(user_id),
            sub: Some(user_id.to_string()),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }

    /// Seconds between issue and expiry
    pub fn lifetime_secs(&self) -> u64 {
        u64::try_from(self.exp.saturating_sub(self.iat)).unwrap_or(0)
    }

    /// `user_id` wins over `sub`
    pub fn identity(&self) -> ClaimedIdentity {
        if let Some(id) = self.user_id {
            return ClaimedIdentity::User(id);
        }
        match self.sub.as_deref() {
            None => ClaimedIdentity::Unspecified,
            Some(sub) => match sub.parse::<i64>() {
                Ok(id) => ClaimedIdentity::User(id),
                Err(_) => ClaimedIdentity::Foreign(sub.to_string()),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("token lifetime of {0} hours is out of range (1..={max})", max = MAX_TOKEN_EXPIRY_HOURS)]
    InvalidExpiry(u64),

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    /// The presented token is malformed, badly signed or expired
    #[error("invalid token: {0}")]
    Rejected(jsonwebtoken::errors::Error),

    /// Verification could not run (key or crypto setup)
    #[error("token verification failed: {0}")]
    Verifier(jsonwebtoken::errors::Error),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify an HS256 token and decode its claims. `exp` is required.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(classify)
}

fn classify(err: jsonwebtoken::errors::Error) -> JwtError {
    let rejected = matches!(
        err.kind(),
        ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::ExpiredSignature
            | ErrorKind::ImmatureSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingAlgorithm
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
    );

    if rejected {
        JwtError::Rejected(err)
    } else {
        JwtError::Verifier(err)
    }
}
