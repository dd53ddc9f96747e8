use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::app::AppState;
use crate::auth::{verify_jwt, ClaimedIdentity, JwtError};
use crate::config::AppConfig;
use crate::error::ApiError;

/// Dedicated header carrying the shared secret
pub const SHARED_SECRET_HEADER: &str = "x-shared-secret";

/// How the request proved itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Bearer,
    SharedSecret,
}

/// Resolved identity injected into request extensions for downstream handlers
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub method: AuthMethod,
}

/// Everything the gate needs to judge a request
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub user_id: i64,
    pub jwt_secret: Option<String>,
    pub shared_secret: Option<String>,
}

impl AuthSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            user_id: config.tenant.user_id,
            jwt_secret: config.security.jwt_secret.clone(),
            shared_secret: config.security.shared_secret.clone(),
        }
    }
}

/// Credentials found on a request
#[derive(Debug, Default)]
struct Presented<'a> {
    bearer: Option<&'a str>,
    shared: Option<&'a [u8]>,
    /// `Authorization` was sent but is not visible ASCII
    malformed: bool,
}

impl<'a> Presented<'a> {
    fn from_headers(headers: &'a HeaderMap) -> Self {
        let mut presented = Presented::default();

        if let Some(header) = headers.get(AUTHORIZATION) {
            let Ok(value) = header.to_str() else {
                presented.malformed = true;
                return presented;
            };
            let (scheme, credential) = value.split_once(' ').unwrap_or((value, ""));
            if scheme.eq_ignore_ascii_case("bearer") {
                presented.bearer = Some(credential.trim());
            } else if scheme.eq_ignore_ascii_case("shared") {
                presented.shared = Some(credential.as_bytes());
            }
        }

        if presented.shared.is_none() {
            presented.shared = headers.get(SHARED_SECRET_HEADER).map(|v| v.as_bytes());
        }

        presented
    }
}

pub(crate) fn unauthorized() -> ApiError {
    ApiError::unauthorized("Unauthorized")
}

/// Judge one request. The bearer token, when present, is the only thing
/// considered; the shared secret is a fallback for requests without one.
pub fn authenticate(headers: &HeaderMap, settings: &AuthSettings) -> Result<AuthUser, ApiError> {
    let presented = Presented::from_headers(headers);

    if presented.malformed {
        tracing::debug!("Rejected non-ASCII Authorization header");
        return Err(unauthorized());
    }

    if let Some(token) = presented.bearer {
        return authenticate_bearer(token, settings);
    }

    if let Some(candidate) = presented.shared {
        if shared_secret_matches(candidate, settings) {
            return Ok(AuthUser {
                user_id: settings.user_id,
                method: AuthMethod::SharedSecret,
            });
        }
        tracing::debug!("Shared secret mismatch");
    }

    Err(unauthorized())
}

/// Constant-time, byte-for-byte comparison. Never matches when no secret is configured.
pub fn shared_secret_matches(candidate: &[u8], settings: &AuthSettings) -> bool {
    match settings.shared_secret.as_deref() {
        Some(expected) => bool::from(candidate.ct_eq(expected.as_bytes())),
        None => false,
    }
}

fn authenticate_bearer(token: &str, settings: &AuthSettings) -> Result<AuthUser, ApiError> {
    let Some(secret) = settings.jwt_secret.as_deref() else {
        tracing::error!("Bearer token presented but JWT_SECRET is not configured");
        return Err(unauthorized());
    };

    let claims = verify_jwt(token, secret).map_err(bearer_failure)?;

    let user_id = match claims.identity() {
        ClaimedIdentity::Unspecified => settings.user_id,
        ClaimedIdentity::User(id) if id == settings.user_id => id,
        ClaimedIdentity::User(id) => {
            tracing::warn!("Token for user {} rejected; deployment serves user {}", id, settings.user_id);
            return Err(ApiError::forbidden("Forbidden"));
        }
        ClaimedIdentity::Foreign(sub) => {
            tracing::warn!("Token subject '{}' is not a user id of this deployment", sub);
            return Err(ApiError::forbidden("Forbidden"));
        }
    };

    Ok(AuthUser {
        user_id,
        method: AuthMethod::Bearer,
    })
}

/// Bad tokens are the caller's fault (401); anything else is ours (500)
fn bearer_failure(err: JwtError) -> ApiError {
    match err {
        JwtError::Rejected(err) => {
            tracing::debug!("Rejected bearer token: {}", err);
            unauthorized()
        }
        other => {
            tracing::error!("Bearer token verification error: {}", other);
            ApiError::internal_server_error("Internal server error")
        }
    }
}

/// Request filter for `/api/*`: bootstrap the principal, then admit or reject.
pub async fn single_tenant_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Err(e) = state.bootstrap.ensure_principal().await {
        return ApiError::from(e).into_response();
    }

    match authenticate(request.headers(), &state.auth) {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
