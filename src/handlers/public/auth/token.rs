use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{generate_jwt, Claims, JwtError};
use crate::error::ApiError;
use crate::middleware::auth::{shared_secret_matches, unauthorized};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub secret: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user_id: i64,
}

/// POST /auth/token - exchange the shared secret for a bearer token
///
/// Expected Input:
/// ```json
/// { "secret": "string" }
/// ```
///
/// The token is issued for the configured user and expires after
/// `SECURITY_JWT_EXPIRY_HOURS`.
pub async fn token_post(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    if !shared_secret_matches(request.secret.as_bytes(), &state.auth) {
        return Err(unauthorized());
    }

    let Some(signing_secret) = state.auth.jwt_secret.as_deref() else {
        tracing::error!("Token requested but JWT_SECRET is not configured");
        return Err(ApiError::internal_server_error("Token issuance is not configured"));
    };

    let token_error = |e: JwtError| {
        tracing::error!("Failed to issue token: {}", e);
        ApiError::internal_server_error("Internal server error")
    };
    let claims = Claims::new(state.auth.user_id, state.token_expiry_hours).map_err(token_error)?;
    let token = generate_jwt(&claims, signing_secret).map_err(token_error)?;

    tracing::info!("Issued bearer token for user {}", state.auth.user_id);

    Ok(ApiResponse::success(TokenResponse {
        token,
        token_type: "Bearer",
        expires_in: claims.lifetime_secs(),
        user_id: state.auth.user_id,
    }))
}
