use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service descriptor
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Folio API",
            "version": version,
            "description": "Single-tenant portfolio tracking backend",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "token": "/auth/token (public - exchange shared secret for bearer token)",
                "whoami": "/api/auth/whoami (protected)",
                "holdings": "/api/holdings[/:id] (protected)",
                "summary": "/api/portfolio/summary (protected)",
            }
        }
    }))
}

/// GET /health - liveness plus storage ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.principals.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "principal_ready": state.bootstrap.is_ready()
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
