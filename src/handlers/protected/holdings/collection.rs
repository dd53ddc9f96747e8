use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{Holding, HoldingInput, HoldingKind};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::parse_draft;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub kind: Option<String>,
}

/// GET /api/holdings[?kind=stock] - list holdings ordered by kind, then name
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Holding>> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<HoldingKind>)
        .transpose()
        .map_err(ApiError::bad_request)?;

    let holdings = state.holdings.list(user.user_id, kind).await?;
    Ok(ApiResponse::success(holdings))
}

/// POST /api/holdings - create a holding (201)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<HoldingInput>, JsonRejection>,
) -> ApiResult<Holding> {
    let draft = parse_draft(payload)?;
    let holding = state.holdings.create(user.user_id, &draft).await?;

    tracing::debug!("Created {} holding {} for user {}", holding.kind, holding.id, user.user_id);
    Ok(ApiResponse::created(holding))
}
