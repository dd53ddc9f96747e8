use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::database::models::{Holding, HoldingInput};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::{not_found, parse_draft, parse_id};

/// GET /api/holdings/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Holding> {
    let id = parse_id(&id)?;
    let holding = state.holdings.get(user.user_id, id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(holding))
}

/// PUT /api/holdings/:id - replace every mutable field
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<HoldingInput>, JsonRejection>,
) -> ApiResult<Holding> {
    let id = parse_id(&id)?;
    let draft = parse_draft(payload)?;
    let holding = state
        .holdings
        .update(user.user_id, id, &draft)
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success(holding))
}

/// DELETE /api/holdings/:id (204)
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    if !state.holdings.delete(user.user_id, id).await? {
        return Err(not_found());
    }
    Ok(ApiResponse::no_content())
}
