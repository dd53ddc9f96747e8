use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::PortfolioSummary;

/// GET /api/portfolio/summary - totals per kind and net worth per currency
pub async fn summary(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<PortfolioSummary> {
    let holdings = state.holdings.list(user.user_id, None).await?;
    Ok(ApiResponse::success(PortfolioSummary::from_holdings(&holdings)))
}
