use axum::{
    extract::{Query, State},
    Json,
};

use bullpen_types::{ActiveUser, EngagementMetrics};

use crate::api::tickers::LimitQuery;
use crate::api::ApiResult;
use crate::services::MetricsService;
use crate::state::AppState;

/// GET /metrics/engagement
pub async fn get_engagement(State(state): State<AppState>) -> ApiResult<Json<EngagementMetrics>> {
    let metrics = MetricsService::new(&state.db).engagement()?;
    Ok(Json(metrics))
}

/// GET /metrics/active-users?limit=N
pub async fn get_active_users(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<ActiveUser>>> {
    let users = MetricsService::new(&state.db).most_active_users(query.limit)?;
    Ok(Json(users))
}
