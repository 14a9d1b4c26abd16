use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use bullpen_types::{AddWatchlistRequest, FeedPost, Paginated, Ticker, TrendingTicker, WatchlistEntry};

use crate::api::auth::{optional_user, require_member, require_user};
use crate::api::{ApiResult, PageQuery, RemovedResponse};
use crate::services::{FeedService, MetricsService, WatchlistService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// GET /tickers/:symbol/posts - Posts mentioning a symbol, newest first
pub async fn get_ticker_posts(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<FeedPost>>> {
    let viewer = optional_user(&headers);
    let posts = FeedService::new(&state.db).ticker_timeline(&symbol, viewer.as_ref(), page.into())?;
    Ok(Json(posts))
}

/// GET /tickers/trending?limit=N
pub async fn get_trending(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<TrendingTicker>>> {
    let tickers = MetricsService::new(&state.db).trending_tickers(query.limit)?;
    Ok(Json(tickers))
}

/// GET /watchlist
pub async fn get_watchlist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<WatchlistEntry>>> {
    let user_id = require_user(&headers)?;
    let entries = WatchlistService::new(&state.db).list(&user_id, page.into())?;
    Ok(Json(entries))
}

/// POST /watchlist
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddWatchlistRequest>,
) -> ApiResult<(StatusCode, Json<Ticker>)> {
    let user_id = require_member(&state, &headers)?;
    let ticker = WatchlistService::new(&state.db).add(&user_id, &request.symbol)?;
    Ok((StatusCode::CREATED, Json(ticker)))
}

/// DELETE /watchlist/:symbol
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<RemovedResponse>> {
    let user_id = require_user(&headers)?;
    let removed = WatchlistService::new(&state.db).remove(&user_id, &symbol)?;
    Ok(Json(RemovedResponse { removed }))
}
