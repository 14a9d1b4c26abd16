use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use bullpen_types::{AddRecentSearchRequest, Paginated, RecentSearch, TickerSummary, UserSummary};

use crate::api::auth::{require_member, require_user};
use crate::api::{ApiError, ApiResult};
use crate::pagination::PageRequest;
use crate::services::{RecentSearchService, SearchService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl SearchQuery {
    fn page(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

/// GET /search/users?q=query - Username or display name substring
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Paginated<UserSummary>>> {
    let users = SearchService::new(&state.db).users(&query.q, query.page())?;
    Ok(Json(users))
}

/// GET /search/tickers?q=query - Symbol or name substring
pub async fn search_tickers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Paginated<TickerSummary>>> {
    let tickers = SearchService::new(&state.db).tickers(&query.q, query.page())?;
    Ok(Json(tickers))
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

/// GET /me/recent-searches - Newest first, at most 20
pub async fn get_recent_searches(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Vec<RecentSearch>>> {
    let user_id = require_user(&headers)?;
    let entries = RecentSearchService::new(&state.db).list(&user_id, query.limit)?;
    Ok(Json(entries))
}

/// POST /me/recent-searches - Record a selected result, moving repeats to the top
pub async fn add_recent_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddRecentSearchRequest>,
) -> ApiResult<(StatusCode, Json<RecentSearch>)> {
    let user_id = require_member(&state, &headers)?;
    let entry = RecentSearchService::new(&state.db).add(&user_id, request)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /me/recent-searches
pub async fn clear_recent_searches(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let user_id = require_user(&headers)?;
    RecentSearchService::new(&state.db).clear(&user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /me/recent-searches/:id
pub async fn remove_recent_search(
    State(state): State<AppState>,
    Path(search_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let user_id = require_user(&headers)?;
    if !RecentSearchService::new(&state.db).remove(&user_id, &search_id)? {
        return Err(ApiError::NotFound("Recent search not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
