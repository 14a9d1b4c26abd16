use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};

use bullpen_types::{FeedPost, Paginated};

use crate::api::auth::require_user;
use crate::api::{ApiResult, PageQuery};
use crate::services::FeedService;
use crate::state::AppState;

/// GET /feed - Reverse-chronological home feed without muted or blocked authors
pub async fn home_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<FeedPost>>> {
    let viewer = require_user(&headers)?;
    let feed = FeedService::new(&state.db).home_feed(&viewer, page.into())?;
    Ok(Json(feed))
}
