use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use bullpen_types::{CreatePostRequest, CreateRepostRequest, FeedPost, ReactionOutcome, RepostOutcome};

use crate::api::auth::{optional_user, require_member, require_user};
use crate::api::{ApiResult, RemovedResponse};
use crate::services::{BookmarkService, PostService, ReactionService, RepostService};
use crate::state::AppState;

/// POST /posts - Create a post, optionally with a poll
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<FeedPost>)> {
    let user_id = require_member(&state, &headers)?;
    let post = PostService::new(&state.db).create_post(&user_id, request)?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<FeedPost>> {
    let viewer = optional_user(&headers);
    let post = PostService::new(&state.db).get_post(&post_id, viewer.as_ref())?;
    Ok(Json(post))
}

/// DELETE /posts/:id - Soft delete (author only)
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let user_id = require_user(&headers)?;
    PostService::new(&state.db).delete_post(&post_id, &user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /posts/:id/reactions - Toggle like
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<ReactionOutcome>> {
    let user_id = require_member(&state, &headers)?;
    let outcome = ReactionService::new(&state.db).toggle_post_reaction(&user_id, &post_id)?;
    Ok(Json(outcome))
}

/// POST /posts/:id/reposts - Normal or quote repost
pub async fn repost(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<CreateRepostRequest>,
) -> ApiResult<(StatusCode, Json<RepostOutcome>)> {
    let user_id = require_member(&state, &headers)?;
    let outcome = RepostService::new(&state.db).repost(&user_id, &post_id, request.into())?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// DELETE /posts/:id/reposts
pub async fn undo_repost(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<RemovedResponse>> {
    let user_id = require_user(&headers)?;
    let removed = RepostService::new(&state.db).undo_repost(&user_id, &post_id)?;
    Ok(Json(RemovedResponse { removed }))
}

/// POST /posts/:id/bookmark
pub async fn bookmark(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let user_id = require_member(&state, &headers)?;
    BookmarkService::new(&state.db).add(&user_id, &post_id)?;
    Ok(StatusCode::CREATED)
}

/// DELETE /posts/:id/bookmark
pub async fn unbookmark(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<RemovedResponse>> {
    let user_id = require_user(&headers)?;
    let removed = BookmarkService::new(&state.db).remove(&user_id, &post_id)?;
    Ok(Json(RemovedResponse { removed }))
}
