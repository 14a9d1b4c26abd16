use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use bullpen_types::{CommentView, CreateCommentRequest, Paginated, ReactionOutcome};

use crate::api::auth::{optional_user, require_member, require_user};
use crate::api::{ApiResult, PageQuery};
use crate::services::{CommentService, ReactionService};
use crate::state::AppState;

/// GET /posts/:id/comments - Newest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<CommentView>>> {
    let viewer = optional_user(&headers);
    let comments = CommentService::new(&state.db).list_comments(&post_id, viewer.as_ref(), page.into())?;
    Ok(Json(comments))
}

/// POST /posts/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let user_id = require_member(&state, &headers)?;
    let comment = CommentService::new(&state.db).create_comment(&post_id, &user_id, request)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /comments/:id - Soft delete (author only)
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let user_id = require_user(&headers)?;
    CommentService::new(&state.db).delete_comment(&comment_id, &user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /comments/:id/reactions - Toggle like
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<ReactionOutcome>> {
    let user_id = require_member(&state, &headers)?;
    let outcome = ReactionService::new(&state.db).toggle_comment_reaction(&user_id, &comment_id)?;
    Ok(Json(outcome))
}
