use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use bullpen_types::{
    ContentFilters, FeedPost, FollowEntry, FollowOutcome, Paginated, ReplyItem, UpdateProfileRequest, User,
    UserProfile,
};

use crate::api::auth::{optional_user, require_member, require_user};
use crate::api::{ApiError, ApiResult, PageQuery, RemovedResponse};
use crate::services::{ContentFilterService, FeedService, FollowService, UserService};
use crate::state::AppState;

/// PATCH /users/me - Update display name, bio or picture
pub async fn update_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    let user_id = require_member(&state, &headers)?;
    let user = UserService::new(&state.db).update_profile(&user_id, request)?;
    Ok(Json(user))
}

/// GET /users/:id - Profile with counts and the caller's relationship to it
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<UserProfile>> {
    let viewer = optional_user(&headers);
    let profile = UserService::new(&state.db).profile(&user_id, viewer.as_ref())?;
    Ok(Json(profile))
}

/// GET /users/:id/posts - Own posts and normal reposts, newest first
pub async fn get_posts(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<FeedPost>>> {
    let viewer = optional_user(&headers);
    let posts = FeedService::new(&state.db).profile_timeline(&user_id, viewer.as_ref(), page.into())?;
    Ok(Json(posts))
}

/// GET /users/:id/replies
pub async fn get_replies(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<ReplyItem>>> {
    let viewer = optional_user(&headers);
    let replies = FeedService::new(&state.db).replies_by_user(&user_id, viewer.as_ref(), page.into())?;
    Ok(Json(replies))
}

/// GET /users/:id/likes - Ordered by when the post was liked
pub async fn get_likes(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<FeedPost>>> {
    let viewer = optional_user(&headers);
    let posts = FeedService::new(&state.db).liked_posts(&user_id, viewer.as_ref(), page.into())?;
    Ok(Json(posts))
}

/// POST /users/:id/follow
pub async fn follow(
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<FollowOutcome>> {
    let user_id = require_member(&state, &headers)?;
    let outcome = FollowService::new(&state.db).follow(&user_id, &target_id)?;
    Ok(Json(outcome))
}

/// DELETE /users/:id/follow
pub async fn unfollow(
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<FollowOutcome>> {
    let user_id = require_user(&headers)?;
    let service = FollowService::new(&state.db);
    let follower_count = service
        .unfollow(&user_id, &target_id)?
        .ok_or_else(|| ApiError::NotFound("Not following this user".to_string()))?;
    Ok(Json(FollowOutcome {
        following: false,
        follower_count,
    }))
}

/// GET /users/:id/followers
pub async fn get_followers(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<FollowEntry>>> {
    let followers = FollowService::new(&state.db).followers(&user_id, page.into())?;
    Ok(Json(followers))
}

/// GET /users/:id/following
pub async fn get_following(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<FollowEntry>>> {
    let following = FollowService::new(&state.db).following(&user_id, page.into())?;
    Ok(Json(following))
}

/// POST /users/:id/mute
pub async fn mute(
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let user_id = require_member(&state, &headers)?;
    ContentFilterService::new(&state.db).mute(&user_id, &target_id)?;
    Ok(StatusCode::CREATED)
}

/// DELETE /users/:id/mute
pub async fn unmute(
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<RemovedResponse>> {
    let user_id = require_user(&headers)?;
    let removed = ContentFilterService::new(&state.db).unmute(&user_id, &target_id)?;
    Ok(Json(RemovedResponse { removed }))
}

/// POST /users/:id/block
pub async fn block(
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let user_id = require_member(&state, &headers)?;
    ContentFilterService::new(&state.db).block(&user_id, &target_id)?;
    Ok(StatusCode::CREATED)
}

/// DELETE /users/:id/block
pub async fn unblock(
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<RemovedResponse>> {
    let user_id = require_user(&headers)?;
    let removed = ContentFilterService::new(&state.db).unblock(&user_id, &target_id)?;
    Ok(Json(RemovedResponse { removed }))
}

/// GET /me/filters - Everyone the caller muted or blocked
pub async fn get_filters(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ContentFilters>> {
    let user_id = require_user(&headers)?;
    let filters = ContentFilterService::new(&state.db).filters(&user_id)?;
    Ok(Json(filters))
}

/// GET /me/bookmarks - Ordered by when the bookmark was made
pub async fn get_bookmarks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<FeedPost>>> {
    let user_id = require_user(&headers)?;
    let bookmarks = FeedService::new(&state.db).bookmarks(&user_id, page.into())?;
    Ok(Json(bookmarks))
}
