use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use uuid::Uuid;

use bullpen_types::{PollInfo, VoteOutcome, VoteRequest};

use crate::api::auth::{optional_user, require_member};
use crate::api::ApiResult;
use crate::services::PollService;
use crate::state::AppState;

/// POST /polls/:id/votes
pub async fn vote(
    State(state): State<AppState>,
    Path(poll_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<VoteRequest>,
) -> ApiResult<Json<VoteOutcome>> {
    let user_id = require_member(&state, &headers)?;
    let outcome = PollService::new(&state.db).vote(&poll_id, &user_id, request.option_index)?;
    Ok(Json(outcome))
}

/// GET /polls/:id/results
pub async fn get_results(
    State(state): State<AppState>,
    Path(poll_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<PollInfo>> {
    let viewer = optional_user(&headers);
    let info = PollService::new(&state.db).results(&poll_id, viewer.as_ref())?;
    Ok(Json(info))
}
