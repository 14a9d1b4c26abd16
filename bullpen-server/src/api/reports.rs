use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use bullpen_types::{CreateReportRequest, Paginated, Report};

use crate::api::auth::{require_member, require_user};
use crate::api::{ApiResult, PageQuery};
use crate::services::ReportService;
use crate::state::AppState;

/// POST /reports - Report exactly one post, comment or user
pub async fn create_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateReportRequest>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let user_id = require_member(&state, &headers)?;
    let report = ReportService::new(&state.db).create(&user_id, request)?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /reports - Reports filed by the caller, newest first
pub async fn list_reports(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<Report>>> {
    let user_id = require_user(&headers)?;
    let reports = ReportService::new(&state.db).list_mine(&user_id, page.into())?;
    Ok(Json(reports))
}
