//! Caller identity.
//!
//! The gateway in front of this service authenticates requests and passes
//! the caller's id in `X-User-Id`. Nothing here inspects credentials.

use axum::{extract::State, http::HeaderMap, Json};
use uuid::Uuid;

use bullpen_types::{BootstrapUserRequest, User};

use crate::api::{ApiError, ApiResult};
use crate::db::repositories::UserRepository;
use crate::services::UserService;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Caller id for endpoints that require one
pub fn require_user(headers: &HeaderMap) -> ApiResult<Uuid> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::Unauthorized("Invalid X-User-Id header".to_string()))
}

/// Caller id for mutations: the caller must already have a user row
pub fn require_member(state: &AppState, headers: &HeaderMap) -> ApiResult<Uuid> {
    let user_id = require_user(headers)?;
    if !UserRepository::new(state.db.pool.clone()).exists(&user_id)? {
        return Err(ApiError::Unauthorized(
            "Unknown user, call POST /users/me first".to_string(),
        ));
    }
    Ok(user_id)
}

/// Caller id for public endpoints; anonymous when absent or malformed
pub fn optional_user(headers: &HeaderMap) -> Option<Uuid> {
    let raw = headers.get(USER_ID_HEADER)?.to_str().ok()?;
    Uuid::parse_str(raw.trim()).ok()
}

/// POST /users/me - Get or create the caller's user row
pub async fn bootstrap_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BootstrapUserRequest>,
) -> ApiResult<Json<User>> {
    let user_id = require_user(&headers)?;
    let user = UserService::new(&state.db).get_or_create(&user_id, &request.username, &request.display_name)?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_parsing() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        assert!(require_user(&headers).is_err());
        assert_eq!(optional_user(&headers), None);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(require_user(&headers), Err(ApiError::Unauthorized(_))));
        assert_eq!(optional_user(&headers), None);

        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(require_user(&headers).unwrap(), id);
        assert_eq!(optional_user(&headers), Some(id));
    }
}
