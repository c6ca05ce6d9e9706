//! Browser session for the owner's own public page.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::user_auth::bearer_token;

/// Store the owner's access token in an httpOnly cookie.
///
/// POST /api/v1/session
pub async fn create_session(
    State(state): State<AppState>,
    auth: UserAuth,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    if !state.cookies.is_enabled() {
        return Err(ApiError::NotFound("Cookie sessions are disabled".into()));
    }
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing or invalid Authorization header".into()))?;

    let mut response_headers = HeaderMap::new();
    state.cookies.add_session_cookie(&mut response_headers, token);
    tracing::debug!(user_id = %auth.user_id, jti = %auth.jti, "Owner session cookie set");
    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// Expire the session cookie.
///
/// DELETE /api/v1/session
pub async fn delete_session(State(state): State<AppState>) -> (StatusCode, HeaderMap) {
    let mut headers = HeaderMap::new();
    state.cookies.add_clear_cookie(&mut headers);
    (StatusCode::NO_CONTENT, headers)
}
