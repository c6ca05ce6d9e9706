//! Owner JWT authentication middleware.
//!
//! Owner routes require a Bearer access token issued by the account service.
//! The token subject is the owner id every site and guest is scoped to.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::CookieHelper;
use shared::jwt::{extract_user_id, JwtConfig};

/// Authenticated owner extracted from the JWT.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// Owner id from the JWT subject claim.
    pub user_id: Uuid,
    /// JWT ID (jti), logged for session tracing.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token and returns the owner it belongs to.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_access_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;
        let user_id = extract_user_id(&claims).map_err(|_| "Invalid user ID in token".to_string())?;

        Ok(UserAuth {
            user_id,
            jti: claims.jti,
        })
    }

    /// Validates the Bearer token of a request, if it carries one.
    pub fn from_headers(jwt_config: &JwtConfig, headers: &HeaderMap) -> Option<Result<Self, String>> {
        bearer_token(headers).map(|token| Self::validate(jwt_config, token))
    }

    /// Signed-in viewer of a public page, from the Bearer header or else the
    /// session cookie. Invalid credentials count as anonymous.
    pub fn viewer(
        jwt_config: &JwtConfig,
        cookies: &CookieHelper,
        headers: &HeaderMap,
    ) -> Option<Self> {
        let token = bearer_token(headers).or_else(|| cookies.session_token(headers))?;
        Self::validate(jwt_config, token).ok()
    }
}

/// Bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that requires owner authentication.
///
/// The validated [`UserAuth`] is stored in request extensions for handlers.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match UserAuth::from_headers(&state.jwt, req.headers()) {
        Some(Ok(auth)) => {
            tracing::debug!(user_id = %auth.user_id, jti = %auth.jti, "Owner authenticated");
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Some(Err(e)) => {
            tracing::debug!("JWT validation failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".into()).into_response()
        }
        None => {
            ApiError::Unauthorized("Missing or invalid Authorization header".into()).into_response()
        }
    }
}
