//! Owner JWT authentication extractors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::UserAuth as UserAuthData;

/// Authenticated owner.
///
/// Reuses the identity inserted by `require_user_auth` when the route is
/// behind it, otherwise validates the Bearer token itself.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: Uuid,
    pub jti: String,
}

impl From<UserAuthData> for UserAuth {
    fn from(data: UserAuthData) -> Self {
        Self {
            user_id: data.user_id,
            jti: data.jti,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<UserAuthData>() {
            return Ok(auth.clone().into());
        }

        match UserAuthData::from_headers(&state.jwt, &parts.headers) {
            Some(Ok(auth)) => Ok(auth.into()),
            Some(Err(_)) => Err(ApiError::Unauthorized("Invalid or expired token".into())),
            None => Err(ApiError::Unauthorized(
                "Missing Authorization header".into(),
            )),
        }
    }
}
