//! HTTP route handlers.

pub mod guests;
pub mod health;
pub mod media;
pub mod photos;
pub mod public_sites;
pub mod rsvps;
pub mod session;
pub mod site;

use crate::error::ApiError;

/// JSON 404 for anything no route matched.
pub async fn fallback() -> ApiError {
    ApiError::NotFound("Route not found".into())
}
