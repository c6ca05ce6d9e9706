//! Owner view of the RSVP inbox.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use domain::models::RsvpResponse;
use domain::SiteError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpListResponse {
    pub data: Vec<RsvpResponse>,
    pub total: usize,
    pub confirmed: usize,
    pub declined: usize,
}

impl RsvpListResponse {
    pub fn new(data: Vec<RsvpResponse>) -> Self {
        let confirmed = data.iter().filter(|r| r.confirmed).count();
        Self {
            total: data.len(),
            declined: data.len() - confirmed,
            confirmed,
            data,
        }
    }
}

/// RSVP responses for the owner's site, newest first.
///
/// GET /api/v1/site/rsvps
pub async fn list_rsvps(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<RsvpListResponse>, ApiError> {
    let responses = match state.sites.responses(auth.user_id).await {
        Ok(responses) => responses,
        // No site yet means an empty inbox, not an error.
        Err(SiteError::SiteNotFound) => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    Ok(Json(RsvpListResponse::new(responses)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn response(confirmed: bool) -> RsvpResponse {
        RsvpResponse {
            id: Uuid::new_v4(),
            site_id: Uuid::new_v4(),
            guest_name: "Maria".into(),
            email: None,
            phone: Some("11999999999".into()),
            confirmed,
            message: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_totals() {
        let list = RsvpListResponse::new(vec![response(true), response(false), response(true)]);
        assert_eq!(list.total, 3);
        assert_eq!(list.confirmed, 2);
        assert_eq!(list.declined, 1);
    }
}
