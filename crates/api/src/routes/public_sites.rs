//! JSON API for published sites, used by clients that render the page
//! themselves.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_guest_sync, record_rsvp_rejected, record_rsvp_submitted};
use crate::middleware::user_auth::UserAuth;
use domain::models::{PublicSite, RsvpSubmission};
use domain::SiteError;

/// Acknowledgement returned to the guest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpAck {
    pub id: Uuid,
    pub guest_name: String,
    pub confirmed: bool,
    pub duplicate: bool,
    pub created_at: DateTime<Utc>,
}

/// Public projection plus whether the signed-in viewer owns it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSiteResponse {
    #[serde(flatten)]
    pub site: PublicSite,
    /// Show the way back to the editor.
    pub viewer_is_owner: bool,
}

/// Published content for a slug.
///
/// GET /api/v1/public/sites/:slug
pub async fn get_public_site(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PublicSiteResponse>, ApiError> {
    let record = state.sites.public_by_slug(&slug).await?;
    let viewer_is_owner = UserAuth::viewer(&state.jwt, &state.cookies, &headers)
        .is_some_and(|viewer| viewer.user_id == record.owner_id);
    Ok(Json(PublicSiteResponse {
        site: PublicSite::from(record),
        viewer_is_owner,
    }))
}

/// Submit an RSVP.
///
/// POST /api/v1/public/sites/:slug/rsvps
///
/// 201 for a new response, 200 when the submission repeats one already
/// stored inside the dedup window.
pub async fn submit_rsvp(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(submission): Json<RsvpSubmission>,
) -> Result<(StatusCode, Json<RsvpAck>), ApiError> {
    let receipt = match state.rsvps.submit(&slug, submission).await {
        Ok(receipt) => receipt,
        Err(e) => {
            record_rsvp_rejected(rejection_reason(&e));
            return Err(e.into());
        }
    };

    record_rsvp_submitted(receipt.duplicate);
    record_guest_sync(receipt.sync.as_str());

    let status = if receipt.duplicate {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let response = receipt.response;
    Ok((
        status,
        Json(RsvpAck {
            id: response.id,
            guest_name: response.guest_name,
            confirmed: response.confirmed,
            duplicate: receipt.duplicate,
            created_at: response.created_at,
        }),
    ))
}

/// Metric label for a refused submission.
pub fn rejection_reason(error: &SiteError) -> &'static str {
    match error {
        SiteError::SiteNotFound => "site_not_found",
        SiteError::RsvpClosed => "closed",
        SiteError::Validation(_) => "validation",
        _ => "failed",
    }
}
