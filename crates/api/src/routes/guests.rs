//! Owner guest list endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use domain::models::{
    CreateGuestRequest, GuestListResponse, GuestOrigin, GuestPatch, GuestRecord, NewGuest,
    UpdateGuestRequest,
};

/// Active guests with attendance totals.
///
/// GET /api/v1/guests
pub async fn list_guests(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<GuestListResponse>, ApiError> {
    let guests = state.guests.list(auth.user_id).await?;
    Ok(Json(GuestListResponse::new(guests)))
}

/// Add a guest by hand.
///
/// POST /api/v1/guests
pub async fn create_guest(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateGuestRequest>,
) -> Result<(StatusCode, Json<GuestRecord>), ApiError> {
    request.validate()?;

    let guest = state
        .guests
        .create(NewGuest {
            owner_id: auth.user_id,
            name: request.name.trim().to_string(),
            category: request.category,
            confirmed: request.confirmed,
            plus_ones: request.plus_ones,
            origin: GuestOrigin::Manual,
        })
        .await?;

    tracing::info!(owner_id = %auth.user_id, guest_id = %guest.id, "Guest created");
    Ok((StatusCode::CREATED, Json(guest)))
}

/// Edit a guest.
///
/// PATCH /api/v1/guests/:guest_id
pub async fn update_guest(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(guest_id): Path<Uuid>,
    Json(request): Json<UpdateGuestRequest>,
) -> Result<Json<GuestRecord>, ApiError> {
    request.validate()?;

    let patch = GuestPatch::from(request);
    if patch.is_empty() {
        return Err(ApiError::Validation("No fields to update".into()));
    }

    state
        .guests
        .update(auth.user_id, guest_id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Guest not found".into()))
}

/// Remove a guest. RSVP sync will not bring it back.
///
/// DELETE /api/v1/guests/:guest_id
pub async fn delete_guest(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(guest_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.guests.delete(auth.user_id, guest_id).await? {
        tracing::info!(owner_id = %auth.user_id, guest_id = %guest_id, "Guest deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Guest not found".into()))
    }
}
