//! Photo upload endpoints for the owner's site.
//!
//! Uploads are multipart forms with a `photo` file field. An optional
//! `content` field carries the editor's unsaved buffer as JSON so pending
//! edits are saved together with the photo.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;

use crate::app::AppState;
use crate::config::MediaConfig;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::{record_photo_uploaded, record_site_saved};
use crate::routes::site::SiteEditorResponse;
use crate::services::detect_image;
use domain::models::SiteContent;
use domain::services::{PhotoSlot, PhotoUpload, SaveMode, SiteEditor};

/// Allowance for multipart boundaries and the `content` field.
const MULTIPART_OVERHEAD: usize = 256 * 1024;

/// Request body limit for the upload routes.
pub fn body_limit(config: &MediaConfig) -> usize {
    config.max_upload_bytes + MULTIPART_OVERHEAD
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub url: String,
    #[serde(flatten)]
    pub editor: SiteEditorResponse,
}

struct PhotoForm {
    photo: PhotoUpload,
    content: Option<SiteContent>,
}

async fn read_form(mut multipart: Multipart, max_bytes: usize) -> Result<PhotoForm, ApiError> {
    let mut photo = None;
    let mut content = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("photo") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read photo: {}", e)))?;
                if bytes.is_empty() {
                    return Err(ApiError::Validation("Photo is empty".into()));
                }
                if bytes.len() > max_bytes {
                    return Err(ApiError::PayloadTooLarge(format!(
                        "Photo exceeds {} bytes",
                        max_bytes
                    )));
                }
                let kind = detect_image(&bytes).ok_or_else(|| {
                    ApiError::Validation("Only JPEG, PNG, GIF and WebP images are accepted".into())
                })?;
                photo = Some(PhotoUpload {
                    bytes: bytes.to_vec(),
                    content_type: kind.content_type,
                    extension: kind.extension,
                });
            }
            Some("content") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read content: {}", e)))?;
                let parsed: SiteContent = serde_json::from_str(&text)
                    .map_err(|e| ApiError::Validation(format!("Invalid content: {}", e)))?;
                content = Some(parsed);
            }
            _ => {}
        }
    }

    let photo = photo.ok_or_else(|| ApiError::Validation("Missing photo field".into()))?;
    Ok(PhotoForm { photo, content })
}

async fn upload(
    state: AppState,
    auth: UserAuth,
    slot: PhotoSlot,
    multipart: Multipart,
) -> Result<Json<PhotoResponse>, ApiError> {
    let form = read_form(multipart, state.config.media.max_upload_bytes).await?;

    let mut editor = SiteEditor::open(state.sites.clone(), auth.user_id).await?;
    if let Some(content) = form.content {
        editor.replace_buffer(content);
    }
    let url = editor
        .upload_photo(state.storage.as_ref(), slot, form.photo)
        .await?;

    record_photo_uploaded(slot.as_str());
    record_site_saved(SaveMode::AutoSave.as_str());

    Ok(Json(PhotoResponse {
        url,
        editor: SiteEditorResponse::from_editor(&editor, &state),
    }))
}

/// Replace the hero photo.
///
/// POST /api/v1/site/photos/hero
pub async fn upload_hero(
    State(state): State<AppState>,
    auth: UserAuth,
    multipart: Multipart,
) -> Result<Json<PhotoResponse>, ApiError> {
    upload(state, auth, PhotoSlot::Hero, multipart).await
}

/// Append a photo to the album.
///
/// POST /api/v1/site/photos/album
pub async fn upload_album_photo(
    State(state): State<AppState>,
    auth: UserAuth,
    multipart: Multipart,
) -> Result<Json<PhotoResponse>, ApiError> {
    upload(state, auth, PhotoSlot::Album, multipart).await
}

/// Remove an album photo by position.
///
/// DELETE /api/v1/site/photos/album/:index
pub async fn delete_album_photo(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(index): Path<usize>,
) -> Result<Json<PhotoResponse>, ApiError> {
    let mut editor = SiteEditor::open(state.sites.clone(), auth.user_id).await?;
    let url = editor.remove_album_photo(index).await?;
    record_site_saved(SaveMode::AutoSave.as_str());

    Ok(Json(PhotoResponse {
        url,
        editor: SiteEditorResponse::from_editor(&editor, &state),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_limit_leaves_room_for_form_fields() {
        let config = MediaConfig {
            max_upload_bytes: 1024,
            ..Default::default()
        };
        assert!(body_limit(&config) > 1024);
    }
}
