//! Owner site editor endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_site_saved;
use domain::models::{SiteContent, SiteRecord};
use domain::services::{SaveMode, SiteEditor};

/// Editor view of the owner's site.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEditorResponse {
    /// Last saved record, absent before the first save.
    pub site: Option<SiteRecord>,
    /// Editable content (saved content or defaults).
    pub content: SiteContent,
    /// Public URL of the last saved slug.
    pub public_link: Option<String>,
    /// The submitted slug differs from the published one.
    pub slug_pending: bool,
}

impl SiteEditorResponse {
    pub fn from_editor(editor: &SiteEditor, state: &AppState) -> Self {
        let link = editor.public_link(
            &state.config.sites.public_base_url,
            state.config.public_prefix(),
        );
        Self {
            site: editor.saved().cloned(),
            content: editor.buffer().clone(),
            public_link: link.url,
            slug_pending: link.slug_pending,
        }
    }
}

/// Load the owner's site into the editor.
///
/// GET /api/v1/site
pub async fn get_site(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<SiteEditorResponse>, ApiError> {
    let editor = SiteEditor::open(state.sites.clone(), auth.user_id).await?;
    Ok(Json(SiteEditorResponse::from_editor(&editor, &state)))
}

/// Save the whole editor buffer.
///
/// PUT /api/v1/site
pub async fn save_site(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(content): Json<SiteContent>,
) -> Result<Json<SiteEditorResponse>, ApiError> {
    let mut editor = SiteEditor::open(state.sites.clone(), auth.user_id).await?;
    editor.replace_buffer(content);
    editor.save().await?;
    record_site_saved(SaveMode::Manual.as_str());

    tracing::info!(
        owner_id = %auth.user_id,
        slug = %editor.buffer().slug,
        "Site saved"
    );
    Ok(Json(SiteEditorResponse::from_editor(&editor, &state)))
}
