//! Site content service: owner saves, public lookups and inbox reads.

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{SiteError, StoreError};
use crate::models::{RsvpResponse, SiteContent, SiteRecord};
use crate::services::retry::retry_read;
use crate::services::slug;
use crate::stores::{RsvpInbox, SiteStore};

/// How a save was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Explicit save from the editor; required fields are enforced.
    Manual,
    /// Persist after a photo change; required fields are not enforced.
    AutoSave,
}

impl SaveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveMode::Manual => "manual",
            SaveMode::AutoSave => "auto",
        }
    }
}

/// Where the slug of a save came from.
enum SlugSource {
    Explicit(String),
    Derived(String),
}

#[derive(Clone)]
pub struct SiteService {
    sites: Arc<dyn SiteStore>,
    inbox: Arc<dyn RsvpInbox>,
    read_retry_delay: Duration,
}

impl SiteService {
    pub fn new(
        sites: Arc<dyn SiteStore>,
        inbox: Arc<dyn RsvpInbox>,
        read_retry_delay: Duration,
    ) -> Self {
        Self {
            sites,
            inbox,
            read_retry_delay,
        }
    }

    /// The owner's site, if one was ever saved.
    pub async fn load(&self, owner_id: Uuid) -> Result<Option<SiteRecord>, SiteError> {
        retry_read(self.read_retry_delay, || self.sites.get_by_owner(owner_id))
            .await
            .map_err(|e| {
                tracing::error!(owner_id = %owner_id, error = %e, "Failed to load site");
                SiteError::Unavailable
            })
    }

    /// Public lookup by slug. No authentication involved.
    pub async fn public_by_slug(&self, slug: &str) -> Result<SiteRecord, SiteError> {
        retry_read(self.read_retry_delay, || self.sites.get_by_slug(slug))
            .await
            .map_err(|e| {
                tracing::error!(slug = %slug, error = %e, "Failed to look up site by slug");
                SiteError::Unavailable
            })?
            .ok_or(SiteError::SiteNotFound)
    }

    /// RSVP responses for the owner's site, newest first.
    pub async fn responses(&self, owner_id: Uuid) -> Result<Vec<RsvpResponse>, SiteError> {
        let site = self.load(owner_id).await?.ok_or(SiteError::SiteNotFound)?;
        self.responses_for_site(site.id).await
    }

    pub async fn responses_for_site(&self, site_id: Uuid) -> Result<Vec<RsvpResponse>, SiteError> {
        retry_read(self.read_retry_delay, || self.inbox.list(site_id))
            .await
            .map_err(|e| {
                tracing::error!(site_id = %site_id, error = %e, "Failed to list RSVP responses");
                SiteError::Unavailable
            })
    }

    /// Validates and upserts the owner's content.
    ///
    /// An empty slug is derived from the couple's names (or randomized on an
    /// auto-save that cannot derive one) and suffixed until free. An explicit
    /// slug held by another owner is rejected without writing.
    pub async fn save(
        &self,
        owner_id: Uuid,
        mut content: SiteContent,
        mode: SaveMode,
    ) -> Result<SiteRecord, SiteError> {
        content.slug = slug::normalize_slug_input(&content.slug);

        if mode == SaveMode::Manual {
            check_required(&content)?;
        }
        content.validate()?;

        let source = if content.slug.is_empty() {
            let base = slug::derive_slug(&content.bride_name, &content.groom_name)
                .unwrap_or_else(slug::random_slug);
            SlugSource::Derived(self.free_slug(owner_id, &base).await?)
        } else {
            let holder = retry_read(self.read_retry_delay, || self.sites.slug_owner(&content.slug))
                .await
                .map_err(|e| save_failed(owner_id, e))?;
            if holder.is_some_and(|h| h != owner_id) {
                return Err(SiteError::SlugTaken(content.slug));
            }
            SlugSource::Explicit(content.slug.clone())
        };

        let result = match source {
            SlugSource::Explicit(slug) => {
                content.slug = slug;
                self.sites
                    .upsert_by_owner(owner_id, &content)
                    .await
                    .map_err(|e| match e {
                        StoreError::Conflict(_) => SiteError::SlugTaken(content.slug.clone()),
                        other => save_failed(owner_id, other),
                    })
            }
            SlugSource::Derived(slug) => {
                content.slug = slug;
                let first = self.sites.upsert_by_owner(owner_id, &content).await;
                match first {
                    // Lost a race for the derived slug; pick the next free one.
                    Err(StoreError::Conflict(_)) => {
                        let base = content.slug.clone();
                        content.slug = self.free_slug(owner_id, &base).await?;
                        self.sites
                            .upsert_by_owner(owner_id, &content)
                            .await
                            .map_err(|e| save_failed(owner_id, e))
                    }
                    other => other.map_err(|e| save_failed(owner_id, e)),
                }
            }
        }?;

        tracing::info!(
            owner_id = %owner_id,
            site_id = %result.id,
            slug = %result.content.slug,
            mode = mode.as_str(),
            "Site saved"
        );
        Ok(result)
    }

    async fn free_slug(&self, owner_id: Uuid, base: &str) -> Result<String, SiteError> {
        slug::ensure_unique(self.sites.as_ref(), owner_id, base)
            .await
            .map_err(|e| save_failed(owner_id, e))
    }
}

fn check_required(content: &SiteContent) -> Result<(), SiteError> {
    let mut missing = Vec::new();
    if content.bride_name.trim().is_empty() {
        missing.push("brideName");
    }
    if content.groom_name.trim().is_empty() {
        missing.push("groomName");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SiteError::Validation(format!(
            "Required fields missing: {}",
            missing.join(", ")
        )))
    }
}

fn save_failed(owner_id: Uuid, error: StoreError) -> SiteError {
    tracing::error!(owner_id = %owner_id, error = %error, "Failed to save site");
    SiteError::SaveFailed
}
