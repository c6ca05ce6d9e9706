//! Owner-side editing session over a site's content.
//!
//! Field edits only touch the buffer. Text reaches the store through an
//! explicit [`SiteEditor::save`]; photo changes upload and auto-save at once.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{SiteError, StorageError};
use crate::models::{RsvpResponse, SiteContent, SiteRecord};
use crate::services::site::{SaveMode, SiteService};
use crate::services::slug::normalize_slug_input;
use crate::stores::ObjectStorage;

/// What the editor is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorActivity {
    Idle,
    Saving,
    Uploading,
}

/// Shared view of an editor's pending state.
#[derive(Debug, Clone)]
pub struct ActivityMonitor(Arc<AtomicU8>);

impl ActivityMonitor {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(0)))
    }

    pub fn get(&self) -> EditorActivity {
        match self.0.load(Ordering::SeqCst) {
            1 => EditorActivity::Saving,
            2 => EditorActivity::Uploading,
            _ => EditorActivity::Idle,
        }
    }

    fn enter(&self, activity: EditorActivity) -> ActivityGuard<'_> {
        let code = match activity {
            EditorActivity::Idle => 0,
            EditorActivity::Saving => 1,
            EditorActivity::Uploading => 2,
        };
        self.0.store(code, Ordering::SeqCst);
        ActivityGuard(self)
    }
}

/// Resets the monitor to idle when dropped, including on cancellation.
struct ActivityGuard<'a>(&'a ActivityMonitor);

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        self.0 .0.store(0, Ordering::SeqCst);
    }
}

/// Which photo an upload replaces or extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSlot {
    Hero,
    Album,
}

impl PhotoSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoSlot::Hero => "hero",
            PhotoSlot::Album => "album",
        }
    }
}

/// Uploaded image ready for storage.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Link shown to the owner: always the last saved slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicLink {
    pub url: Option<String>,
    /// The buffer holds a slug change not yet published.
    pub slug_pending: bool,
}

pub struct SiteEditor {
    service: SiteService,
    owner_id: Uuid,
    buffer: SiteContent,
    saved: Option<SiteRecord>,
    slug_dirty: bool,
    inbox: Vec<RsvpResponse>,
    activity: ActivityMonitor,
}

impl SiteEditor {
    /// Loads the owner's site (or defaults) and its RSVP inbox.
    pub async fn open(service: SiteService, owner_id: Uuid) -> Result<Self, SiteError> {
        let saved = service.load(owner_id).await?;
        let inbox = match &saved {
            Some(site) => service.responses_for_site(site.id).await?,
            None => Vec::new(),
        };
        let buffer = saved
            .as_ref()
            .map(|s| s.content.clone())
            .unwrap_or_default();

        Ok(Self {
            service,
            owner_id,
            buffer,
            saved,
            slug_dirty: false,
            inbox,
            activity: ActivityMonitor::new(),
        })
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn buffer(&self) -> &SiteContent {
        &self.buffer
    }

    pub fn saved(&self) -> Option<&SiteRecord> {
        self.saved.as_ref()
    }

    pub fn inbox(&self) -> &[RsvpResponse] {
        &self.inbox
    }

    pub fn activity(&self) -> EditorActivity {
        self.activity.get()
    }

    pub fn monitor(&self) -> ActivityMonitor {
        self.activity.clone()
    }

    pub fn slug_pending(&self) -> bool {
        self.slug_dirty
    }

    /// Applies field edits to the buffer. Nothing is persisted.
    pub fn edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut SiteContent),
    {
        let before = self.buffer.slug.clone();
        f(&mut self.buffer);
        if self.buffer.slug != before {
            self.buffer.slug = normalize_slug_input(&self.buffer.slug);
            self.refresh_slug_flag();
        }
    }

    /// Replaces the whole buffer, as a client submitting its form state.
    pub fn replace_buffer(&mut self, content: SiteContent) {
        self.edit(|buffer| *buffer = content);
    }

    /// Public URL for the last saved slug under `base_url`.
    pub fn public_link(&self, base_url: &str, prefix: &str) -> PublicLink {
        let url = self.saved.as_ref().map(|site| {
            format!(
                "{}/{}/{}",
                base_url.trim_end_matches('/'),
                prefix.trim_matches('/'),
                site.content.slug
            )
        });
        PublicLink {
            url,
            slug_pending: self.slug_dirty,
        }
    }

    /// Explicit save of the whole buffer.
    ///
    /// On failure the buffer is left exactly as it was.
    pub async fn save(&mut self) -> Result<&SiteRecord, SiteError> {
        let record = {
            let _guard = self.activity.enter(EditorActivity::Saving);
            self.service
                .save(self.owner_id, self.buffer.clone(), SaveMode::Manual)
                .await?
        };
        self.accept_saved(record);
        self.reload_inbox().await;
        self.saved.as_ref().ok_or(SiteError::SaveFailed)
    }

    /// Uploads a photo, places it in the buffer and auto-saves.
    ///
    /// The photo stays in the buffer when the auto-save fails.
    pub async fn upload_photo(
        &mut self,
        storage: &dyn ObjectStorage,
        slot: PhotoSlot,
        photo: PhotoUpload,
    ) -> Result<String, SiteError> {
        let url = {
            let _guard = self.activity.enter(EditorActivity::Uploading);
            let path = format!("{}/{}.{}", self.owner_id, Uuid::new_v4(), photo.extension);
            storage
                .upload(&path, photo.bytes, photo.content_type)
                .await
                .map_err(|e| upload_failed(self.owner_id, slot, e))?
        };

        match slot {
            PhotoSlot::Hero => self.buffer.hero_image = url.clone(),
            PhotoSlot::Album => self.buffer.album.push(url.clone()),
        }
        tracing::info!(owner_id = %self.owner_id, slot = slot.as_str(), url = %url, "Photo uploaded");

        self.auto_save().await?;
        Ok(url)
    }

    /// Removes an album photo and auto-saves.
    pub async fn remove_album_photo(&mut self, index: usize) -> Result<String, SiteError> {
        if index >= self.buffer.album.len() {
            return Err(SiteError::Validation(format!(
                "Album has no photo at position {}",
                index
            )));
        }
        let removed = self.buffer.album.remove(index);
        self.auto_save().await?;
        Ok(removed)
    }

    async fn auto_save(&mut self) -> Result<(), SiteError> {
        let record = {
            let _guard = self.activity.enter(EditorActivity::Saving);
            self.service
                .save(self.owner_id, self.buffer.clone(), SaveMode::AutoSave)
                .await?
        };
        self.accept_saved(record);
        Ok(())
    }

    fn accept_saved(&mut self, record: SiteRecord) {
        self.buffer = record.content.clone();
        self.saved = Some(record);
        self.slug_dirty = false;
    }

    async fn reload_inbox(&mut self) {
        let Some(site_id) = self.saved.as_ref().map(|s| s.id) else {
            return;
        };
        match self.service.responses_for_site(site_id).await {
            Ok(inbox) => self.inbox = inbox,
            Err(e) => {
                tracing::warn!(site_id = %site_id, error = %e, "Keeping previous RSVP inbox");
            }
        }
    }

    fn refresh_slug_flag(&mut self) {
        let saved_slug = self.saved.as_ref().map(|s| s.content.slug.as_str());
        self.slug_dirty = match saved_slug {
            Some(slug) => slug != self.buffer.slug,
            None => !self.buffer.slug.is_empty(),
        };
    }
}

fn upload_failed(owner_id: Uuid, slot: PhotoSlot, error: StorageError) -> SiteError {
    tracing::error!(owner_id = %owner_id, slot = slot.as_str(), error = %error, "Photo upload failed");
    SiteError::UploadFailed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StorageError;
    use crate::stores::{MemoryObjectStorage, MemoryRsvpInbox, MemorySiteStore, SiteStore};
    use std::sync::Mutex;
    use std::time::Duration;

    struct Fixture {
        service: SiteService,
        sites: Arc<MemorySiteStore>,
        storage: MemoryObjectStorage,
    }

    fn fixture() -> Fixture {
        let sites = Arc::new(MemorySiteStore::new());
        let service = SiteService::new(
            sites.clone(),
            Arc::new(MemoryRsvpInbox::new()),
            Duration::from_millis(1),
        );
        Fixture {
            service,
            sites,
            storage: MemoryObjectStorage::new("/media"),
        }
    }

    fn jpeg() -> PhotoUpload {
        PhotoUpload {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
            content_type: "image/jpeg",
            extension: "jpg",
        }
    }

    /// Records the editor activity seen while an upload runs.
    struct ObservingStorage {
        monitor: Mutex<Option<ActivityMonitor>>,
        seen: Mutex<Option<EditorActivity>>,
    }

    #[async_trait::async_trait]
    impl ObjectStorage for ObservingStorage {
        async fn upload(
            &self,
            path: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, StorageError> {
            let activity = self.monitor.lock().unwrap().as_ref().map(|m| m.get());
            *self.seen.lock().unwrap() = activity;
            Ok(format!("/media/{}", path))
        }
    }

    async fn named_editor(f: &Fixture, owner: Uuid) -> SiteEditor {
        let mut editor = SiteEditor::open(f.service.clone(), owner).await.unwrap();
        editor.edit(|c| {
            c.bride_name = "Ana".into();
            c.groom_name = "Joao".into();
        });
        editor
    }

    #[tokio::test]
    async fn test_open_without_site_uses_defaults() {
        let f = fixture();
        let editor = SiteEditor::open(f.service.clone(), Uuid::new_v4()).await.unwrap();

        assert_eq!(editor.buffer(), &SiteContent::default());
        assert!(editor.saved().is_none());
        assert!(editor.inbox().is_empty());
        assert_eq!(editor.public_link("https://casar.app", "sites").url, None);
    }

    #[tokio::test]
    async fn test_edits_are_not_persisted_until_save() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let mut editor = named_editor(&f, owner).await;

        assert!(f.sites.get_by_owner(owner).await.unwrap().is_none());

        let saved = editor.save().await.unwrap();
        assert_eq!(saved.slug(), "ana-e-joao");
        assert_eq!(editor.buffer().slug, "ana-e-joao");
        assert!(f.sites.get_by_owner(owner).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_slug_edit_keeps_old_link_until_saved() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let mut editor = named_editor(&f, owner).await;
        editor.save().await.unwrap();

        editor.edit(|c| c.slug = "Ana E Joao 2025".into());
        assert_eq!(editor.buffer().slug, "ana-e-joao-2025");
        let link = editor.public_link("https://casar.app/", "sites");
        assert_eq!(link.url.as_deref(), Some("https://casar.app/sites/ana-e-joao"));
        assert!(link.slug_pending);
        assert!(f.service.public_by_slug("ana-e-joao").await.is_ok());
        assert_eq!(
            f.service.public_by_slug("ana-e-joao-2025").await.unwrap_err(),
            SiteError::SiteNotFound
        );

        editor.save().await.unwrap();
        let link = editor.public_link("https://casar.app", "sites");
        assert_eq!(
            link.url.as_deref(),
            Some("https://casar.app/sites/ana-e-joao-2025")
        );
        assert!(!link.slug_pending);
        assert!(f.service.public_by_slug("ana-e-joao-2025").await.is_ok());
    }

    #[tokio::test]
    async fn test_reverting_slug_clears_pending_flag() {
        let f = fixture();
        let mut editor = named_editor(&f, Uuid::new_v4()).await;
        editor.save().await.unwrap();

        editor.edit(|c| c.slug = "outro".into());
        assert!(editor.slug_pending());
        editor.edit(|c| c.slug = "ana-e-joao".into());
        assert!(!editor.slug_pending());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_buffer() {
        let f = fixture();
        let mut editor = named_editor(&f, Uuid::new_v4()).await;
        editor.edit(|c| c.story = "Era uma vez...".into());
        f.sites.set_unavailable(true);

        assert_eq!(editor.save().await.unwrap_err(), SiteError::SaveFailed);
        assert_eq!(editor.buffer().story, "Era uma vez...");
        assert_eq!(editor.activity(), EditorActivity::Idle);
        assert!(editor.saved().is_none());
    }

    #[tokio::test]
    async fn test_upload_hero_auto_saves() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let mut editor = SiteEditor::open(f.service.clone(), owner).await.unwrap();

        let url = editor
            .upload_photo(&f.storage, PhotoSlot::Hero, jpeg())
            .await
            .unwrap();

        assert!(url.starts_with(&format!("/media/{}/", owner)));
        assert!(url.ends_with(".jpg"));
        let stored = f.sites.get_by_owner(owner).await.unwrap().unwrap();
        assert_eq!(stored.content.hero_image, url);
        // No names yet, so the auto-save picked a fallback slug.
        assert!(stored.content.slug.starts_with("site-"));
        assert_eq!(f.storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_upload_album_persists_unsaved_text_too() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let mut editor = named_editor(&f, owner).await;
        editor.edit(|c| c.headline = "Vamos casar".into());

        editor
            .upload_photo(&f.storage, PhotoSlot::Album, jpeg())
            .await
            .unwrap();
        editor
            .upload_photo(&f.storage, PhotoSlot::Album, jpeg())
            .await
            .unwrap();

        let stored = f.sites.get_by_owner(owner).await.unwrap().unwrap();
        assert_eq!(stored.content.album.len(), 2);
        assert_eq!(stored.content.headline, "Vamos casar");
        assert_eq!(stored.content.slug, "ana-e-joao");
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_buffer_untouched() {
        let f = fixture();
        let mut editor = named_editor(&f, Uuid::new_v4()).await;
        f.storage.set_unavailable(true);

        let result = editor.upload_photo(&f.storage, PhotoSlot::Album, jpeg()).await;

        assert_eq!(result.unwrap_err(), SiteError::UploadFailed);
        assert!(editor.buffer().album.is_empty());
        assert_eq!(editor.activity(), EditorActivity::Idle);
    }

    #[tokio::test]
    async fn test_auto_save_failure_keeps_photo_in_buffer() {
        let f = fixture();
        let mut editor = named_editor(&f, Uuid::new_v4()).await;
        f.sites.set_unavailable(true);

        let result = editor.upload_photo(&f.storage, PhotoSlot::Hero, jpeg()).await;

        assert_eq!(result.unwrap_err(), SiteError::SaveFailed);
        assert!(editor.buffer().hero_image.starts_with("/media/"));
    }

    #[tokio::test]
    async fn test_upload_reports_uploading_activity() {
        let f = fixture();
        let mut editor = SiteEditor::open(f.service.clone(), Uuid::new_v4()).await.unwrap();
        let storage = ObservingStorage {
            monitor: Mutex::new(Some(editor.monitor())),
            seen: Mutex::new(None),
        };

        editor
            .upload_photo(&storage, PhotoSlot::Hero, jpeg())
            .await
            .unwrap();

        assert_eq!(*storage.seen.lock().unwrap(), Some(EditorActivity::Uploading));
        assert_eq!(editor.activity(), EditorActivity::Idle);
    }

    #[tokio::test]
    async fn test_remove_album_photo() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let mut editor = named_editor(&f, owner).await;
        let first = editor
            .upload_photo(&f.storage, PhotoSlot::Album, jpeg())
            .await
            .unwrap();
        let second = editor
            .upload_photo(&f.storage, PhotoSlot::Album, jpeg())
            .await
            .unwrap();

        assert_eq!(editor.remove_album_photo(0).await.unwrap(), first);
        let stored = f.sites.get_by_owner(owner).await.unwrap().unwrap();
        assert_eq!(stored.content.album, vec![second]);

        assert!(matches!(
            editor.remove_album_photo(5).await,
            Err(SiteError::Validation(_))
        ));
    }
}
