//! In-memory store implementations for development and testing.
//!
//! Every store can be switched into an unavailable mode to exercise the
//! failure paths of the services built on top of them.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{GuestLedger, ObjectStorage, RsvpInbox, SiteStore};
use crate::errors::{StorageError, StoreError};
use crate::models::{
    name_key, GuestCreate, GuestPatch, GuestRecord, InboxInsert, NewGuest, NewRsvp, RsvpResponse,
    SiteContent, SiteRecord,
};

fn unavailable() -> StoreError {
    StoreError::Unavailable("in-memory store switched off".to_string())
}

/// Content store keyed by owner.
#[derive(Debug, Default)]
pub struct MemorySiteStore {
    sites: RwLock<HashMap<Uuid, SiteRecord>>,
    unavailable: AtomicBool,
    failing_reads: AtomicU32,
}

impl MemorySiteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail until switched back.
    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    /// Makes the next `count` reads fail, then recover.
    pub fn fail_next_reads(&self, count: u32) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.sites.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sites.read().await.is_empty()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), StoreError> {
        self.check()?;
        let consumed = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if consumed.is_ok() {
            return Err(StoreError::Unavailable("transient read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SiteStore for MemorySiteStore {
    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Option<SiteRecord>, StoreError> {
        self.check_read()?;
        Ok(self.sites.read().await.get(&owner_id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<SiteRecord>, StoreError> {
        self.check_read()?;
        let sites = self.sites.read().await;
        Ok(sites.values().find(|s| s.content.slug == slug).cloned())
    }

    async fn upsert_by_owner(
        &self,
        owner_id: Uuid,
        content: &SiteContent,
    ) -> Result<SiteRecord, StoreError> {
        self.check()?;
        let mut sites = self.sites.write().await;

        let taken = sites
            .values()
            .any(|s| s.owner_id != owner_id && s.content.slug == content.slug);
        if taken {
            return Err(StoreError::Conflict(format!(
                "slug '{}' already exists",
                content.slug
            )));
        }

        let now = Utc::now();
        let record = match sites.get(&owner_id) {
            Some(existing) => SiteRecord {
                content: content.clone(),
                updated_at: now,
                ..existing.clone()
            },
            None => SiteRecord {
                id: Uuid::new_v4(),
                owner_id,
                content: content.clone(),
                created_at: now,
                updated_at: now,
            },
        };
        sites.insert(owner_id, record.clone());
        Ok(record)
    }

    async fn slug_owner(&self, slug: &str) -> Result<Option<Uuid>, StoreError> {
        self.check_read()?;
        let sites = self.sites.read().await;
        Ok(sites
            .values()
            .find(|s| s.content.slug == slug)
            .map(|s| s.owner_id))
    }
}

/// Append-only RSVP inbox.
#[derive(Debug, Default)]
pub struct MemoryRsvpInbox {
    rows: Mutex<Vec<(RsvpResponse, String)>>,
    unavailable: AtomicBool,
}

impl MemoryRsvpInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    /// Total stored responses across all sites.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RsvpInbox for MemoryRsvpInbox {
    async fn insert(
        &self,
        rsvp: NewRsvp,
        dedup_since: DateTime<Utc>,
    ) -> Result<InboxInsert, StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().await;

        let duplicate = rows
            .iter()
            .rev()
            .find(|(r, fp)| {
                r.site_id == rsvp.site_id && *fp == rsvp.fingerprint && r.created_at >= dedup_since
            })
            .map(|(r, _)| r.clone());
        if let Some(existing) = duplicate {
            return Ok(InboxInsert::Duplicate(existing));
        }

        let response = RsvpResponse {
            id: Uuid::new_v4(),
            site_id: rsvp.site_id,
            guest_name: rsvp.guest_name,
            email: rsvp.email,
            phone: rsvp.phone,
            confirmed: rsvp.confirmed,
            message: rsvp.message,
            created_at: Utc::now(),
        };
        rows.push((response.clone(), rsvp.fingerprint));
        Ok(InboxInsert::Inserted(response))
    }

    async fn list(&self, site_id: Uuid) -> Result<Vec<RsvpResponse>, StoreError> {
        self.check()?;
        let rows = self.rows.lock().await;
        // Reverse insertion order keeps same-instant rows newest first.
        let mut responses: Vec<RsvpResponse> = rows
            .iter()
            .rev()
            .filter(|(r, _)| r.site_id == site_id)
            .map(|(r, _)| r.clone())
            .collect();
        responses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(responses)
    }
}

/// Guest ledger with soft deletes.
#[derive(Debug, Default)]
pub struct MemoryGuestLedger {
    guests: Mutex<Vec<GuestRecord>>,
    unavailable: AtomicBool,
}

impl MemoryGuestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    /// Every stored guest for an owner, deleted ones included.
    pub async fn all_for_owner(&self, owner_id: Uuid) -> Vec<GuestRecord> {
        self.guests
            .lock()
            .await
            .iter()
            .filter(|g| g.owner_id == owner_id)
            .cloned()
            .collect()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn best_match(guests: &[GuestRecord], owner_id: Uuid, key: &str) -> Option<GuestRecord> {
        guests
            .iter()
            .filter(|g| g.owner_id == owner_id && name_key(&g.name) == key)
            .min_by_key(|g| (g.is_deleted(), g.created_at))
            .cloned()
    }

    fn insert(guests: &mut Vec<GuestRecord>, guest: NewGuest) -> GuestRecord {
        let now = Utc::now();
        let record = GuestRecord {
            id: Uuid::new_v4(),
            owner_id: guest.owner_id,
            name: guest.name,
            category: guest.category,
            confirmed: guest.confirmed,
            plus_ones: guest.plus_ones,
            origin: guest.origin,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        guests.push(record.clone());
        record
    }
}

#[async_trait::async_trait]
impl GuestLedger for MemoryGuestLedger {
    async fn find_by_owner_and_name(
        &self,
        owner_id: Uuid,
        name_key: &str,
    ) -> Result<Option<GuestRecord>, StoreError> {
        self.check()?;
        let guests = self.guests.lock().await;
        Ok(Self::best_match(&guests, owner_id, name_key))
    }

    async fn create(&self, guest: NewGuest) -> Result<GuestRecord, StoreError> {
        self.check()?;
        let mut guests = self.guests.lock().await;
        Ok(Self::insert(&mut guests, guest))
    }

    async fn create_if_name_absent(
        &self,
        guest: NewGuest,
        name_key: &str,
    ) -> Result<GuestCreate, StoreError> {
        self.check()?;
        let mut guests = self.guests.lock().await;
        if let Some(existing) = Self::best_match(&guests, guest.owner_id, name_key) {
            return Ok(GuestCreate::Existing(existing));
        }
        Ok(GuestCreate::Created(Self::insert(&mut guests, guest)))
    }

    async fn update(
        &self,
        owner_id: Uuid,
        guest_id: Uuid,
        patch: &GuestPatch,
    ) -> Result<Option<GuestRecord>, StoreError> {
        self.check()?;
        let mut guests = self.guests.lock().await;
        let Some(guest) = guests
            .iter_mut()
            .find(|g| g.id == guest_id && g.owner_id == owner_id && !g.is_deleted())
        else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            guest.name = name.clone();
        }
        if let Some(category) = patch.category {
            guest.category = category;
        }
        if let Some(confirmed) = patch.confirmed {
            guest.confirmed = confirmed;
        }
        if let Some(plus_ones) = patch.plus_ones {
            guest.plus_ones = plus_ones;
        }
        guest.updated_at = Utc::now();
        Ok(Some(guest.clone()))
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<GuestRecord>, StoreError> {
        self.check()?;
        let guests = self.guests.lock().await;
        let mut active: Vec<GuestRecord> = guests
            .iter()
            .rev()
            .filter(|g| g.owner_id == owner_id && !g.is_deleted())
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn delete(&self, owner_id: Uuid, guest_id: Uuid) -> Result<bool, StoreError> {
        self.check()?;
        let mut guests = self.guests.lock().await;
        match guests
            .iter_mut()
            .find(|g| g.id == guest_id && g.owner_id == owner_id && !g.is_deleted())
        {
            Some(guest) => {
                let now = Utc::now();
                guest.deleted_at = Some(now);
                guest.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Object storage holding uploads in a map.
#[derive(Debug)]
pub struct MemoryObjectStorage {
    base_url: String,
    objects: RwLock<HashMap<String, (Vec<u8>, String)>>,
    unavailable: AtomicBool,
}

impl MemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    /// Stored bytes and content type for a path.
    pub async fn get(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.objects.read().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for MemoryObjectStorage {
    fn default() -> Self {
        Self::new("/media")
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "in-memory storage switched off".to_string(),
            ));
        }
        if path.is_empty() || path.starts_with('/') || path.split('/').any(|s| s == "..") {
            return Err(StorageError::Rejected(format!("invalid object path '{}'", path)));
        }
        self.objects
            .write()
            .await
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confirmation, GuestCategory, GuestOrigin};

    fn content(slug: &str) -> SiteContent {
        SiteContent {
            slug: slug.to_string(),
            bride_name: "Ana".into(),
            groom_name: "Joao".into(),
            ..Default::default()
        }
    }

    fn new_guest(owner_id: Uuid, name: &str) -> NewGuest {
        NewGuest {
            owner_id,
            name: name.to_string(),
            category: GuestCategory::Amigos,
            confirmed: Confirmation::Pending,
            plus_ones: 0,
            origin: GuestOrigin::Manual,
        }
    }

    fn new_rsvp(site_id: Uuid, fingerprint: &str) -> NewRsvp {
        NewRsvp {
            site_id,
            guest_name: "Maria Souza".into(),
            email: None,
            phone: Some("11999999999".into()),
            confirmed: true,
            message: None,
            fingerprint: fingerprint.to_string(),
        }
    }

    #[tokio::test]
    async fn test_site_upsert_then_get_round_trips() {
        let store = MemorySiteStore::new();
        let owner = Uuid::new_v4();

        let created = store.upsert_by_owner(owner, &content("ana-e-joao")).await.unwrap();
        let by_owner = store.get_by_owner(owner).await.unwrap().unwrap();
        let by_slug = store.get_by_slug("ana-e-joao").await.unwrap().unwrap();

        assert_eq!(by_owner, created);
        assert_eq!(by_slug, created);
        assert_eq!(store.slug_owner("ana-e-joao").await.unwrap(), Some(owner));
    }

    #[tokio::test]
    async fn test_site_upsert_keeps_single_row_per_owner() {
        let store = MemorySiteStore::new();
        let owner = Uuid::new_v4();

        let first = store.upsert_by_owner(owner, &content("ana-e-joao")).await.unwrap();
        let second = store.upsert_by_owner(owner, &content("ana-e-joao-2025")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
        assert!(store.get_by_slug("ana-e-joao").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_site_upsert_rejects_foreign_slug() {
        let store = MemorySiteStore::new();
        store
            .upsert_by_owner(Uuid::new_v4(), &content("ana-e-joao"))
            .await
            .unwrap();

        let result = store
            .upsert_by_owner(Uuid::new_v4(), &content("ana-e-joao"))
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_site_store_transient_read_failures() {
        let store = MemorySiteStore::new();
        store.fail_next_reads(1);
        assert!(store.get_by_slug("x").await.is_err());
        assert!(store.get_by_slug("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inbox_dedups_inside_window() {
        let inbox = MemoryRsvpInbox::new();
        let site = Uuid::new_v4();
        let since = Utc::now() - chrono::Duration::seconds(120);

        let first = inbox.insert(new_rsvp(site, "fp"), since).await.unwrap();
        let second = inbox.insert(new_rsvp(site, "fp"), since).await.unwrap();

        assert!(!first.is_duplicate());
        assert!(second.is_duplicate());
        assert_eq!(first.response().id, second.response().id);
        assert_eq!(inbox.len().await, 1);
    }

    #[tokio::test]
    async fn test_inbox_accepts_after_window() {
        let inbox = MemoryRsvpInbox::new();
        let site = Uuid::new_v4();

        inbox.insert(new_rsvp(site, "fp"), Utc::now()).await.unwrap();
        let future_window = Utc::now() + chrono::Duration::seconds(1);
        let later = inbox.insert(new_rsvp(site, "fp"), future_window).await.unwrap();

        assert!(!later.is_duplicate());
        assert_eq!(inbox.list(site).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_inbox_list_newest_first_and_scoped() {
        let inbox = MemoryRsvpInbox::new();
        let site = Uuid::new_v4();
        let since = Utc::now();

        let a = inbox.insert(new_rsvp(site, "a"), since).await.unwrap();
        let b = inbox.insert(new_rsvp(site, "b"), since).await.unwrap();
        inbox.insert(new_rsvp(Uuid::new_v4(), "c"), since).await.unwrap();

        let listed = inbox.list(site).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, b.response().id);
        assert_eq!(listed[1].id, a.response().id);
    }

    #[tokio::test]
    async fn test_ledger_create_if_absent() {
        let ledger = MemoryGuestLedger::new();
        let owner = Uuid::new_v4();

        let first = ledger
            .create_if_name_absent(new_guest(owner, "Maria Souza"), "maria souza")
            .await
            .unwrap();
        let second = ledger
            .create_if_name_absent(new_guest(owner, "MARIA  SOUZA"), "maria souza")
            .await
            .unwrap();

        assert!(matches!(first, GuestCreate::Created(_)));
        assert!(matches!(second, GuestCreate::Existing(_)));
        assert_eq!(ledger.all_for_owner(owner).await.len(), 1);
    }

    #[tokio::test]
    async fn test_ledger_prefers_active_match() {
        let ledger = MemoryGuestLedger::new();
        let owner = Uuid::new_v4();

        let old = ledger.create(new_guest(owner, "Maria")).await.unwrap();
        ledger.delete(owner, old.id).await.unwrap();
        let active = ledger.create(new_guest(owner, "maria")).await.unwrap();

        let found = ledger
            .find_by_owner_and_name(owner, "maria")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, active.id);
    }

    #[tokio::test]
    async fn test_ledger_soft_delete_hides_from_list() {
        let ledger = MemoryGuestLedger::new();
        let owner = Uuid::new_v4();

        let guest = ledger.create(new_guest(owner, "Maria")).await.unwrap();
        assert!(ledger.delete(owner, guest.id).await.unwrap());
        assert!(!ledger.delete(owner, guest.id).await.unwrap());

        assert!(ledger.list(owner).await.unwrap().is_empty());
        let found = ledger
            .find_by_owner_and_name(owner, "maria")
            .await
            .unwrap()
            .unwrap();
        assert!(found.is_deleted());
    }

    #[tokio::test]
    async fn test_ledger_update_is_owner_scoped() {
        let ledger = MemoryGuestLedger::new();
        let owner = Uuid::new_v4();
        let guest = ledger.create(new_guest(owner, "Maria")).await.unwrap();

        let patch = GuestPatch::confirmation(Confirmation::Confirmed);
        assert!(ledger
            .update(Uuid::new_v4(), guest.id, &patch)
            .await
            .unwrap()
            .is_none());

        let updated = ledger.update(owner, guest.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.confirmed, Confirmation::Confirmed);
    }

    #[tokio::test]
    async fn test_object_storage_upload() {
        let storage = MemoryObjectStorage::new("/media/");
        let url = storage
            .upload("owner/abc.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(url, "/media/owner/abc.jpg");
        let (bytes, content_type) = storage.get("owner/abc.jpg").await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_object_storage_rejects_traversal() {
        let storage = MemoryObjectStorage::default();
        let result = storage.upload("../etc/passwd", vec![], "text/plain").await;
        assert!(matches!(result, Err(StorageError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_unavailable_stores_fail() {
        let sites = MemorySiteStore::new();
        sites.set_unavailable(true);
        assert_eq!(
            sites.get_by_owner(Uuid::new_v4()).await,
            Err(unavailable())
        );

        let storage = MemoryObjectStorage::default();
        storage.set_unavailable(true);
        assert!(matches!(
            storage.upload("a.jpg", vec![], "image/jpeg").await,
            Err(StorageError::Unavailable(_))
        ));
    }
}
