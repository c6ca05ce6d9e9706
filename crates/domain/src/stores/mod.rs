//! Storage contracts consumed by the domain services.
//!
//! The persistence crate implements these over PostgreSQL; [`memory`] holds
//! in-process implementations for tests and local runs.

pub mod memory;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{StorageError, StoreError};
use crate::models::{
    GuestCreate, GuestPatch, GuestRecord, InboxInsert, NewGuest, NewRsvp, RsvpResponse,
    SiteContent, SiteRecord,
};

pub use memory::{MemoryGuestLedger, MemoryObjectStorage, MemoryRsvpInbox, MemorySiteStore};

/// One content record per owner, addressable by slug.
#[async_trait::async_trait]
pub trait SiteStore: Send + Sync {
    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Option<SiteRecord>, StoreError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<SiteRecord>, StoreError>;

    /// Inserts or replaces the owner's record. Last write wins.
    ///
    /// Returns [`StoreError::Conflict`] when the slug belongs to another owner.
    async fn upsert_by_owner(
        &self,
        owner_id: Uuid,
        content: &SiteContent,
    ) -> Result<SiteRecord, StoreError>;

    /// Owner currently holding a slug, if any.
    async fn slug_owner(&self, slug: &str) -> Result<Option<Uuid>, StoreError>;
}

/// Append-only inbox of public submissions.
#[async_trait::async_trait]
pub trait RsvpInbox: Send + Sync {
    /// Appends a response unless one with the same fingerprint was stored at
    /// or after `dedup_since`. Check and insert are atomic.
    async fn insert(
        &self,
        rsvp: NewRsvp,
        dedup_since: DateTime<Utc>,
    ) -> Result<InboxInsert, StoreError>;

    /// Responses for a site, newest first.
    async fn list(&self, site_id: Uuid) -> Result<Vec<RsvpResponse>, StoreError>;
}

/// Owner-scoped guest list.
#[async_trait::async_trait]
pub trait GuestLedger: Send + Sync {
    /// Best guest for a normalized name key, deleted guests included.
    ///
    /// Active guests win over deleted ones; ties go to the oldest.
    async fn find_by_owner_and_name(
        &self,
        owner_id: Uuid,
        name_key: &str,
    ) -> Result<Option<GuestRecord>, StoreError>;

    async fn create(&self, guest: NewGuest) -> Result<GuestRecord, StoreError>;

    /// Creates the guest unless any guest (deleted or not) already has
    /// `name_key`. Check and insert are atomic.
    async fn create_if_name_absent(
        &self,
        guest: NewGuest,
        name_key: &str,
    ) -> Result<GuestCreate, StoreError>;

    /// Applies a patch to an active guest. `None` if it does not exist.
    async fn update(
        &self,
        owner_id: Uuid,
        guest_id: Uuid,
        patch: &GuestPatch,
    ) -> Result<Option<GuestRecord>, StoreError>;

    /// Active guests, newest first.
    async fn list(&self, owner_id: Uuid) -> Result<Vec<GuestRecord>, StoreError>;

    /// Soft-deletes an active guest. Returns false if nothing matched.
    async fn delete(&self, owner_id: Uuid, guest_id: Uuid) -> Result<bool, StoreError>;
}

/// Object storage for uploaded photos.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `path` and returns a stable public URL.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}
