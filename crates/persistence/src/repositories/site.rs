//! Wedding site repository for database operations.

use async_trait::async_trait;
use domain::models::{SiteContent, SiteRecord};
use domain::stores::SiteStore;
use domain::StoreError;
use sqlx::PgPool;
use uuid::Uuid;

use super::store_err;
use crate::entities::{SiteEntity, SiteThemeDb};
use crate::metrics::QueryTimer;

/// Repository for wedding site database operations.
#[derive(Clone)]
pub struct SiteRepository {
    pool: PgPool,
}

impl SiteRepository {
    /// Creates a new SiteRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find the site owned by a user.
    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<SiteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_site_by_owner");
        let result = sqlx::query_as::<_, SiteEntity>(
            r#"
            SELECT id, owner_id, slug, theme, bride_name, groom_name, event_date, event_time,
                   location_name, location_address, location_map_url, headline, story,
                   hero_image, album, rsvp_enabled, created_at, updated_at
            FROM wedding_sites
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Find a site by its public slug.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<SiteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_site_by_slug");
        let result = sqlx::query_as::<_, SiteEntity>(
            r#"
            SELECT id, owner_id, slug, theme, bride_name, groom_name, event_date, event_time,
                   location_name, location_address, location_map_url, headline, story,
                   hero_image, album, rsvp_enabled, created_at, updated_at
            FROM wedding_sites
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Owner of a slug, if it is taken.
    pub async fn find_slug_owner(&self, slug: &str) -> Result<Option<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("find_slug_owner");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT owner_id FROM wedding_sites WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Insert or replace the owner's site.
    ///
    /// Fails with a unique violation when the slug is held by another owner.
    pub async fn upsert(
        &self,
        owner_id: Uuid,
        content: &SiteContent,
    ) -> Result<SiteEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_site");
        let result = sqlx::query_as::<_, SiteEntity>(
            r#"
            INSERT INTO wedding_sites (
                owner_id, slug, theme, bride_name, groom_name, event_date, event_time,
                location_name, location_address, location_map_url, headline, story,
                hero_image, album, rsvp_enabled
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (owner_id) DO UPDATE SET
                slug = EXCLUDED.slug,
                theme = EXCLUDED.theme,
                bride_name = EXCLUDED.bride_name,
                groom_name = EXCLUDED.groom_name,
                event_date = EXCLUDED.event_date,
                event_time = EXCLUDED.event_time,
                location_name = EXCLUDED.location_name,
                location_address = EXCLUDED.location_address,
                location_map_url = EXCLUDED.location_map_url,
                headline = EXCLUDED.headline,
                story = EXCLUDED.story,
                hero_image = EXCLUDED.hero_image,
                album = EXCLUDED.album,
                rsvp_enabled = EXCLUDED.rsvp_enabled,
                updated_at = NOW()
            RETURNING id, owner_id, slug, theme, bride_name, groom_name, event_date, event_time,
                      location_name, location_address, location_map_url, headline, story,
                      hero_image, album, rsvp_enabled, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&content.slug)
        .bind(SiteThemeDb::from(content.theme))
        .bind(&content.bride_name)
        .bind(&content.groom_name)
        .bind(content.event_date)
        .bind(content.event_time)
        .bind(&content.location_name)
        .bind(&content.location_address)
        .bind(&content.location_map_url)
        .bind(&content.headline)
        .bind(&content.story)
        .bind(&content.hero_image)
        .bind(&content.album)
        .bind(content.rsvp_enabled)
        .fetch_one(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }
}

#[async_trait]
impl SiteStore for SiteRepository {
    async fn get_by_owner(&self, owner_id: Uuid) -> Result<Option<SiteRecord>, StoreError> {
        Ok(self
            .find_by_owner(owner_id)
            .await
            .map_err(store_err)?
            .map(SiteRecord::from))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<SiteRecord>, StoreError> {
        Ok(self
            .find_by_slug(slug)
            .await
            .map_err(store_err)?
            .map(SiteRecord::from))
    }

    async fn upsert_by_owner(
        &self,
        owner_id: Uuid,
        content: &SiteContent,
    ) -> Result<SiteRecord, StoreError> {
        self.upsert(owner_id, content)
            .await
            .map(SiteRecord::from)
            .map_err(store_err)
    }

    async fn slug_owner(&self, slug: &str) -> Result<Option<Uuid>, StoreError> {
        self.find_slug_owner(slug).await.map_err(store_err)
    }
}
