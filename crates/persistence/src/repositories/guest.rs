//! Guest ledger repository for database operations.

use async_trait::async_trait;
use domain::models::{name_key, GuestCreate, GuestPatch, GuestRecord, NewGuest};
use domain::stores::GuestLedger;
use domain::StoreError;
use sqlx::PgPool;
use uuid::Uuid;

use super::store_err;
use crate::entities::{GuestCategoryDb, GuestEntity, GuestOriginDb};
use crate::metrics::QueryTimer;

/// Repository for guest ledger database operations.
#[derive(Clone)]
pub struct GuestRepository {
    pool: PgPool,
}

impl GuestRepository {
    /// Creates a new GuestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Best match for a name key: active before deleted, then oldest.
    pub async fn find_by_name_key(
        &self,
        owner_id: Uuid,
        key: &str,
    ) -> Result<Option<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_guest_by_name_key");
        let result = sqlx::query_as::<_, GuestEntity>(
            r#"
            SELECT id, owner_id, name, name_key, category, confirmed, plus_ones, origin,
                   created_at, updated_at, deleted_at
            FROM guests
            WHERE owner_id = $1 AND name_key = $2
            ORDER BY (deleted_at IS NOT NULL), created_at ASC
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Insert a guest.
    pub async fn insert(&self, guest: &NewGuest) -> Result<GuestEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_guest");
        let result = sqlx::query_as::<_, GuestEntity>(
            r#"
            INSERT INTO guests (owner_id, name, name_key, category, confirmed, plus_ones, origin)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, name, name_key, category, confirmed, plus_ones, origin,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(guest.owner_id)
        .bind(&guest.name)
        .bind(name_key(&guest.name))
        .bind(GuestCategoryDb::from(guest.category))
        .bind(guest.confirmed.as_option())
        .bind(guest.plus_ones)
        .bind(GuestOriginDb::from(guest.origin))
        .fetch_one(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Insert a guest unless the owner already has one with `key`.
    ///
    /// Returns the existing row (deleted or not) when one is found. The lock
    /// is scoped to the owner and key, so unrelated inserts do not contend.
    pub async fn insert_if_name_absent(
        &self,
        guest: &NewGuest,
        key: &str,
    ) -> Result<(GuestEntity, bool), sqlx::Error> {
        let timer = QueryTimer::new("insert_guest_if_name_absent");
        let result: Result<(GuestEntity, bool), sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;

            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(format!("guest:{}:{}", guest.owner_id, key))
                .execute(&mut *tx)
                .await?;

            let existing = sqlx::query_as::<_, GuestEntity>(
                r#"
                SELECT id, owner_id, name, name_key, category, confirmed, plus_ones, origin,
                       created_at, updated_at, deleted_at
                FROM guests
                WHERE owner_id = $1 AND name_key = $2
                ORDER BY (deleted_at IS NOT NULL), created_at ASC
                LIMIT 1
                "#,
            )
            .bind(guest.owner_id)
            .bind(key)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(row) = existing {
                tx.commit().await?;
                return Ok((row, false));
            }

            let row = sqlx::query_as::<_, GuestEntity>(
                r#"
                INSERT INTO guests (owner_id, name, name_key, category, confirmed, plus_ones, origin)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, owner_id, name, name_key, category, confirmed, plus_ones, origin,
                          created_at, updated_at, deleted_at
                "#,
            )
            .bind(guest.owner_id)
            .bind(&guest.name)
            .bind(key)
            .bind(GuestCategoryDb::from(guest.category))
            .bind(guest.confirmed.as_option())
            .bind(guest.plus_ones)
            .bind(GuestOriginDb::from(guest.origin))
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok((row, true))
        }
        .await;
        timer.record_result(&result);
        result
    }

    /// Apply a partial update to an active guest.
    ///
    /// `confirmed` needs an explicit flag because NULL is a valid target value.
    pub async fn update_guest(
        &self,
        owner_id: Uuid,
        guest_id: Uuid,
        patch: &GuestPatch,
    ) -> Result<Option<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_guest");
        let new_key = patch.name.as_deref().map(name_key);
        let result = sqlx::query_as::<_, GuestEntity>(
            r#"
            UPDATE guests SET
                name = COALESCE($3, name),
                name_key = COALESCE($4, name_key),
                category = COALESCE($5, category),
                confirmed = CASE WHEN $6 THEN $7 ELSE confirmed END,
                plus_ones = COALESCE($8, plus_ones),
                updated_at = NOW()
            WHERE owner_id = $1 AND id = $2 AND deleted_at IS NULL
            RETURNING id, owner_id, name, name_key, category, confirmed, plus_ones, origin,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(owner_id)
        .bind(guest_id)
        .bind(&patch.name)
        .bind(new_key)
        .bind(patch.category.map(GuestCategoryDb::from))
        .bind(patch.confirmed.is_some())
        .bind(patch.confirmed.and_then(|c| c.as_option()))
        .bind(patch.plus_ones)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Active guests, newest first.
    pub async fn list_active(&self, owner_id: Uuid) -> Result<Vec<GuestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_guests");
        let result = sqlx::query_as::<_, GuestEntity>(
            r#"
            SELECT id, owner_id, name, name_key, category, confirmed, plus_ones, origin,
                   created_at, updated_at, deleted_at
            FROM guests
            WHERE owner_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Soft delete an active guest. Returns the number of rows affected.
    pub async fn soft_delete(&self, owner_id: Uuid, guest_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("soft_delete_guest");
        let result = sqlx::query(
            r#"
            UPDATE guests
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE owner_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(owner_id)
        .bind(guest_id)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected());
        timer.record_result(&result);
        result
    }
}

#[async_trait]
impl GuestLedger for GuestRepository {
    async fn find_by_owner_and_name(
        &self,
        owner_id: Uuid,
        name_key: &str,
    ) -> Result<Option<GuestRecord>, StoreError> {
        Ok(self
            .find_by_name_key(owner_id, name_key)
            .await
            .map_err(store_err)?
            .map(GuestRecord::from))
    }

    async fn create(&self, guest: NewGuest) -> Result<GuestRecord, StoreError> {
        self.insert(&guest)
            .await
            .map(GuestRecord::from)
            .map_err(store_err)
    }

    async fn create_if_name_absent(
        &self,
        guest: NewGuest,
        name_key: &str,
    ) -> Result<GuestCreate, StoreError> {
        let (row, created) = self
            .insert_if_name_absent(&guest, name_key)
            .await
            .map_err(store_err)?;
        Ok(if created {
            GuestCreate::Created(row.into())
        } else {
            GuestCreate::Existing(row.into())
        })
    }

    async fn update(
        &self,
        owner_id: Uuid,
        guest_id: Uuid,
        patch: &GuestPatch,
    ) -> Result<Option<GuestRecord>, StoreError> {
        Ok(self
            .update_guest(owner_id, guest_id, patch)
            .await
            .map_err(store_err)?
            .map(GuestRecord::from))
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<GuestRecord>, StoreError> {
        Ok(self
            .list_active(owner_id)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(GuestRecord::from)
            .collect())
    }

    async fn delete(&self, owner_id: Uuid, guest_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.soft_delete(owner_id, guest_id).await.map_err(store_err)? > 0)
    }
}
