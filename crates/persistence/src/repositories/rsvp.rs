//! RSVP inbox repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{InboxInsert, NewRsvp, RsvpResponse};
use domain::stores::RsvpInbox;
use domain::StoreError;
use sqlx::PgPool;
use uuid::Uuid;

use super::store_err;
use crate::entities::RsvpResponseEntity;
use crate::metrics::QueryTimer;

/// Whether a deduplicated insert stored a new row.
#[derive(Debug, Clone)]
pub enum InsertedRow {
    New(RsvpResponseEntity),
    Existing(RsvpResponseEntity),
}

/// Repository for RSVP response database operations.
#[derive(Clone)]
pub struct RsvpRepository {
    pool: PgPool,
}

impl RsvpRepository {
    /// Creates a new RsvpRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a response unless the same fingerprint was stored since `since`.
    ///
    /// Concurrent inserts with one fingerprint are serialized by a
    /// transaction-scoped advisory lock.
    pub async fn insert_deduplicated(
        &self,
        rsvp: &NewRsvp,
        since: DateTime<Utc>,
    ) -> Result<InsertedRow, sqlx::Error> {
        let timer = QueryTimer::new("insert_rsvp_deduplicated");
        let result: Result<InsertedRow, sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;

            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(&rsvp.fingerprint)
                .execute(&mut *tx)
                .await?;

            let existing = sqlx::query_as::<_, RsvpResponseEntity>(
                r#"
                SELECT id, site_id, guest_name, email, phone, confirmed, message,
                       fingerprint, created_at
                FROM rsvp_responses
                WHERE site_id = $1 AND fingerprint = $2 AND created_at >= $3
                ORDER BY created_at DESC
                LIMIT 1
                "#,
            )
            .bind(rsvp.site_id)
            .bind(&rsvp.fingerprint)
            .bind(since)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(row) = existing {
                tx.commit().await?;
                return Ok(InsertedRow::Existing(row));
            }

            let row = sqlx::query_as::<_, RsvpResponseEntity>(
                r#"
                INSERT INTO rsvp_responses
                    (site_id, guest_name, email, phone, confirmed, message, fingerprint)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, site_id, guest_name, email, phone, confirmed, message,
                          fingerprint, created_at
                "#,
            )
            .bind(rsvp.site_id)
            .bind(&rsvp.guest_name)
            .bind(&rsvp.email)
            .bind(&rsvp.phone)
            .bind(rsvp.confirmed)
            .bind(&rsvp.message)
            .bind(&rsvp.fingerprint)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(InsertedRow::New(row))
        }
        .await;
        timer.record_result(&result);
        result
    }

    /// Responses for a site, newest first.
    pub async fn list_for_site(
        &self,
        site_id: Uuid,
    ) -> Result<Vec<RsvpResponseEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_rsvps_for_site");
        let result = sqlx::query_as::<_, RsvpResponseEntity>(
            r#"
            SELECT id, site_id, guest_name, email, phone, confirmed, message,
                   fingerprint, created_at
            FROM rsvp_responses
            WHERE site_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }
}

#[async_trait]
impl RsvpInbox for RsvpRepository {
    async fn insert(
        &self,
        rsvp: NewRsvp,
        dedup_since: DateTime<Utc>,
    ) -> Result<InboxInsert, StoreError> {
        let row = self
            .insert_deduplicated(&rsvp, dedup_since)
            .await
            .map_err(store_err)?;
        Ok(match row {
            InsertedRow::New(entity) => InboxInsert::Inserted(entity.into()),
            InsertedRow::Existing(entity) => InboxInsert::Duplicate(entity.into()),
        })
    }

    async fn list(&self, site_id: Uuid) -> Result<Vec<RsvpResponse>, StoreError> {
        Ok(self
            .list_for_site(site_id)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(RsvpResponse::from)
            .collect())
    }
}
