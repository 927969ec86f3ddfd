//! Repository for the `vinyl_records` table.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use vinyl_core::search::like_pattern;
use vinyl_core::types::DbId;

use crate::models::vinyl_record::{
    CreateVinylRecord, RecordDeletion, RecordFilter, UpdateVinylRecord, VinylRecord,
    VinylRecordWithImages,
};
use crate::repositories::{CdnDeletionRepo, VinylImageRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, artist, year, genre, description, created_at, updated_at";

/// Provides CRUD operations for vinyl records.
pub struct VinylRecordRepo;

impl VinylRecordRepo {
    /// Insert a new record, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateVinylRecord,
    ) -> Result<VinylRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO vinyl_records (title, artist, year, genre, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VinylRecord>(&query)
            .bind(&input.title)
            .bind(&input.artist)
            .bind(input.year)
            .bind(&input.genre)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a record by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VinylRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vinyl_records WHERE id = $1");
        sqlx::query_as::<_, VinylRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a record by ID, enriched with its images in display order.
    pub async fn find_with_images(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VinylRecordWithImages>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(record) => {
                let images = VinylImageRepo::list_by_record(pool, record.id).await?;
                Ok(Some(VinylRecordWithImages { record, images }))
            }
            None => Ok(None),
        }
    }

    /// List records newest first, applying the gallery search and genre filter.
    ///
    /// Images for the whole page are fetched in one query and attached in
    /// display order.
    pub async fn list(
        pool: &PgPool,
        filter: &RecordFilter,
    ) -> Result<Vec<VinylRecordWithImages>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vinyl_records
             WHERE ($1::text IS NULL
                    OR title ILIKE $1 ESCAPE '\\'
                    OR artist ILIKE $1 ESCAPE '\\'
                    OR genre ILIKE $1 ESCAPE '\\')
               AND ($2::text IS NULL OR LOWER(genre) = LOWER($2))
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        let records = sqlx::query_as::<_, VinylRecord>(&query)
            .bind(filter.query.as_deref().map(like_pattern))
            .bind(&filter.genre)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await?;

        let ids: Vec<DbId> = records.iter().map(|r| r.id).collect();
        let mut images_by_record = HashMap::<DbId, Vec<_>>::new();
        for image in VinylImageRepo::list_by_records(pool, &ids).await? {
            images_by_record
                .entry(image.vinyl_record_id)
                .or_default()
                .push(image);
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let images = images_by_record.remove(&record.id).unwrap_or_default();
                VinylRecordWithImages { record, images }
            })
            .collect())
    }

    /// Distinct, non-null genres in alphabetical order.
    pub async fn list_genres(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT genre FROM vinyl_records WHERE genre IS NOT NULL ORDER BY genre",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a record. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVinylRecord,
    ) -> Result<Option<VinylRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE vinyl_records SET
                title = COALESCE($2, title),
                artist = COALESCE($3, artist),
                year = COALESCE($4, year),
                genre = COALESCE($5, genre),
                description = COALESCE($6, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VinylRecord>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.artist)
            .bind(input.year)
            .bind(&input.genre)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a record and, through `ON DELETE CASCADE`, all of its images.
    ///
    /// Under the record's row lock: counts the images, queues one CDN
    /// deletion per image in the outbox, then deletes. Everything commits
    /// together. Returns `None` if the record does not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<RecordDeletion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !Self::lock_for_update(&mut tx, id).await? {
            return Ok(None);
        }

        let public_ids: Vec<String> = sqlx::query_scalar(
            "SELECT image_public_id FROM vinyl_images
             WHERE vinyl_record_id = $1
             ORDER BY display_order",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let cdn_deletions = CdnDeletionRepo::enqueue(&mut tx, Some(id), &public_ids).await?;

        sqlx::query("DELETE FROM vinyl_records WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(RecordDeletion {
            deleted_images_count: public_ids.len() as i64,
            cdn_deletions,
        }))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Take the record's row lock for the rest of the transaction.
    ///
    /// Every operation that reads then rewrites a record's image set goes
    /// through this lock, so such operations on one record run one at a time
    /// while different records proceed independently. Returns `false` if the
    /// record does not exist.
    pub(crate) async fn lock_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM vinyl_records WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(locked.is_some())
    }
}
