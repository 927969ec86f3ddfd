//! Repository for the `vinyl_images` table.
//!
//! Besides plain reads, this is where a record's image order is maintained.
//! [`VinylImageRepo::append`], [`VinylImageRepo::reorder`] and
//! [`VinylImageRepo::delete`] each run in one transaction that first locks
//! the owning record's row, so they are serialized per record and either
//! apply completely or not at all. Dropping the future mid-way (request
//! timeout, client disconnect) drops the transaction, which rolls it back.

use sqlx::PgPool;
use vinyl_core::error::CoreError;
use vinyl_core::ordering;
use vinyl_core::types::DbId;

use crate::error::RepoError;
use crate::models::vinyl_image::{ImageDeletion, NewVinylImage, VinylImage};
use crate::repositories::{CdnDeletionRepo, VinylRecordRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, vinyl_record_id, image_url, image_public_id, alt_text, display_order, created_at";

/// Provides reads and order-maintaining writes for record images.
pub struct VinylImageRepo;

impl VinylImageRepo {
    /// Find an image by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VinylImage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vinyl_images WHERE id = $1");
        sqlx::query_as::<_, VinylImage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a record's images, ordered by `display_order` ascending.
    pub async fn list_by_record(
        pool: &PgPool,
        vinyl_record_id: DbId,
    ) -> Result<Vec<VinylImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vinyl_images
             WHERE vinyl_record_id = $1
             ORDER BY display_order ASC"
        );
        sqlx::query_as::<_, VinylImage>(&query)
            .bind(vinyl_record_id)
            .fetch_all(pool)
            .await
    }

    /// List the images of several records, grouped by record and ordered by
    /// `display_order` within each record.
    pub async fn list_by_records(
        pool: &PgPool,
        vinyl_record_ids: &[DbId],
    ) -> Result<Vec<VinylImage>, sqlx::Error> {
        if vinyl_record_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM vinyl_images
             WHERE vinyl_record_id = ANY($1)
             ORDER BY vinyl_record_id, display_order ASC"
        );
        sqlx::query_as::<_, VinylImage>(&query)
            .bind(vinyl_record_ids)
            .fetch_all(pool)
            .await
    }

    /// Count the images a record currently owns.
    pub async fn count_by_record(pool: &PgPool, vinyl_record_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM vinyl_images WHERE vinyl_record_id = $1")
            .bind(vinyl_record_id)
            .fetch_one(pool)
            .await
    }

    /// Append images to a record, after its current highest `display_order`.
    ///
    /// The new images get `max + 1, max + 2, ...` in input order (`1, 2, ...`
    /// for a record without images) and are returned in that order.
    ///
    /// Fails with `NotFound` if the record does not exist and with
    /// `Validation` for an empty or oversized batch.
    pub async fn append(
        pool: &PgPool,
        vinyl_record_id: DbId,
        images: &[NewVinylImage],
    ) -> Result<Vec<VinylImage>, RepoError> {
        ordering::validate_batch_size(images.len())?;

        let mut tx = pool.begin().await?;

        if !VinylRecordRepo::lock_for_update(&mut tx, vinyl_record_id).await? {
            return Err(record_not_found(vinyl_record_id));
        }

        let current_max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(display_order) FROM vinyl_images WHERE vinyl_record_id = $1",
        )
        .bind(vinyl_record_id)
        .fetch_one(&mut *tx)
        .await?;

        let orders = ordering::append_orders(current_max, images.len())?;

        let insert_query = format!(
            "INSERT INTO vinyl_images
                (vinyl_record_id, image_url, image_public_id, alt_text, display_order)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let mut created = Vec::with_capacity(images.len());
        for (input, order) in images.iter().zip(orders) {
            let image = sqlx::query_as::<_, VinylImage>(&insert_query)
                .bind(vinyl_record_id)
                .bind(&input.image_url)
                .bind(&input.image_public_id)
                .bind(&input.alt_text)
                .bind(order)
                .fetch_one(&mut *tx)
                .await?;
            created.push(image);
        }

        tx.commit().await?;

        tracing::debug!(
            vinyl_record_id,
            count = created.len(),
            first_order = created.first().map(|i| i.display_order),
            "Appended images"
        );
        Ok(created)
    }

    /// Replace the order of a record's images.
    ///
    /// `ordered_ids` must list every image of the record exactly once; the
    /// image at position `i` gets `display_order = i + 1`. Returns the
    /// record's images in their new order.
    ///
    /// Fails with `NotFound` if the record does not exist and with
    /// `Validation` for duplicate, foreign, or missing ids, in which case no
    /// order changes.
    pub async fn reorder(
        pool: &PgPool,
        vinyl_record_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<Vec<VinylImage>, RepoError> {
        let mut tx = pool.begin().await?;

        if !VinylRecordRepo::lock_for_update(&mut tx, vinyl_record_id).await? {
            return Err(record_not_found(vinyl_record_id));
        }

        let current: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM vinyl_images WHERE vinyl_record_id = $1")
                .bind(vinyl_record_id)
                .fetch_all(&mut *tx)
                .await?;

        ordering::validate_reorder(&current, ordered_ids)?;

        let (ids, orders): (Vec<DbId>, Vec<i32>) =
            ordering::sequence(ordered_ids).into_iter().unzip();

        let result = sqlx::query(
            "UPDATE vinyl_images AS vi
             SET display_order = v.display_order
             FROM UNNEST($1::bigint[], $2::int[]) AS v(id, display_order)
             WHERE vi.id = v.id AND vi.vinyl_record_id = $3",
        )
        .bind(&ids)
        .bind(&orders)
        .bind(vinyl_record_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() != ids.len() as u64 {
            // Cannot happen under the record lock.
            return Err(CoreError::Conflict(
                "Images changed while reordering; retry the request".into(),
            )
            .into());
        }

        let query = format!(
            "SELECT {COLUMNS} FROM vinyl_images
             WHERE vinyl_record_id = $1
             ORDER BY display_order ASC"
        );
        let images = sqlx::query_as::<_, VinylImage>(&query)
            .bind(vinyl_record_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(vinyl_record_id, count = images.len(), "Reordered images");
        Ok(images)
    }

    /// Delete one image without renumbering its siblings.
    ///
    /// Queues the image's CDN blob in the outbox in the same transaction and
    /// returns the owning record's remaining image count. Returns `None` if
    /// the image does not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<ImageDeletion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owner: Option<DbId> =
            sqlx::query_scalar("SELECT vinyl_record_id FROM vinyl_images WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(vinyl_record_id) = owner else {
            return Ok(None);
        };

        // Same lock order as the other writers: record first, then images.
        if !VinylRecordRepo::lock_for_update(&mut tx, vinyl_record_id).await? {
            return Ok(None);
        }

        let query = format!("DELETE FROM vinyl_images WHERE id = $1 RETURNING {COLUMNS}");
        let Some(image) = sqlx::query_as::<_, VinylImage>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let remaining_images: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM vinyl_images WHERE vinyl_record_id = $1")
                .bind(vinyl_record_id)
                .fetch_one(&mut *tx)
                .await?;

        let cdn_deletion =
            CdnDeletionRepo::enqueue_one(&mut tx, Some(vinyl_record_id), &image.image_public_id)
                .await?;

        tx.commit().await?;

        Ok(Some(ImageDeletion {
            image,
            remaining_images,
            cdn_deletion,
        }))
    }
}

fn record_not_found(id: DbId) -> RepoError {
    RepoError::Core(CoreError::NotFound {
        entity: "VinylRecord",
        id,
    })
}
