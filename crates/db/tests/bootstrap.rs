use sqlx::PgPool;

/// Connect, migrate, verify the schema is in place.
#[sqlx::test(migrations = "./migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    vinyl_db::health_check(&pool).await.unwrap();

    for table in ["users", "vinyl_records", "vinyl_images", "cdn_deletions"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// The per-record order constraint must be deferrable so a reorder can swap
/// values inside one statement.
#[sqlx::test(migrations = "./migrations")]
async fn test_display_order_constraint_is_deferrable(pool: PgPool) {
    let row: (bool, bool) = sqlx::query_as(
        "SELECT condeferrable, condeferred FROM pg_constraint
         WHERE conname = 'uq_vinyl_images_record_display_order'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(row.0, "constraint should be deferrable");
    assert!(row.1, "constraint should be initially deferred");
}

/// `updated_at` is maintained by trigger.
#[sqlx::test(migrations = "./migrations")]
async fn test_updated_at_trigger(pool: PgPool) {
    let (id, created): (i64, chrono::DateTime<chrono::Utc>) = sqlx::query_as(
        "INSERT INTO vinyl_records (title, artist) VALUES ('Kind of Blue', 'Miles Davis')
         RETURNING id, updated_at",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let updated: (chrono::DateTime<chrono::Utc>,) = sqlx::query_as(
        "UPDATE vinyl_records SET genre = 'Jazz' WHERE id = $1 RETURNING updated_at",
    )
    .bind(id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert!(updated.0 >= created);
}
