//! Tests for the background sweep that retries queued CDN deletes.

mod common;

use std::sync::Arc;

use common::FakeCdn;
use sqlx::PgPool;
use vinyl_api::background::cdn_outbox;
use vinyl_core::outbox::MAX_CDN_ATTEMPTS;
use vinyl_db::repositories::CdnDeletionRepo;

/// Queue blobs the way a delete does, then make every row due now.
async fn queue_due(pool: &PgPool, public_ids: &[&str]) {
    let ids: Vec<String> = public_ids.iter().map(|s| s.to_string()).collect();
    let mut tx = pool.begin().await.unwrap();
    CdnDeletionRepo::enqueue(&mut tx, None, &ids).await.unwrap();
    tx.commit().await.unwrap();
    make_due(pool).await;
}

async fn make_due(pool: &PgPool) {
    sqlx::query("UPDATE cdn_deletions SET next_attempt_at = NOW() - INTERVAL '1 second'")
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_sweep_drains_due_rows(pool: PgPool) {
    queue_due(&pool, &["a", "b"]).await;
    let cdn = Arc::new(FakeCdn::default());

    let claimed = cdn_outbox::sweep(&pool, cdn.as_ref()).await.unwrap();
    assert_eq!(claimed, 2);

    let mut deleted = cdn.deleted();
    deleted.sort();
    assert_eq!(deleted, vec!["a", "b"]);
    assert!(CdnDeletionRepo::list_pending(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_sweep_skips_leased_rows(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    CdnDeletionRepo::enqueue(&mut tx, None, &["fresh".to_string()])
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let cdn = Arc::new(FakeCdn::default());
    let claimed = cdn_outbox::sweep(&pool, cdn.as_ref()).await.unwrap();

    assert_eq!(claimed, 0);
    assert!(cdn.deleted().is_empty());
    assert_eq!(CdnDeletionRepo::list_pending(&pool).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_sweep_backs_off_then_gives_up(pool: PgPool) {
    queue_due(&pool, &["stubborn"]).await;
    let cdn = Arc::new(FakeCdn::default());
    cdn.set_fail_all(true);

    for attempt in 1..=MAX_CDN_ATTEMPTS {
        make_due(&pool).await;
        let claimed = cdn_outbox::sweep(&pool, cdn.as_ref()).await.unwrap();
        assert_eq!(claimed, 1, "attempt {attempt}");
    }

    // Abandoned rows are no longer pending or claimable.
    assert!(CdnDeletionRepo::list_pending(&pool).await.unwrap().is_empty());
    make_due(&pool).await;
    assert_eq!(cdn_outbox::sweep(&pool, cdn.as_ref()).await.unwrap(), 0);

    let abandoned: (i32, bool) = sqlx::query_as(
        "SELECT attempts, failed_at IS NOT NULL FROM cdn_deletions WHERE image_public_id = 'stubborn'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(abandoned, (MAX_CDN_ATTEMPTS, true));
}
