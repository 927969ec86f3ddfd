//! Integration tests for record CRUD, gallery search, and cascading delete.

use sqlx::PgPool;
use vinyl_db::models::vinyl_image::NewVinylImage;
use vinyl_db::models::vinyl_record::{CreateVinylRecord, RecordFilter, UpdateVinylRecord};
use vinyl_db::repositories::{CdnDeletionRepo, VinylImageRepo, VinylRecordRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_record(title: &str, artist: &str, genre: Option<&str>) -> CreateVinylRecord {
    CreateVinylRecord {
        title: title.to_string(),
        artist: artist.to_string(),
        year: Some(1973),
        genre: genre.map(str::to_string),
        description: None,
    }
}

fn new_image(public_id: &str) -> NewVinylImage {
    NewVinylImage {
        image_url: format!("https://res.cloudinary.com/demo/image/upload/{public_id}.jpg"),
        image_public_id: public_id.to_string(),
        alt_text: None,
    }
}

fn filter() -> RecordFilter {
    RecordFilter {
        limit: 50,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_find(pool: PgPool) {
    let created = VinylRecordRepo::create(
        &pool,
        &new_record("The Dark Side of the Moon", "Pink Floyd", Some("Rock")),
    )
    .await
    .unwrap();

    let found = VinylRecordRepo::find_with_images(&pool, created.id)
        .await
        .unwrap()
        .expect("record should exist");
    assert_eq!(found.record.title, "The Dark Side of the Moon");
    assert_eq!(found.record.genre.as_deref(), Some("Rock"));
    assert!(found.images.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_find_missing_returns_none(pool: PgPool) {
    assert!(VinylRecordRepo::find_by_id(&pool, 999_999)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_partial_update_keeps_omitted_fields(pool: PgPool) {
    let created = VinylRecordRepo::create(&pool, &new_record("Blue", "Joni Mitchell", Some("Folk")))
        .await
        .unwrap();

    let updated = VinylRecordRepo::update(
        &pool,
        created.id,
        &UpdateVinylRecord {
            year: Some(1971),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.year, Some(1971));
    assert_eq!(updated.title, "Blue");
    assert_eq!(updated.genre.as_deref(), Some("Folk"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_missing_returns_none(pool: PgPool) {
    let result = VinylRecordRepo::update(&pool, 999_999, &UpdateVinylRecord::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Listing and search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_list_newest_first_with_ordered_images(pool: PgPool) {
    let first = VinylRecordRepo::create(&pool, &new_record("Older", "A", None))
        .await
        .unwrap();
    let second = VinylRecordRepo::create(&pool, &new_record("Newer", "B", None))
        .await
        .unwrap();

    let images = VinylImageRepo::append(&pool, first.id, &[new_image("a"), new_image("b")])
        .await
        .unwrap();
    VinylImageRepo::reorder(&pool, first.id, &[images[1].id, images[0].id])
        .await
        .unwrap();

    let listed = VinylRecordRepo::list(&pool, &filter()).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].record.id, second.id);
    assert_eq!(listed[1].record.id, first.id);

    let public_ids: Vec<&str> = listed[1]
        .images
        .iter()
        .map(|i| i.image_public_id.as_str())
        .collect();
    assert_eq!(public_ids, vec!["b", "a"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_matches_title_artist_and_genre(pool: PgPool) {
    VinylRecordRepo::create(&pool, &new_record("Abbey Road", "The Beatles", Some("Rock")))
        .await
        .unwrap();
    VinylRecordRepo::create(&pool, &new_record("Kind of Blue", "Miles Davis", Some("Jazz")))
        .await
        .unwrap();
    VinylRecordRepo::create(&pool, &new_record("Blue Train", "John Coltrane", Some("Jazz")))
        .await
        .unwrap();

    let by_title = VinylRecordRepo::list(
        &pool,
        &RecordFilter {
            query: Some("blue".into()),
            ..filter()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_title.len(), 2);

    let by_artist = VinylRecordRepo::list(
        &pool,
        &RecordFilter {
            query: Some("BEATLES".into()),
            ..filter()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_artist.len(), 1);
    assert_eq!(by_artist[0].record.title, "Abbey Road");

    let by_genre = VinylRecordRepo::list(
        &pool,
        &RecordFilter {
            genre: Some("jazz".into()),
            ..filter()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_genre.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_treats_wildcards_literally(pool: PgPool) {
    VinylRecordRepo::create(&pool, &new_record("100% Hits", "Various", None))
        .await
        .unwrap();
    VinylRecordRepo::create(&pool, &new_record("1000 Hits", "Various", None))
        .await
        .unwrap();

    let found = VinylRecordRepo::list(
        &pool,
        &RecordFilter {
            query: Some("100%".into()),
            ..filter()
        },
    )
    .await
    .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].record.title, "100% Hits");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_pagination(pool: PgPool) {
    for i in 0..5 {
        VinylRecordRepo::create(&pool, &new_record(&format!("Record {i}"), "X", None))
            .await
            .unwrap();
    }

    let page = VinylRecordRepo::list(
        &pool,
        &RecordFilter {
            limit: 2,
            offset: 4,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].record.title, "Record 0");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_genres_distinct_sorted(pool: PgPool) {
    for (title, genre) in [("a", Some("Rock")), ("b", Some("Jazz")), ("c", Some("Rock")), ("d", None)] {
        VinylRecordRepo::create(&pool, &new_record(title, "X", genre))
            .await
            .unwrap();
    }

    let genres = VinylRecordRepo::list_genres(&pool).await.unwrap();
    assert_eq!(genres, vec!["Jazz".to_string(), "Rock".to_string()]);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_cascades_and_queues_cdn_deletions(pool: PgPool) {
    let record = VinylRecordRepo::create(&pool, &new_record("Rumours", "Fleetwood Mac", None))
        .await
        .unwrap();
    VinylImageRepo::append(
        &pool,
        record.id,
        &[new_image("front"), new_image("back"), new_image("label")],
    )
    .await
    .unwrap();

    let deletion = VinylRecordRepo::delete(&pool, record.id)
        .await
        .unwrap()
        .expect("record should exist");

    assert_eq!(deletion.deleted_images_count, 3);
    let mut queued: Vec<String> = deletion
        .cdn_deletions
        .iter()
        .map(|d| d.image_public_id.clone())
        .collect();
    queued.sort();
    assert_eq!(queued, vec!["back", "front", "label"]);

    assert!(VinylRecordRepo::find_by_id(&pool, record.id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        VinylImageRepo::count_by_record(&pool, record.id).await.unwrap(),
        0
    );
    assert_eq!(CdnDeletionRepo::list_pending(&pool).await.unwrap().len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_record_without_images(pool: PgPool) {
    let record = VinylRecordRepo::create(&pool, &new_record("Empty", "Nobody", None))
        .await
        .unwrap();

    let deletion = VinylRecordRepo::delete(&pool, record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deletion.deleted_images_count, 0);
    assert!(deletion.cdn_deletions.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_missing_returns_none(pool: PgPool) {
    assert!(VinylRecordRepo::delete(&pool, 999_999)
        .await
        .unwrap()
        .is_none());
}
