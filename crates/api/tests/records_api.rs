//! HTTP-level tests for the `/records` resource.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, post_json_auth, put_json_auth, FakeCdn};
use serde_json::json;
use sqlx::PgPool;
use vinyl_db::repositories::CdnDeletionRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a record over HTTP and return its id.
async fn create_record(pool: &PgPool, token: &str, body: serde_json::Value) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/records", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn append_images(pool: &PgPool, token: &str, record_id: i64, public_ids: &[&str]) {
    let images: Vec<_> = public_ids
        .iter()
        .map(|id| {
            json!({
                "image_url": format!("https://res.cloudinary.com/demo/image/upload/{id}.jpg"),
                "image_public_id": id,
            })
        })
        .collect();
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/records/{record_id}/images"),
        json!({ "images": images }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_and_get_record(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let id = create_record(
        &pool,
        &token,
        json!({
            "title": "  Kind of Blue ",
            "artist": "Miles Davis",
            "year": 1959,
            "genre": "Jazz",
        }),
    )
    .await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/records/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Kind of Blue");
    assert_eq!(json["data"]["year"], 1959);
    assert_eq!(json["data"]["images"], json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_validation_errors(pool: PgPool) {
    let token = common::admin_token(&pool).await;

    for body in [
        json!({ "title": "", "artist": "X" }),
        json!({ "title": "X", "artist": "X", "year": 1850 }),
        json!({ "title": "X", "artist": "X", "genre": "g".repeat(101) }),
    ] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(app, "/api/v1/records", body, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_rejects_unknown_fields(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/records",
        json!({ "title": "X", "artist": "Y", "price": 20 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_missing_record_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/records/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// List / search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_search_and_genre_filter(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    create_record(&pool, &token, json!({ "title": "Abbey Road", "artist": "The Beatles", "genre": "Rock" })).await;
    create_record(&pool, &token, json!({ "title": "Kind of Blue", "artist": "Miles Davis", "genre": "Jazz" })).await;
    create_record(&pool, &token, json!({ "title": "Blue Train", "artist": "John Coltrane", "genre": "Jazz" })).await;

    let app = common::build_test_app(pool.clone());
    let all = body_json(get(app, "/api/v1/records").await).await;
    let titles: Vec<&str> = all["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Blue Train", "Kind of Blue", "Abbey Road"]);

    let app = common::build_test_app(pool.clone());
    let blue = body_json(get(app, "/api/v1/records?q=blue").await).await;
    assert_eq!(blue["data"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool.clone());
    let rock = body_json(get(app, "/api/v1/records?genre=rock").await).await;
    assert_eq!(rock["data"].as_array().unwrap().len(), 1);
    assert_eq!(rock["data"][0]["artist"], "The Beatles");

    let app = common::build_test_app(pool.clone());
    let page = body_json(get(app, "/api/v1/records?limit=1&offset=1").await).await;
    assert_eq!(page["data"][0]["title"], "Kind of Blue");

    let app = common::build_test_app(pool);
    let genres = body_json(get(app, "/api/v1/records/genres").await).await;
    assert_eq!(genres["data"], json!(["Jazz", "Rock"]));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_partial_update(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let id = create_record(&pool, &token, json!({ "title": "Blue", "artist": "Joni Mitchell", "genre": "Folk" })).await;

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/records/{id}"),
        json!({ "year": 1971 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["year"], 1971);
    assert_eq!(json["data"]["title"], "Blue");
    assert_eq!(json["data"]["genre"], "Folk");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_missing_record_is_404(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(app, "/api/v1/records/999999", json!({ "year": 1971 }), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_cascades_and_destroys_blobs(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let id = create_record(&pool, &token, json!({ "title": "Rumours", "artist": "Fleetwood Mac" })).await;
    append_images(&pool, &token, id, &["front", "back", "label"]).await;

    let cdn = Arc::new(FakeCdn::default());
    let app = common::build_test_app_with_cdn(pool.clone(), Arc::clone(&cdn));
    let response = delete_auth(app, &format!("/api/v1/records/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["deleted_images_count"], 3);
    assert_eq!(json["data"]["warnings"], json!([]));

    let mut deleted = cdn.deleted();
    deleted.sort();
    assert_eq!(deleted, vec!["back", "front", "label"]);
    assert!(CdnDeletionRepo::list_pending(&pool).await.unwrap().is_empty());

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/records/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_survives_cdn_failures(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let id = create_record(&pool, &token, json!({ "title": "Tapestry", "artist": "Carole King" })).await;
    append_images(&pool, &token, id, &["ok-1", "broken", "ok-2"]).await;

    let cdn = Arc::new(FakeCdn::default());
    cdn.fail_on("broken");
    let app = common::build_test_app_with_cdn(pool.clone(), Arc::clone(&cdn));
    let response = delete_auth(app, &format!("/api/v1/records/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["deleted_images_count"], 3);
    let warnings = json["data"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("broken"));

    // The failed blob stays queued for the background worker.
    let pending = CdnDeletionRepo::list_pending(&pool).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].image_public_id, "broken");
    assert_eq!(pending[0].attempts, 1);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/records/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_without_cdn_keeps_blobs_queued(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let id = create_record(&pool, &token, json!({ "title": "Debut", "artist": "Björk" })).await;
    append_images(&pool, &token, id, &["cover", "sleeve"]).await;

    let app = common::build_test_app_without_cdn(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/records/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["deleted_images_count"], 2);
    assert_eq!(json["data"]["warnings"].as_array().unwrap().len(), 2);

    let mut pending: Vec<String> = CdnDeletionRepo::list_pending(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.image_public_id)
        .collect();
    pending.sort();
    assert_eq!(pending, vec!["cover", "sleeve"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_missing_record_is_404(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = delete_auth(app, "/api/v1/records/999999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
