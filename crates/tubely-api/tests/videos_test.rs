//! Video record and health endpoint integration tests.
//!
//! Run with: `cargo test -p tubely-api --test videos_test`

mod helpers;

use axum::http::StatusCode;
use helpers::auth::register_test_user;
use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_get_video() {
    let app = setup_test_app().await;
    let user = register_test_user(&app);

    let response = app
        .client()
        .post(&api_path("/videos"))
        .add_header("Authorization", user.bearer())
        .json(&json!({ "title": "  Boots  ", "description": "Unboxing" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["title"], "Boots");
    assert_eq!(created["user_id"], user.user_id.to_string());
    assert!(created["video_url"].is_null());
    assert!(created["thumbnail_url"].is_null());

    let id = created["id"].as_str().unwrap();
    let response = app
        .client()
        .get(&api_path(&format!("/videos/{}", id)))
        .add_header("Authorization", user.bearer())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let fetched: Value = response.json();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_video_requires_title() {
    let app = setup_test_app().await;
    let user = register_test_user(&app);

    let response = app
        .client()
        .post(&api_path("/videos"))
        .add_header("Authorization", user.bearer())
        .json(&json!({ "title": "   " }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_create_video_rejects_malformed_body() {
    let app = setup_test_app().await;
    let user = register_test_user(&app);

    let response = app
        .client()
        .post(&api_path("/videos"))
        .add_header("Authorization", user.bearer())
        .json(&json!({ "description": "no title" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_video_requires_token() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/videos"))
        .json(&json!({ "title": "Boots" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_video_owner_only() {
    let app = setup_test_app().await;
    let owner = register_test_user(&app);
    let other = register_test_user(&app);
    let video = app.create_video(owner.user_id).await;

    let response = app
        .client()
        .get(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", other.bearer())
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_unknown_video() {
    let app = setup_test_app().await;
    let user = register_test_user(&app);

    let response = app
        .client()
        .get(&api_path(&format!("/videos/{}", Uuid::new_v4())))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .client()
        .get(&api_path("/videos/42"))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "in-memory");
    assert_eq!(body["storage"], "healthy");
}

#[tokio::test]
async fn test_openapi_spec_is_public() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["paths"]["/api/video_upload/{videoID}"].is_object());
}
