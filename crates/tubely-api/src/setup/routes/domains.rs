//! Domain route groups (uploads, video records).

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn upload_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/video_upload/{{videoID}}", API_PREFIX),
            post(handlers::video_upload::upload_video),
        )
        .route(
            &format!("{}/thumbnail_upload/{{videoID}}", API_PREFIX),
            post(handlers::thumbnail_upload::upload_thumbnail),
        )
        .with_state(state)
}

pub fn video_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            post(handlers::videos::create_video),
        )
        .route(
            &format!("{}/videos/{{videoID}}", API_PREFIX),
            get(handlers::videos::get_video),
        )
        .with_state(state)
}
