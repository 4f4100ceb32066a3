use crate::auth::AuthenticatedUser;
use crate::error::{body_read_error, ErrorResponse, HttpAppError};
use crate::handlers::parse_video_id;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use futures::TryStreamExt;
use std::sync::Arc;
use tubely_core::constants::THUMBNAIL_FORM_FIELD;
use tubely_core::models::VideoRecord;
use tubely_core::AppError;

#[utoipa::path(
    post,
    path = "/api/thumbnail_upload/{videoID}",
    tag = "uploads",
    params(
        ("videoID" = String, Path, description = "ID of the video record the thumbnail belongs to")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Thumbnail stored and record updated", body = VideoRecord),
        (status = 400, description = "Malformed ID or multipart body", body = ErrorResponse),
        (status = 401, description = "Missing token or not the video owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Not image/jpeg or image/png", body = ErrorResponse),
        (status = 500, description = "Storage or metadata failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<VideoRecord>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let pipeline = &state.media.thumbnail_pipeline;

    let video = pipeline.authorize(video_id, user.user_id).await?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(THUMBNAIL_FORM_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let limit = pipeline.max_thumbnail_size_bytes();
        let body = field.map_err(move |e| body_read_error(e, limit));

        let record = pipeline
            .upload(&video, user.user_id, content_type.as_deref(), body)
            .await?;
        return Ok(Json(record));
    }

    Err(AppError::InvalidInput("Couldn't find a 'thumbnail' file in the form".to_string()).into())
}
