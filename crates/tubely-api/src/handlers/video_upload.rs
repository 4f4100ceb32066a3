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
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::models::VideoRecord;
use tubely_core::AppError;

#[utoipa::path(
    post,
    path = "/api/video_upload/{videoID}",
    tag = "uploads",
    params(
        ("videoID" = String, Path, description = "ID of the video record to attach the upload to")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video uploaded and record updated", body = VideoRecord),
        (status = 400, description = "Malformed ID or multipart body", body = ErrorResponse),
        (status = 401, description = "Missing token or not the video owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Not video/mp4", body = ErrorResponse),
        (status = 500, description = "Processing, storage or metadata failure", body = ErrorResponse),
        (status = 504, description = "Upload deadline exceeded", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<VideoRecord>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let pipeline = &state.media.video_pipeline;

    // Ownership first: nothing is read from the body until this passes.
    let mut session = pipeline.authorize(video_id, user.user_id).await?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FORM_FIELD) {
            continue;
        }

        pipeline.check_content_type(&mut session, field.content_type())?;

        let limit = pipeline.max_video_size_bytes();
        let body = field.map_err(move |e| body_read_error(e, limit));
        pipeline.stage(&mut session, body).await?;

        let record = pipeline.complete(session).await?;
        return Ok(Json(record));
    }

    Err(AppError::InvalidInput("Couldn't find a 'video' file in the form".to_string()).into())
}
