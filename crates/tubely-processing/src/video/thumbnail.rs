use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use tokio::time::Instant;
use uuid::Uuid;

use tubely_core::models::VideoRecord;
use tubely_core::AppError;

use super::metadata::MetadataUpdater;
use super::uploader::ObjectStoreUploader;
use crate::error::ProcessingError;
use crate::jobs::with_deadline;
use crate::staging::buffer_body;
use crate::validator::validate_thumbnail_content_type;

/// Stores a thumbnail image as is and points the record at it.
pub struct ThumbnailUploadPipeline {
    metadata: MetadataUpdater,
    uploader: ObjectStoreUploader,
    max_thumbnail_size_bytes: u64,
    upload_deadline: Duration,
}

impl ThumbnailUploadPipeline {
    pub fn new(
        metadata: MetadataUpdater,
        uploader: ObjectStoreUploader,
        max_thumbnail_size_bytes: u64,
        upload_deadline: Duration,
    ) -> Self {
        Self {
            metadata,
            uploader,
            max_thumbnail_size_bytes,
            upload_deadline,
        }
    }

    pub fn max_thumbnail_size_bytes(&self) -> u64 {
        self.max_thumbnail_size_bytes
    }

    /// Ownership check, run before the body is read.
    pub async fn authorize(&self, video_id: Uuid, requester: Uuid) -> Result<VideoRecord, AppError> {
        self.metadata.load_owned(video_id, requester).await
    }

    pub async fn upload<S>(
        &self,
        video: &VideoRecord,
        requester: Uuid,
        content_type: Option<&str>,
        body: S,
    ) -> Result<VideoRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, ProcessingError>> + Send,
    {
        let (content_type, extension) = validate_thumbnail_content_type(content_type)?;
        let deadline = Instant::now() + self.upload_deadline;

        let data = with_deadline(
            "staging",
            deadline,
            buffer_body(body, self.max_thumbnail_size_bytes),
        )
        .await
        .map_err(AppError::from)?;
        let size = data.len();

        let object = with_deadline("upload", deadline, async {
            self.uploader
                .upload_thumbnail(data, content_type, extension)
                .await
                .map_err(AppError::from)
        })
        .await?;

        match self
            .metadata
            .set_thumbnail_url(video.id, requester, object.url.clone())
            .await
        {
            Ok(record) => {
                tracing::info!(video_id = %video.id, key = %object.key, size_bytes = size, "Thumbnail uploaded");
                Ok(record)
            }
            Err(e) => {
                self.uploader.discard(&object).await;
                Err(e)
            }
        }
    }
}
