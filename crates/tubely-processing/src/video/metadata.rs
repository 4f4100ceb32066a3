use std::sync::Arc;

use tubely_core::models::VideoRecord;
use tubely_core::AppError;
use tubely_db::VideoRepository;
use uuid::Uuid;

/// Loads owner-scoped records and writes media addresses onto them.
#[derive(Clone)]
pub struct MetadataUpdater {
    videos: Arc<dyn VideoRepository>,
}

impl MetadataUpdater {
    pub fn new(videos: Arc<dyn VideoRepository>) -> Self {
        Self { videos }
    }

    /// Fetch a record and confirm `requester` owns it.
    pub async fn load_owned(&self, video_id: Uuid, requester: Uuid) -> Result<VideoRecord, AppError> {
        let video = self
            .videos
            .get(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;

        if !video.is_owned_by(requester) {
            tracing::debug!(video_id = %video_id, requester = %requester, "Requester does not own video");
            return Err(AppError::Forbidden("User is not the video owner".to_string()));
        }

        Ok(video)
    }

    pub async fn set_video_url(
        &self,
        video_id: Uuid,
        requester: Uuid,
        url: String,
    ) -> Result<VideoRecord, AppError> {
        self.apply(video_id, requester, move |video| video.video_url = Some(url))
            .await
    }

    pub async fn set_thumbnail_url(
        &self,
        video_id: Uuid,
        requester: Uuid,
        url: String,
    ) -> Result<VideoRecord, AppError> {
        self.apply(video_id, requester, move |video| video.thumbnail_url = Some(url))
            .await
    }

    // Ownership is checked again on the fresh copy since the record may have
    // changed while the upload was processed.
    async fn apply<F>(&self, video_id: Uuid, requester: Uuid, change: F) -> Result<VideoRecord, AppError>
    where
        F: FnOnce(&mut VideoRecord) + Send,
    {
        let mut video = self.load_owned(video_id, requester).await?;
        change(&mut video);
        let updated = self.videos.update(&video).await?;

        tracing::info!(video_id = %video_id, "Video metadata updated");
        Ok(updated)
    }
}
