use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tubely_core::models::{NewVideo, VideoRecord};
use tubely_core::AppError;
use uuid::Uuid;

use super::videos::VideoRepository;

/// Video repository kept in process memory. Used when no database is configured.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<Uuid, VideoRecord>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully formed record as is. Handy for seeding fixtures.
    pub async fn insert(&self, video: VideoRecord) {
        self.videos.write().await.insert(video.id, video);
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, video: NewVideo) -> Result<VideoRecord, AppError> {
        let record = video.into_record();
        self.videos.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn update(&self, video: &VideoRecord) -> Result<VideoRecord, AppError> {
        let mut videos = self.videos.write().await;
        let stored = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))?;

        stored.title = video.title.clone();
        stored.description = video.description.clone();
        stored.thumbnail_url = video.thumbnail_url.clone();
        stored.video_url = video.video_url.clone();
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_video(owner: Uuid) -> NewVideo {
        NewVideo {
            user_id: owner,
            title: "Boots".to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let repo = InMemoryVideoRepository::new();
        let owner = Uuid::new_v4();
        let created = repo.create(new_video(owner)).await.unwrap();

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_creation_time() {
        let repo = InMemoryVideoRepository::new();
        let owner = Uuid::new_v4();
        let created = repo.create(new_video(owner)).await.unwrap();

        let mut changed = created.clone();
        changed.video_url = Some("https://bucket.s3.us-east-2.amazonaws.com/landscape/a.mp4".to_string());
        changed.user_id = Uuid::new_v4();

        let updated = repo.update(&changed).await.unwrap();
        assert_eq!(updated.video_url, changed.video_url);
        assert_eq!(updated.user_id, owner);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let repo = InMemoryVideoRepository::new();
        let orphan = new_video(Uuid::new_v4()).into_record();
        let err = repo.update(&orphan).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
