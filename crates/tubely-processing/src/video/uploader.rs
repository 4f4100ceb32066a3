use std::path::Path;
use std::sync::Arc;

use tubely_core::constants::{
    ACCEPTED_VIDEO_CONTENT_TYPE, THUMBNAIL_KEY_PREFIX, VIDEO_CONTAINER_EXTENSION,
};
use tubely_core::models::Classification;
use tubely_storage::{generate_storage_key, Storage, StorageResult};

/// An object written by this upload: where it lives and how it is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// Places finished media in object storage under freshly generated keys.
#[derive(Clone)]
pub struct ObjectStoreUploader {
    storage: Arc<dyn Storage>,
}

impl ObjectStoreUploader {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Upload a remuxed video under `{classification}/{hex}.mp4`.
    pub async fn upload_video(
        &self,
        classification: Classification,
        path: &Path,
    ) -> StorageResult<StoredObject> {
        let key = generate_storage_key(classification.key_prefix(), VIDEO_CONTAINER_EXTENSION);
        let url = self
            .storage
            .upload_file(&key, path, ACCEPTED_VIDEO_CONTENT_TYPE)
            .await?;
        Ok(StoredObject { key, url })
    }

    /// Upload thumbnail bytes under `thumbnails/{hex}{extension}`.
    pub async fn upload_thumbnail(
        &self,
        data: Vec<u8>,
        content_type: &str,
        extension: &str,
    ) -> StorageResult<StoredObject> {
        let key = generate_storage_key(THUMBNAIL_KEY_PREFIX, extension);
        let url = self
            .storage
            .upload_with_key(&key, data, content_type)
            .await?;
        Ok(StoredObject { key, url })
    }

    /// Best-effort removal of an object whose metadata write failed.
    pub async fn discard(&self, object: &StoredObject) {
        if let Err(e) = self.storage.delete(&object.key).await {
            tracing::error!(
                error = %e,
                key = %object.key,
                "Failed to delete orphaned object after metadata failure"
            );
        } else {
            tracing::info!(key = %object.key, "Deleted orphaned object");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_storage::LocalStorage;

    #[tokio::test]
    async fn test_video_key_carries_classification_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("bucket"), "http://cdn.test".to_string())
            .await
            .unwrap();
        let uploader = ObjectStoreUploader::new(Arc::new(storage));

        let source = dir.path().join("remuxed.mp4");
        std::fs::write(&source, b"moov").unwrap();

        let object = uploader
            .upload_video(Classification::Portrait, &source)
            .await
            .unwrap();
        assert!(object.key.starts_with("portrait/"));
        assert!(object.key.ends_with(".mp4"));
        assert_eq!(object.url, format!("http://cdn.test/{}", object.key));
        assert!(dir.path().join("bucket").join(&object.key).exists());

        uploader.discard(&object).await;
        assert!(!dir.path().join("bucket").join(&object.key).exists());
    }

    #[tokio::test]
    async fn test_thumbnail_key_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://cdn.test".to_string())
            .await
            .unwrap();
        let uploader = ObjectStoreUploader::new(Arc::new(storage));

        let object = uploader
            .upload_thumbnail(b"png".to_vec(), "image/png", ".png")
            .await
            .unwrap();
        assert!(object.key.starts_with("thumbnails/"));
        assert!(object.key.ends_with(".png"));
    }
}
