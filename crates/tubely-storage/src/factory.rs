#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use tubely_core::Config;

fn required<'a>(value: Option<&'a str>, var: &str) -> StorageResult<&'a str> {
    value.ok_or_else(|| StorageError::ConfigError(format!("{} not configured", var)))
}

/// Build the backend selected by `STORAGE_BACKEND`.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let storage = S3Storage::new(
                required(config.s3_bucket(), "S3_BUCKET")?.to_string(),
                required(config.s3_region(), "S3_REGION or AWS_REGION")?.to_string(),
                config.s3_endpoint().map(String::from),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                required(config.local_storage_path(), "LOCAL_STORAGE_PATH")?,
                required(config.local_storage_base_url(), "LOCAL_STORAGE_BASE_URL")?.to_string(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[allow(unreachable_patterns)]
        backend => Err(StorageError::ConfigError(format!(
            "{:?} storage backend not compiled in",
            backend
        ))),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tubely_core::{BaseConfig, UploadServiceConfig};

    fn local_config(path: Option<String>) -> Config {
        Config(Box::new(UploadServiceConfig {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
                environment: "development".to_string(),
            },
            database_url: None,
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: path,
            local_storage_base_url: Some("http://localhost:4000/assets".to_string()),
            max_video_size_bytes: 1024,
            max_thumbnail_size_bytes: 1024,
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            staging_dir: None,
            max_concurrent_media_jobs: 1,
            upload_deadline_secs: 60,
        }))
    }

    #[tokio::test]
    async fn test_local_backend_is_built() {
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(Some(dir.path().to_string_lossy().into_owned()));
        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn test_missing_local_path_is_config_error() {
        let result = create_storage(&local_config(None)).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
