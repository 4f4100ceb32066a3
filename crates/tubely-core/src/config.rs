//! Configuration module
//!
//! This module provides configuration structures for the API and the upload
//! pipeline, including storage, authentication and media-tool settings.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_VIDEO_SIZE_BYTES: u64 = 1 << 30;
const MAX_THUMBNAIL_SIZE_BYTES: u64 = 10 << 20;
const MAX_CONCURRENT_MEDIA_JOBS: usize = 2;
const UPLOAD_DEADLINE_SECS: u64 = 600;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Base configuration shared by every entry point
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub environment: String,
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct UploadServiceConfig {
    pub base: BaseConfig,
    // Metadata store; in-memory when unset
    pub database_url: Option<String>,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Media processing configuration
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub staging_dir: Option<String>,
    pub max_concurrent_media_jobs: usize,
    pub upload_deadline_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadServiceConfig>);

impl Config {
    fn as_upload(&self) -> &UploadServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_upload().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_upload().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_upload().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_upload().base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_upload().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_upload().base.environment
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_upload().database_url.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_upload().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_upload().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_upload().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_upload().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_upload().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_upload().local_storage_base_url.as_deref()
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.as_upload().max_video_size_bytes
    }

    pub fn max_thumbnail_size_bytes(&self) -> u64 {
        self.as_upload().max_thumbnail_size_bytes
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_upload().ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_upload().ffmpeg_path
    }

    pub fn staging_dir(&self) -> Option<&str> {
        self.as_upload().staging_dir.as_deref()
    }

    pub fn max_concurrent_media_jobs(&self) -> usize {
        self.as_upload().max_concurrent_media_jobs
    }

    pub fn upload_deadline(&self) -> Duration {
        Duration::from_secs(self.as_upload().upload_deadline_secs)
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl UploadServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            environment,
        };

        let storage_backend = match non_empty("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let config = UploadServiceConfig {
            base,
            database_url: non_empty("DATABASE_URL"),
            storage_backend,
            s3_bucket: non_empty("S3_BUCKET"),
            s3_region: non_empty("S3_REGION").or_else(|| non_empty("AWS_REGION")),
            s3_endpoint: non_empty("S3_ENDPOINT"),
            local_storage_path: non_empty("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty("LOCAL_STORAGE_BASE_URL"),
            max_video_size_bytes: parse_or("MAX_VIDEO_SIZE_BYTES", MAX_VIDEO_SIZE_BYTES),
            max_thumbnail_size_bytes: parse_or(
                "MAX_THUMBNAIL_SIZE_BYTES",
                MAX_THUMBNAIL_SIZE_BYTES,
            ),
            ffprobe_path: non_empty("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            ffmpeg_path: non_empty("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            staging_dir: non_empty("STAGING_DIR"),
            max_concurrent_media_jobs: parse_or(
                "MAX_CONCURRENT_MEDIA_JOBS",
                MAX_CONCURRENT_MEDIA_JOBS,
            ),
            upload_deadline_secs: parse_or("UPLOAD_DEADLINE_SECS", UPLOAD_DEADLINE_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if let Some(ref url) = self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.max_video_size_bytes == 0 || self.max_thumbnail_size_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size ceilings must be greater than zero"));
        }

        if self.max_concurrent_media_jobs == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_MEDIA_JOBS must be at least 1"
            ));
        }

        if self.upload_deadline_secs == 0 {
            return Err(anyhow::anyhow!("UPLOAD_DEADLINE_SECS must be at least 1"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> UploadServiceConfig {
        UploadServiceConfig {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                jwt_secret: "a".repeat(32),
                environment: "development".to_string(),
            },
            database_url: None,
            storage_backend: StorageBackend::S3,
            s3_bucket: Some("tubely-videos".to_string()),
            s3_region: Some("us-east-2".to_string()),
            s3_endpoint: None,
            local_storage_path: None,
            local_storage_base_url: None,
            max_video_size_bytes: MAX_VIDEO_SIZE_BYTES,
            max_thumbnail_size_bytes: MAX_THUMBNAIL_SIZE_BYTES,
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            staging_dir: None,
            max_concurrent_media_jobs: 2,
            upload_deadline_secs: 600,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = valid_config();
        config.base.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_requires_bucket_and_region() {
        let mut config = valid_config();
        config.s3_bucket = None;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.s3_region = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_backend_requires_path_and_url() {
        let mut config = valid_config();
        config.storage_backend = StorageBackend::Local;
        assert!(config.validate().is_err());

        config.local_storage_path = Some("/tmp/tubely".to_string());
        config.local_storage_base_url = Some("http://localhost:4000/assets".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_media_jobs_rejected() {
        let mut config = valid_config();
        config.max_concurrent_media_jobs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_url_must_be_postgres() {
        let mut config = valid_config();
        config.database_url = Some("sqlite://tubely.db".to_string());
        assert!(config.validate().is_err());
        config.database_url = Some("postgres://localhost/tubely".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_wrapper_getters() {
        let config = Config(Box::new(valid_config()));
        assert_eq!(config.server_port(), 4000);
        assert_eq!(config.upload_deadline(), Duration::from_secs(600));
        assert_eq!(config.s3_bucket(), Some("tubely-videos"));
        assert!(!config.is_production());
    }
}
