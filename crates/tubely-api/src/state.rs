//! Application state.
//!
//! Split into a metadata sub-state and a media sub-state; handlers reach
//! through `State<Arc<AppState>>` for whichever side they need.

use crate::auth::TokenValidator;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{
    MediaJobLimiter, MediaProbe, MetadataUpdater, ObjectStoreUploader, Remuxer, TempStagingArea,
    ThumbnailUploadPipeline, VideoUploadPipeline, VideoUploadPipelineConfig,
};
use tubely_storage::Storage;

/// Metadata store access.
#[derive(Clone)]
pub struct DbState {
    /// Present only when the Postgres backend is configured.
    pub pool: Option<PgPool>,
    pub videos: Arc<dyn VideoRepository>,
    pub metadata: MetadataUpdater,
}

/// Upload pipelines and the object store behind them.
pub struct MediaState {
    pub storage: Arc<dyn Storage>,
    pub video_pipeline: VideoUploadPipeline,
    pub thumbnail_pipeline: ThumbnailUploadPipeline,
}

pub struct AppState {
    pub config: Config,
    pub db: DbState,
    pub media: MediaState,
    pub tokens: Arc<dyn TokenValidator>,
}

/// Externally constructed collaborators the state is wired from.
pub struct AppComponents {
    pub pool: Option<PgPool>,
    pub videos: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    pub probe: Arc<dyn MediaProbe>,
    pub remuxer: Arc<dyn Remuxer>,
    pub tokens: Arc<dyn TokenValidator>,
}

impl AppState {
    pub fn new(config: Config, components: AppComponents) -> Self {
        let metadata = MetadataUpdater::new(components.videos.clone());
        let uploader = ObjectStoreUploader::new(components.storage.clone());
        let staging = TempStagingArea::new(config.staging_dir().map(PathBuf::from));
        let limiter = MediaJobLimiter::new(config.max_concurrent_media_jobs());

        let video_pipeline = VideoUploadPipeline::new(
            metadata.clone(),
            staging,
            components.probe,
            components.remuxer,
            uploader.clone(),
            limiter,
            VideoUploadPipelineConfig {
                max_video_size_bytes: config.max_video_size_bytes(),
                upload_deadline: config.upload_deadline(),
            },
        );
        let thumbnail_pipeline = ThumbnailUploadPipeline::new(
            metadata.clone(),
            uploader,
            config.max_thumbnail_size_bytes(),
            config.upload_deadline(),
        );

        Self {
            config,
            db: DbState {
                pool: components.pool,
                videos: components.videos,
                metadata,
            },
            media: MediaState {
                storage: components.storage,
                video_pipeline,
                thumbnail_pipeline,
            },
            tokens: components.tokens,
        }
    }
}
