pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::auth::{JwtValidator, TokenValidator};
use crate::state::{AppComponents, AppState};
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
use tubely_processing::{FfmpegFastStartRemuxer, FfprobeProbe};

pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let videos: Arc<dyn VideoRepository> = match &pool {
        Some(pool) => Arc::new(PgVideoRepository::new(pool.clone())),
        None => {
            tracing::warn!("DATABASE_URL not set, video metadata is kept in memory");
            Arc::new(InMemoryVideoRepository::new())
        }
    };

    let storage = storage::setup_storage(&config).await?;

    let probe = FfprobeProbe::new(config.ffprobe_path().to_string())
        .context("Invalid FFPROBE_PATH")?;
    let remuxer = FfmpegFastStartRemuxer::new(config.ffmpeg_path().to_string())
        .context("Invalid FFMPEG_PATH")?;
    let tokens: Arc<dyn TokenValidator> = Arc::new(JwtValidator::new(config.jwt_secret()));

    let state = Arc::new(AppState::new(
        config.clone(),
        AppComponents {
            pool,
            videos,
            storage,
            probe: Arc::new(probe),
            remuxer: Arc::new(remuxer),
            tokens,
        },
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
