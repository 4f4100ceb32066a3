//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in-process against fakes for ffprobe and ffmpeg; no
//! external service or binary is needed.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use fixtures::{FakeProbe, FakeRemuxer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtValidator;
use tubely_api::constants;
use tubely_api::setup::routes;
use tubely_api::state::{AppComponents, AppState};
use tubely_core::models::{NewVideo, VideoRecord};
use tubely_core::{BaseConfig, Config, StorageBackend, UploadServiceConfig};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::StreamDescriptor;
use tubely_storage::LocalStorage;
use uuid::Uuid;

pub const STORAGE_BASE_URL: &str = "http://cdn.test/assets";
pub const MAX_VIDEO_SIZE_BYTES: u64 = 64 * 1024;
pub const MAX_THUMBNAIL_SIZE_BYTES: u64 = 16 * 1024;

/// API path prefix for tests.
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Knobs for the fake media tools.
pub struct TestAppOptions {
    pub streams: Vec<StreamDescriptor>,
    pub remux_fails: bool,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            streams: vec![StreamDescriptor::video(1920, 1080)],
            remux_fails: false,
        }
    }
}

/// Test application: server, collaborators and owned temp directories.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<InMemoryVideoRepository>,
    pub probe: Arc<FakeProbe>,
    pub remuxer: Arc<FakeRemuxer>,
    pub tokens: JwtValidator,
    storage_dir: TempDir,
    staging_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_root(&self) -> &Path {
        self.storage_dir.path()
    }

    /// Every file currently under the storage root, relative to it.
    pub fn stored_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_files(self.storage_dir.path(), self.storage_dir.path(), &mut keys);
        keys.sort();
        keys
    }

    /// Number of entries left in the staging directory.
    pub fn staged_entries(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Seed a draft record owned by `owner`.
    pub async fn create_video(&self, owner: Uuid) -> VideoRecord {
        self.videos
            .create(NewVideo {
                user_id: owner,
                title: "Boots in the rain".to_string(),
                description: "Unboxing".to_string(),
            })
            .await
            .expect("Failed to seed video")
    }

    pub async fn stored_video(&self, id: Uuid) -> VideoRecord {
        self.videos
            .get(id)
            .await
            .expect("Failed to load video")
            .expect("Video missing")
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path: PathBuf = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}

fn test_config(storage_dir: &Path, staging_dir: &Path) -> Config {
    Config(Box::new(UploadServiceConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            jwt_secret: auth::TEST_JWT_SECRET.to_string(),
            environment: "test".to_string(),
        },
        database_url: None,
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: Some(storage_dir.to_string_lossy().into_owned()),
        local_storage_base_url: Some(STORAGE_BASE_URL.to_string()),
        max_video_size_bytes: MAX_VIDEO_SIZE_BYTES,
        max_thumbnail_size_bytes: MAX_THUMBNAIL_SIZE_BYTES,
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        staging_dir: Some(staging_dir.to_string_lossy().into_owned()),
        max_concurrent_media_jobs: 2,
        upload_deadline_secs: 30,
    }))
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestAppOptions::default()).await
}

/// Setup test app with in-memory metadata, local storage and fake media tools.
pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("Failed to create storage dir");
    let staging_dir = tempfile::tempdir().expect("Failed to create staging dir");
    let config = test_config(storage_dir.path(), staging_dir.path());

    let videos = Arc::new(InMemoryVideoRepository::new());
    let storage = LocalStorage::new(storage_dir.path(), STORAGE_BASE_URL.to_string())
        .await
        .expect("Failed to create local storage");
    let probe = Arc::new(FakeProbe::new(options.streams));
    let remuxer = Arc::new(FakeRemuxer::new(options.remux_fails));

    let state = Arc::new(AppState::new(
        config.clone(),
        AppComponents {
            pool: None,
            videos: videos.clone(),
            storage: Arc::new(storage),
            probe: probe.clone(),
            remuxer: remuxer.clone(),
            tokens: Arc::new(JwtValidator::new(auth::TEST_JWT_SECRET)),
        },
    ));

    let app = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(app).expect("Failed to start test server");

    TestApp {
        server,
        videos,
        probe,
        remuxer,
        tokens: JwtValidator::new(auth::TEST_JWT_SECRET),
        storage_dir,
        staging_dir,
    }
}
