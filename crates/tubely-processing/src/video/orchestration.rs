//! Video upload orchestration: authorize → stage → classify → remux → upload → record.
//!
//! Each step gates the next. A failing step releases everything acquired so
//! far: staged and remuxed files are dropped (and deleted), and an object
//! that was uploaded but never recorded is deleted again.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use tokio::time::Instant;
use uuid::Uuid;

use tubely_core::models::{Classification, VideoRecord};
use tubely_core::AppError;

use super::metadata::MetadataUpdater;
use super::uploader::{ObjectStoreUploader, StoredObject};
use crate::classify::AspectRatioClassifier;
use crate::error::ProcessingError;
use crate::jobs::{with_deadline, MediaJobLimiter};
use crate::probe::MediaProbe;
use crate::remux::Remuxer;
use crate::staging::{StagedFile, TempStagingArea};
use crate::validator::validate_video_content_type;

/// Where an upload is in its lifecycle. Stages only move forward; any
/// failure is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Staged,
    Classified,
    Remuxed,
    Uploaded,
    Persisted,
    Complete,
    Failed,
}

impl UploadStage {
    pub fn next(self) -> Option<UploadStage> {
        match self {
            UploadStage::Received => Some(UploadStage::Staged),
            UploadStage::Staged => Some(UploadStage::Classified),
            UploadStage::Classified => Some(UploadStage::Remuxed),
            UploadStage::Remuxed => Some(UploadStage::Uploaded),
            UploadStage::Uploaded => Some(UploadStage::Persisted),
            UploadStage::Persisted => Some(UploadStage::Complete),
            UploadStage::Complete | UploadStage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    fn as_str(self) -> &'static str {
        match self {
            UploadStage::Received => "received",
            UploadStage::Staged => "staged",
            UploadStage::Classified => "classified",
            UploadStage::Remuxed => "remuxed",
            UploadStage::Uploaded => "uploaded",
            UploadStage::Persisted => "persisted",
            UploadStage::Complete => "complete",
            UploadStage::Failed => "failed",
        }
    }
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Request-scoped upload state. Never persisted; dropping it releases any
/// staged file it still holds.
#[derive(Debug)]
pub struct UploadSession {
    video: VideoRecord,
    requester: Uuid,
    stage: UploadStage,
    deadline: Instant,
    staged: Option<StagedFile>,
    classification: Option<Classification>,
    object: Option<StoredObject>,
}

impl UploadSession {
    fn new(video: VideoRecord, requester: Uuid, deadline: Instant) -> Self {
        Self {
            video,
            requester,
            stage: UploadStage::Received,
            deadline,
            staged: None,
            classification: None,
            object: None,
        }
    }

    pub fn video_id(&self) -> Uuid {
        self.video.id
    }

    pub fn requester(&self) -> Uuid {
        self.requester
    }

    pub fn stage(&self) -> UploadStage {
        self.stage
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    pub fn object(&self) -> Option<&StoredObject> {
        self.object.as_ref()
    }

    fn advance(&mut self, next: UploadStage) {
        debug_assert_eq!(self.stage.next(), Some(next));
        tracing::debug!(
            video_id = %self.video.id,
            from = %self.stage,
            to = %next,
            "Upload stage transition"
        );
        self.stage = next;
    }

    fn fail(&mut self, err: &AppError) {
        tracing::warn!(
            video_id = %self.video.id,
            stage = %self.stage,
            error = %err,
            "Video upload failed"
        );
        self.stage = UploadStage::Failed;
        self.staged = None;
    }

    fn track<T>(&mut self, result: Result<T, AppError>) -> Result<T, AppError> {
        if let Err(ref e) = result {
            self.fail(e);
        }
        result
    }
}

#[derive(Debug, Clone)]
pub struct VideoUploadPipelineConfig {
    pub max_video_size_bytes: u64,
    pub upload_deadline: Duration,
}

pub struct VideoUploadPipeline {
    metadata: MetadataUpdater,
    staging: TempStagingArea,
    classifier: AspectRatioClassifier,
    remuxer: Arc<dyn Remuxer>,
    uploader: ObjectStoreUploader,
    limiter: MediaJobLimiter,
    config: VideoUploadPipelineConfig,
}

impl VideoUploadPipeline {
    pub fn new(
        metadata: MetadataUpdater,
        staging: TempStagingArea,
        probe: Arc<dyn MediaProbe>,
        remuxer: Arc<dyn Remuxer>,
        uploader: ObjectStoreUploader,
        limiter: MediaJobLimiter,
        config: VideoUploadPipelineConfig,
    ) -> Self {
        Self {
            metadata,
            staging,
            classifier: AspectRatioClassifier::new(probe),
            remuxer,
            uploader,
            limiter,
            config,
        }
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.config.max_video_size_bytes
    }

    /// Resolve the record and check ownership. Nothing is read or written yet.
    pub async fn authorize(&self, video_id: Uuid, requester: Uuid) -> Result<UploadSession, AppError> {
        let video = self.metadata.load_owned(video_id, requester).await?;
        let deadline = Instant::now() + self.config.upload_deadline;
        tracing::info!(video_id = %video_id, user_id = %requester, "Uploading video");
        Ok(UploadSession::new(video, requester, deadline))
    }

    /// Reject anything not declared as `video/mp4` before touching the body.
    pub fn check_content_type(
        &self,
        session: &mut UploadSession,
        declared: Option<&str>,
    ) -> Result<(), AppError> {
        let result = validate_video_content_type(declared);
        session.track(result)
    }

    /// Buffer the body to local disk, enforcing the size ceiling as bytes arrive.
    pub async fn stage<S>(&self, session: &mut UploadSession, body: S) -> Result<(), AppError>
    where
        S: Stream<Item = Result<Bytes, ProcessingError>> + Send,
    {
        let result = with_deadline(
            "staging",
            session.deadline,
            self.staging.stage(body, self.config.max_video_size_bytes),
        )
        .await
        .map_err(AppError::from);

        let staged = session.track(result)?;
        session.staged = Some(staged);
        session.advance(UploadStage::Staged);
        Ok(())
    }

    /// Classify, remux, upload and record a staged session.
    pub async fn complete(&self, mut session: UploadSession) -> Result<VideoRecord, AppError> {
        let result = self.process(&mut session).await;
        let record = session.track(result)?;
        session.advance(UploadStage::Complete);
        tracing::info!(
            video_id = %session.video_id(),
            key = session.object().map(|o| o.key.as_str()).unwrap_or_default(),
            "Video upload complete"
        );
        Ok(record)
    }

    /// Full pipeline for callers that already hold the declared type and body.
    pub async fn run<S>(
        &self,
        video_id: Uuid,
        requester: Uuid,
        content_type: Option<&str>,
        body: S,
    ) -> Result<VideoRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, ProcessingError>> + Send,
    {
        let mut session = self.authorize(video_id, requester).await?;
        self.check_content_type(&mut session, content_type)?;
        self.stage(&mut session, body).await?;
        self.complete(session).await
    }

    async fn process(&self, session: &mut UploadSession) -> Result<VideoRecord, AppError> {
        let deadline = session.deadline;
        let staged = session
            .staged
            .take()
            .ok_or_else(|| AppError::Internal("Upload was not staged".to_string()))?;

        let classification: Classification = self
            .limiter
            .run(
                "classification",
                deadline,
                self.classifier.classify(staged.path()),
            )
            .await
            .map_err(AppError::from)?;
        session.classification = Some(classification);
        session.advance(UploadStage::Classified);

        let remuxed = self
            .limiter
            .run("remux", deadline, self.remuxer.remux(staged.path()))
            .await
            .map_err(AppError::from)?;
        drop(staged);
        session.advance(UploadStage::Remuxed);

        let object = with_deadline("upload", deadline, async {
            self.uploader
                .upload_video(classification, remuxed.path())
                .await
                .map_err(AppError::from)
        })
        .await?;
        drop(remuxed);
        session.object = Some(object.clone());
        session.advance(UploadStage::Uploaded);

        match self
            .metadata
            .set_video_url(session.video_id(), session.requester(), object.url.clone())
            .await
        {
            Ok(record) => {
                session.advance(UploadStage::Persisted);
                Ok(record)
            }
            Err(e) => {
                self.uploader.discard(&object).await;
                Err(e)
            }
        }
    }
}
