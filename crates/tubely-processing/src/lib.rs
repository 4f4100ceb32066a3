//! Tubely Processing Library
//!
//! Everything between "bytes arrived" and "record updated": staging uploads
//! to disk, probing and classifying them with ffprobe, remuxing with ffmpeg,
//! pushing the result to object storage and recording the address.

pub mod classify;
pub mod error;
pub mod jobs;
pub mod probe;
pub mod remux;
pub mod staging;
pub mod validator;
pub mod video;

pub use classify::{classify_dimensions, classify_streams, AspectRatioClassifier};
pub use error::ProcessingError;
pub use jobs::{with_deadline, MediaJobLimiter};
pub use probe::{FfprobeProbe, MediaProbe, StreamDescriptor, StreamKind};
pub use remux::{FfmpegFastStartRemuxer, Remuxer};
pub use staging::{buffer_body, ScratchFile, StagedFile, TempStagingArea};
pub use video::{
    MetadataUpdater, ObjectStoreUploader, StoredObject, ThumbnailUploadPipeline, UploadSession,
    UploadStage, VideoUploadPipeline, VideoUploadPipelineConfig,
};
