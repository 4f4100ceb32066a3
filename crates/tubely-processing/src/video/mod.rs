//! Video upload flow: ownership checks, staging, classification, remux,
//! storage and metadata update.

pub mod metadata;
pub mod orchestration;
pub mod thumbnail;
pub mod uploader;

pub use metadata::MetadataUpdater;
pub use orchestration::{UploadSession, UploadStage, VideoUploadPipeline, VideoUploadPipelineConfig};
pub use thumbnail::ThumbnailUploadPipeline;
pub use uploader::{ObjectStoreUploader, StoredObject};
