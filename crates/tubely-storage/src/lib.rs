//! Tubely Storage Library
//!
//! This crate provides the storage abstraction used for uploaded videos and
//! thumbnails, with implementations for S3 (and S3-compatible providers) and
//! the local filesystem.
//!
//! # Storage key format
//!
//! Keys are `{prefix}/{64 lowercase hex chars}{extension}`. Videos use their
//! aspect-ratio class as the prefix (`landscape/`, `portrait/`, `other/`),
//! thumbnails use `thumbnails/`. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
