//! Filesystem-backed object store for development and tests.
//!
//! Objects live at `{root}/{key}` and are served from `{base_url}/{key}` by
//! whatever fronts the directory.

use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn new(root: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Cannot create storage root {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve `key` under the root. Only plain relative components are allowed.
    fn object_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StorageError::InvalidKey(format!(
                "Key {:?} is not a relative object path",
                key
            )));
        }
        Ok(self.root.join(relative))
    }

    async fn create_object(&self, key: &str) -> StorageResult<(PathBuf, fs::File)> {
        let path = self.object_path(key)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Cannot create {}: {}", path.display(), e))
        })?;
        Ok((path, file))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_file(
        &self,
        key: &str,
        source: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        let started = Instant::now();
        let (path, mut dest) = self.create_object(key).await?;

        let mut src = fs::File::open(source).await.map_err(|e| {
            StorageError::UploadFailed(format!("Cannot open {}: {}", source.display(), e))
        })?;
        let size = tokio::io::copy(&mut src, &mut dest).await.map_err(|e| {
            StorageError::UploadFailed(format!("Copy into {} failed: {}", path.display(), e))
        })?;
        dest.sync_all().await?;

        tracing::debug!(
            key = %key,
            size_bytes = size,
            duration_ms = started.elapsed().as_millis() as u64,
            "Object written to local storage"
        );
        Ok(self.public_url(key))
    }

    async fn upload_with_key(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let started = Instant::now();
        let (path, mut dest) = self.create_object(key).await?;

        dest.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Write to {} failed: {}", path.display(), e))
        })?;
        dest.sync_all().await?;

        tracing::debug!(
            key = %key,
            size_bytes = data.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Object written to local storage"
        );
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.object_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key = %key, "Object removed from local storage");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Cannot remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.object_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
