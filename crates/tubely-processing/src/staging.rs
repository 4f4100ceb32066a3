//! Local scratch files for in-flight uploads.
//!
//! Every file created here is owned by a guard that removes it on drop, so
//! an upload leaves nothing behind whether it succeeds, fails, times out or
//! the client disconnects mid-request.

use crate::error::ProcessingError;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

const STAGING_PREFIX: &str = "tubely-upload-";
const STAGING_SUFFIX: &str = ".mp4";

/// Where upload bodies are buffered before processing.
#[derive(Debug, Clone)]
pub struct TempStagingArea {
    dir: PathBuf,
}

impl TempStagingArea {
    /// Stage under `dir`, or the system temp directory when `None`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `body` to a fresh temp file and rewind it.
    ///
    /// Fails with `PayloadTooLarge` as soon as more than `max_bytes` arrive,
    /// without reading the rest of the body.
    pub async fn stage<S>(&self, body: S, max_bytes: u64) -> Result<StagedFile, ProcessingError>
    where
        S: Stream<Item = Result<Bytes, ProcessingError>> + Send,
    {
        let named = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.dir)?;
        let (file, path) = named.into_parts();
        let mut file = File::from_std(file);

        let mut body = std::pin::pin!(body);
        let mut size: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            size += chunk.len() as u64;
            if size > max_bytes {
                return Err(ProcessingError::PayloadTooLarge { limit: max_bytes });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        file.seek(SeekFrom::Start(0)).await?;

        tracing::debug!(path = %path.display(), size_bytes = size, "Upload staged");

        Ok(StagedFile { file, path, size })
    }
}

/// Collect a small body into memory, failing once it exceeds `max_bytes`.
pub async fn buffer_body<S>(body: S, max_bytes: u64) -> Result<Vec<u8>, ProcessingError>
where
    S: Stream<Item = Result<Bytes, ProcessingError>> + Send,
{
    let mut body = std::pin::pin!(body);
    let mut data = Vec::new();
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        if (data.len() + chunk.len()) as u64 > max_bytes {
            return Err(ProcessingError::PayloadTooLarge { limit: max_bytes });
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// A staged upload. Dropping it closes the handle, then deletes the file.
#[derive(Debug)]
pub struct StagedFile {
    // Field order matters: the handle closes before the path guard deletes.
    file: File,
    path: TempPath,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read handle positioned at the start of the staged bytes.
    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

/// A path that is removed when the guard drops. The file may or may not exist yet.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Failed to remove scratch file"
                );
            }
        }
    }
}
