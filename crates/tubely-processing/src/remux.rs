//! Fast-start remuxing through ffmpeg.

use crate::error::ProcessingError;
use crate::staging::ScratchFile;
use crate::validator::validate_tool_path;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

const REMUX_SUFFIX: &str = ".processing";

/// Rewrites a container so it can start playing before it is fully downloaded.
///
/// The returned scratch file owns the output and deletes it on drop.
#[async_trait]
pub trait Remuxer: Send + Sync {
    async fn remux(&self, input: &Path) -> Result<ScratchFile, ProcessingError>;
}

/// `<input>.processing`, next to the input.
pub fn remux_output_path(input: &Path) -> PathBuf {
    let mut out = OsString::from(input.as_os_str());
    out.push(REMUX_SUFFIX);
    PathBuf::from(out)
}

/// Stream copy into `output`, moving the index to the front. `-y` replaces a
/// leftover output instead of stopping at ffmpeg's overwrite prompt.
fn remux_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];
    args.extend(
        ["-c", "copy", "-movflags", "faststart", "-f", "mp4"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(output.into());
    args
}

pub struct FfmpegFastStartRemuxer {
    ffmpeg_path: String,
}

impl FfmpegFastStartRemuxer {
    pub fn new(ffmpeg_path: String) -> anyhow::Result<Self> {
        validate_tool_path(&ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl Remuxer for FfmpegFastStartRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux(&self, input: &Path) -> Result<ScratchFile, ProcessingError> {
        let start = std::time::Instant::now();
        // Guard exists before the process does, so a cancelled run still cleans up.
        let output = ScratchFile::new(remux_output_path(input));

        let result = Command::new(&self.ffmpeg_path)
            .args(remux_args(input, output.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProcessingError::Remux(format!("Failed to execute ffmpeg: {}", e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ProcessingError::Remux(format!(
                "FFmpeg failed: {}",
                stderr.trim()
            )));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            output = %output.path().display(),
            "Fast-start remux completed"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_appends_suffix() {
        let out = remux_output_path(Path::new("/tmp/tubely-upload-abc.mp4"));
        assert_eq!(out, PathBuf::from("/tmp/tubely-upload-abc.mp4.processing"));
    }

    #[test]
    fn test_args_overwrite_and_stream_copy() {
        let args = remux_args(Path::new("/tmp/in.mp4"), Path::new("/tmp/in.mp4.processing"));
        let expected: Vec<OsString> = [
            "-y",
            "-i",
            "/tmp/in.mp4",
            "-c",
            "copy",
            "-movflags",
            "faststart",
            "-f",
            "mp4",
            "/tmp/in.mp4.processing",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        assert_eq!(args, expected);
    }

    #[tokio::test]
    async fn test_missing_binary_is_remux_error_and_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"data").unwrap();

        let remuxer = FfmpegFastStartRemuxer::new("tubely-no-such-ffmpeg".to_string()).unwrap();
        let err = remuxer.remux(&input).await.unwrap_err();
        assert!(matches!(err, ProcessingError::Remux(_)));
        assert!(!remux_output_path(&input).exists());
    }
}
