//! Stream inspection through ffprobe.

use crate::error::ProcessingError;
use crate::validator::validate_tool_path;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
    Other,
}

/// One stream reported by the probe. Dimensions are zero when not reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub kind: StreamKind,
    pub width: u32,
    pub height: u32,
}

impl StreamDescriptor {
    pub fn video(width: u32, height: u32) -> Self {
        Self {
            kind: StreamKind::Video,
            width,
            height,
        }
    }
}

/// Inspects a local media file and lists its streams in container order.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<Vec<StreamDescriptor>, ProcessingError>;
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
pub fn parse_probe_output(stdout: &[u8]) -> Result<Vec<StreamDescriptor>, ProcessingError> {
    let output: ProbeOutput = serde_json::from_slice(stdout).map_err(|e| {
        ProcessingError::Classification(format!("Failed to parse ffprobe output: {}", e))
    })?;

    Ok(output
        .streams
        .into_iter()
        .map(|stream| StreamDescriptor {
            kind: match stream.codec_type.as_deref() {
                Some("video") => StreamKind::Video,
                Some("audio") => StreamKind::Audio,
                _ => StreamKind::Other,
            },
            width: stream.width.unwrap_or(0),
            height: stream.height.unwrap_or(0),
        })
        .collect())
}

pub struct FfprobeProbe {
    ffprobe_path: String,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: String) -> anyhow::Result<Self> {
        validate_tool_path(&ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<Vec<StreamDescriptor>, ProcessingError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ProcessingError::Classification(format!("Failed to execute ffprobe: {}", e))
            })?;

        if !output.status.success() {
            return Err(ProcessingError::Classification(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let streams = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            stream_count = streams.len(),
            "Video probe completed"
        );

        Ok(streams)
    }
}
