use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tubely_processing::remux::remux_output_path;
use tubely_processing::{
    MediaProbe, ProcessingError, Remuxer, ScratchFile, StreamDescriptor,
};

/// Probe that reports a fixed stream list and counts invocations.
pub struct FakeProbe {
    streams: Vec<StreamDescriptor>,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn new(streams: Vec<StreamDescriptor>) -> Self {
        Self {
            streams,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProbe for FakeProbe {
    async fn probe(&self, _path: &Path) -> Result<Vec<StreamDescriptor>, ProcessingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.streams.clone())
    }
}

/// Remuxer that copies its input, or fails like ffmpeg on a broken container.
pub struct FakeRemuxer {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeRemuxer {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Remuxer for FakeRemuxer {
    async fn remux(&self, input: &Path) -> Result<ScratchFile, ProcessingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let output = ScratchFile::new(remux_output_path(input));
        if self.fail {
            std::fs::write(output.path(), b"partial")?;
            return Err(ProcessingError::Remux(
                "moov atom not found".to_string(),
            ));
        }
        tokio::fs::copy(input, output.path()).await?;
        Ok(output)
    }
}

/// Bytes that stand in for an MP4 file; the fakes never parse them.
pub fn fake_mp4(len: usize) -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.resize(len.max(data.len()), 0);
    data
}

pub fn video_form(data: Vec<u8>, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "video",
        Part::bytes(data).file_name("boots.mp4").mime_type(mime_type),
    )
}

pub fn thumbnail_form(data: Vec<u8>, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "thumbnail",
        Part::bytes(data).file_name("thumb").mime_type(mime_type),
    )
}
