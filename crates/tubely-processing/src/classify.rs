//! Aspect ratio classification of the primary video stream.

use crate::error::ProcessingError;
use crate::probe::{MediaProbe, StreamDescriptor, StreamKind};
use std::path::Path;
use std::sync::Arc;
use tubely_core::models::Classification;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;
const RATIO_TOLERANCE: f64 = 0.01;

/// Classify a frame size. Zero in either dimension is an error.
pub fn classify_dimensions(width: u32, height: u32) -> Result<Classification, ProcessingError> {
    if width == 0 || height == 0 {
        return Err(ProcessingError::Classification(format!(
            "Invalid video dimensions {}x{}",
            width, height
        )));
    }

    let ratio = f64::from(width) / f64::from(height);
    if (ratio - LANDSCAPE_RATIO).abs() < RATIO_TOLERANCE {
        Ok(Classification::Landscape)
    } else if (ratio - PORTRAIT_RATIO).abs() < RATIO_TOLERANCE {
        Ok(Classification::Portrait)
    } else {
        Ok(Classification::Other)
    }
}

/// Classify using the first video stream; audio and data streams are ignored.
pub fn classify_streams(streams: &[StreamDescriptor]) -> Result<Classification, ProcessingError> {
    let video = streams
        .iter()
        .find(|s| s.kind == StreamKind::Video)
        .ok_or_else(|| ProcessingError::Classification("No video stream found".to_string()))?;
    classify_dimensions(video.width, video.height)
}

pub struct AspectRatioClassifier {
    probe: Arc<dyn MediaProbe>,
}

impl AspectRatioClassifier {
    pub fn new(probe: Arc<dyn MediaProbe>) -> Self {
        Self { probe }
    }

    pub async fn classify(&self, path: &Path) -> Result<Classification, ProcessingError> {
        let streams = self.probe.probe(path).await?;
        let classification = classify_streams(&streams)?;
        tracing::debug!(%classification, "Video classified");
        Ok(classification)
    }
}
