use thiserror::Error;
use tubely_core::AppError;

/// Failures raised while staging, probing or remuxing an upload.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Remux failed: {0}")]
    Remux(String),

    #[error("Timed out during {stage}")]
    Timeout { stage: &'static str },

    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("Failed to read upload body: {0}")]
    Body(String),

    #[error("Media job limiter is closed")]
    LimiterClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::Classification(msg) => AppError::Classification(msg),
            ProcessingError::Remux(msg) => AppError::Remux(msg),
            ProcessingError::Timeout { stage } => AppError::Timeout {
                stage: stage.to_string(),
            },
            ProcessingError::PayloadTooLarge { limit } => {
                AppError::PayloadTooLarge(format!("File exceeds the {} byte limit", limit))
            }
            ProcessingError::Body(msg) => AppError::InvalidInput(msg),
            ProcessingError::LimiterClosed => AppError::Internal("Media job limiter closed".to_string()),
            ProcessingError::Io(e) => AppError::Internal(format!("IO error: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_core::ErrorMetadata;

    #[test]
    fn test_stage_failures_keep_their_kind() {
        let err: AppError = ProcessingError::Remux("moov atom not found".to_string()).into();
        assert!(matches!(err, AppError::Remux(ref m) if m.contains("moov")));

        let err: AppError = ProcessingError::Timeout { stage: "remux" }.into();
        assert_eq!(err.http_status_code(), 504);

        let err: AppError = ProcessingError::PayloadTooLarge { limit: 10 }.into();
        assert_eq!(err.http_status_code(), 413);

        let err: AppError = ProcessingError::Body("stream ended early".to_string()).into();
        assert_eq!(err.http_status_code(), 400);
    }
}
