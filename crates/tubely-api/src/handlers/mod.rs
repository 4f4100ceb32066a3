pub mod thumbnail_upload;
pub mod video_upload;
pub mod videos;

use crate::error::HttpAppError;
use tubely_core::AppError;
use uuid::Uuid;

/// Parse the `{videoID}` path segment, answering 400 on anything that is not a UUID.
pub(crate) fn parse_video_id(raw: &str) -> Result<Uuid, HttpAppError> {
    Uuid::parse_str(raw)
        .map_err(|_| HttpAppError(AppError::InvalidInput("Invalid ID".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_video_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_video_id("not-a-uuid"),
            Err(HttpAppError(AppError::InvalidInput(_)))
        ));
    }
}
