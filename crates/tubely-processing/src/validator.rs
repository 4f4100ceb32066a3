//! Input checks shared by the upload paths.

use anyhow::anyhow;
use tubely_core::constants::{ACCEPTED_VIDEO_CONTENT_TYPE, THUMBNAIL_CONTENT_TYPES};
use tubely_core::AppError;

/// Strip media-type parameters (`; codecs=...`) and normalize case.
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Accept only `video/mp4`, ignoring parameters.
pub fn validate_video_content_type(declared: Option<&str>) -> Result<(), AppError> {
    let declared = declared.unwrap_or_default();
    if normalize_mime_type(declared) != ACCEPTED_VIDEO_CONTENT_TYPE {
        return Err(AppError::UnsupportedMediaType(format!(
            "Invalid file type '{}'. Only {} is allowed",
            declared, ACCEPTED_VIDEO_CONTENT_TYPE
        )));
    }
    Ok(())
}

/// Accept JPEG or PNG thumbnails. Returns the normalized type and the key extension.
pub fn validate_thumbnail_content_type(
    declared: Option<&str>,
) -> Result<(&'static str, &'static str), AppError> {
    let declared = declared.unwrap_or_default();
    let normalized = normalize_mime_type(declared);
    THUMBNAIL_CONTENT_TYPES
        .iter()
        .find(|(content_type, _)| *content_type == normalized)
        .copied()
        .ok_or_else(|| {
            AppError::UnsupportedMediaType(format!(
                "Invalid file type '{}'. Only image/jpeg and image/png are allowed",
                declared
            ))
        })
}

/// Reject external tool paths that could smuggle shell syntax.
pub fn validate_tool_path(path: &str) -> anyhow::Result<()> {
    if path.is_empty() {
        return Err(anyhow!("Tool path is empty"));
    }
    if path.contains("..") {
        return Err(anyhow!("Tool path contains directory traversal: {}", path));
    }
    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '\\'))
    {
        return Err(anyhow!("Tool path contains unsafe characters: {}", path));
    }
    Ok(())
}
