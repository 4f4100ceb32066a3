//! Constants shared across crates.

/// The only container type accepted by the video upload endpoint.
pub const ACCEPTED_VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Extension appended to every stored video key.
pub const VIDEO_CONTAINER_EXTENSION: &str = ".mp4";

/// Multipart field carrying the video payload.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Multipart field carrying the thumbnail payload.
pub const THUMBNAIL_FORM_FIELD: &str = "thumbnail";

/// Key prefix for stored thumbnails.
pub const THUMBNAIL_KEY_PREFIX: &str = "thumbnails";

/// Thumbnail content types and the extension stored with each.
pub const THUMBNAIL_CONTENT_TYPES: &[(&str, &str)] = &[("image/jpeg", ".jpeg"), ("image/png", ".png")];

/// Issuer expected in access tokens.
pub const TOKEN_ISSUER: &str = "tubely-access";

/// Headroom granted on top of the file ceiling for multipart framing.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;
