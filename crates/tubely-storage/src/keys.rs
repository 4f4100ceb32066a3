//! Shared key generation for storage backends.

/// Number of random bytes behind each key name.
const KEY_ENTROPY_BYTES: usize = 32;

/// Generate a fresh storage key under `prefix`.
///
/// The name is 32 bytes from the thread-local CSPRNG rendered as lowercase
/// hex, so keys are unguessable and never reused across uploads.
pub fn generate_storage_key(prefix: &str, extension: &str) -> String {
    let entropy: [u8; KEY_ENTROPY_BYTES] = rand::random();
    format!(
        "{}/{}{}",
        prefix.trim_end_matches('/'),
        hex::encode(entropy),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_layout() {
        let key = generate_storage_key("landscape", ".mp4");
        let name = key
            .strip_prefix("landscape/")
            .and_then(|rest| rest.strip_suffix(".mp4"))
            .unwrap();
        assert_eq!(name.len(), 64);
        assert!(name
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_trailing_slash_in_prefix_is_not_doubled() {
        let key = generate_storage_key("thumbnails/", ".png");
        assert!(key.starts_with("thumbnails/"));
        assert!(!key.contains("//"));
    }

    #[test]
    fn test_keys_do_not_repeat() {
        let keys: HashSet<String> = (0..256)
            .map(|_| generate_storage_key("other", ".mp4"))
            .collect();
        assert_eq!(keys.len(), 256);
    }
}
