//! Upload filename validation and sanitization.

use crate::types::Timestamp;

/// Extensions accepted by the image upload endpoint.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Whether `filename` has an allowed image extension (case-insensitive).
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Path separators become spaces, runs of whitespace become a single `_`,
/// everything outside `[A-Za-z0-9_.-]` is dropped, and leading or trailing
/// dots and underscores are trimmed. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Storage name for an upload: `<UTC timestamp with microseconds>_<safe name>`.
pub fn stored_name(now: Timestamp, safe_name: &str) -> String {
    format!("{}_{safe_name}", now.format("%Y%m%d%H%M%S%6f"))
}

/// Whether a MIME type denotes an image.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}
