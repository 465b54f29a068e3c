//! Naming rules for uploaded identity documents.
//!
//! The client-supplied filename is never used as a storage path; only a
//! sanitized extension survives into the generated name.

use crate::error::CoreError;

/// Longest extension kept from an uploaded filename.
const MAX_EXTENSION_LENGTH: usize = 8;

/// Extract a safe, lower-cased extension from a client filename.
///
/// Returns `None` when there is no extension or it contains anything other
/// than ASCII alphanumerics.
pub fn sanitized_extension(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LENGTH
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Generate the stored filename for a new document.
pub fn stored_filename(original: Option<&str>) -> String {
    let stem = uuid::Uuid::new_v4();
    match original.and_then(sanitized_extension) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

/// Reject empty uploads.
pub fn validate_document(data: &[u8]) -> Result<(), CoreError> {
    if data.is_empty() {
        return Err(CoreError::Validation(
            "Uploaded document must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Content type served for a stored document, by extension.
pub fn content_type_for(path: &str) -> &'static str {
    match sanitized_extension(path).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("tif" | "tiff") => "image/tiff",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}
