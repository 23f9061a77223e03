//! Upload validation module
//!
//! Provides validation utilities for multipart evidence uploads.

use crate::error::ApiError;

/// Allowed MIME type prefixes for evidence uploads
const ALLOWED_MIME_PREFIXES: &[&str] = &[
    "image/",
    "video/",
    "audio/",
    "text/plain",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.",
    "application/octet-stream",
];

/// Validates the Content-Type of an uploaded evidence file
///
/// Accepts media (image/*, video/*, audio/*), common documents (PDF, Word,
/// plain text) and application/octet-stream.
pub fn validate_content_type(content_type: Option<&str>) -> Result<(), ApiError> {
    match content_type {
        Some(ct) => {
            let ct_lower = ct.to_lowercase();
            if ALLOWED_MIME_PREFIXES
                .iter()
                .any(|prefix| ct_lower.starts_with(prefix))
            {
                Ok(())
            } else {
                Err(ApiError::bad_request(format!(
                    "Unsupported Content-Type: '{}'. Allowed types: image/*, video/*, audio/*, PDF, Word, text/plain, application/octet-stream",
                    ct
                )))
            }
        }
        // Allow missing Content-Type (treat as binary)
        None => Ok(()),
    }
}

/// Validates the size of an uploaded file
///
/// Returns an error if the file is empty or exceeds the maximum size.
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ApiError> {
    if size == 0 {
        return Err(ApiError::bad_request("File is empty"));
    }
    if size > max_size {
        let max_mb = max_size / (1024 * 1024);
        let actual_mb = size / (1024 * 1024);
        Err(ApiError::bad_request(format!(
            "File too large: {} MB exceeds maximum of {} MB",
            actual_mb, max_mb
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content_type_media() {
        assert!(validate_content_type(Some("image/png")).is_ok());
        assert!(validate_content_type(Some("IMAGE/JPEG")).is_ok());
        assert!(validate_content_type(Some("video/mp4")).is_ok());
        assert!(validate_content_type(Some("audio/mpeg")).is_ok());
    }

    #[test]
    fn test_validate_content_type_documents() {
        assert!(validate_content_type(Some("application/pdf")).is_ok());
        assert!(validate_content_type(Some("application/msword")).is_ok());
        assert!(validate_content_type(Some(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ))
        .is_ok());
        assert!(validate_content_type(Some("text/plain; charset=utf-8")).is_ok());
        assert!(validate_content_type(None).is_ok());
    }

    #[test]
    fn test_validate_content_type_rejected() {
        assert!(validate_content_type(Some("text/html")).is_err());
        assert!(validate_content_type(Some("application/json")).is_err());
        assert!(validate_content_type(Some("text/javascript")).is_err());
    }

    #[test]
    fn test_validate_file_size() {
        let max = 10 * 1024 * 1024;
        assert!(validate_file_size(1024, max).is_ok());
        assert!(validate_file_size(max, max).is_ok());
        assert!(validate_file_size(max + 1, max).is_err());
        assert!(validate_file_size(0, max).is_err());
    }
}
