//! Multipart form parsing helpers
//!
//! Parses evidence uploads (multipart/form-data with a `file` field) into
//! engine input.

use axum::extract::Multipart;
use safecase_core::EvidenceFile;

use crate::error::ApiError;
use crate::validation::{validate_content_type, validate_file_size};

/// Represents a file uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Content-Type from the multipart field (if provided)
    pub content_type: Option<String>,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

impl From<FileField> for EvidenceFile {
    fn from(field: FileField) -> Self {
        EvidenceFile {
            bytes: field.data,
            file_name: field.file_name,
            media_type: field.content_type,
        }
    }
}

/// Parsed multipart form fields
#[derive(Debug)]
pub struct MultipartFields {
    /// File field (named "file")
    file: Option<FileField>,
    /// Names of the other fields, in arrival order
    other_fields: Vec<String>,
}

impl MultipartFields {
    /// Parse all fields from a multipart request
    ///
    /// The `file` field's Content-Type and size are validated as it is read.
    pub async fn parse(multipart: &mut Multipart, max_file_size: usize) -> Result<Self, ApiError> {
        let mut file: Option<FileField> = None;
        let mut other_fields = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to parse multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" {
                let content_type = field.content_type().map(|s| s.to_string());
                let file_name = field.file_name().map(|s| s.to_string());

                validate_content_type(content_type.as_deref())?;

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?
                    .to_vec();

                validate_file_size(data.len(), max_file_size)?;

                file = Some(FileField {
                    data,
                    content_type,
                    file_name,
                });
            } else {
                other_fields.push(name);
            }
        }

        if !other_fields.is_empty() {
            tracing::debug!(fields = ?other_fields, "Ignoring unknown multipart fields");
        }

        Ok(Self { file, other_fields })
    }

    /// Take the file field (required)
    pub fn take_file(&mut self) -> Result<FileField, ApiError> {
        self.file.take().ok_or_else(|| {
            ApiError::bad_request("No file provided. Use 'file' field in multipart form.")
        })
    }

    /// Names of the non-file fields that were ignored
    pub fn ignored_fields(&self) -> &[String] {
        &self.other_fields
    }
}
