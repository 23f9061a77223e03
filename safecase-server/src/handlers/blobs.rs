//! Blob download handler
//!
//! Serves the `file_url` issued for each evidence item. The unguessable
//! `{case_id}/{uuid}.{ext}` path is the only credential, so the remote
//! analysis service can fetch the file without an owner header.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::error::ApiError;
use crate::handlers::AppState;

/// GET /blobs/{*path} - Stored evidence file
#[utoipa::path(
    get,
    path = "/blobs/{path}",
    tag = "Evidence",
    params(("path" = String, Path, description = "Blob path: {case_id}/{file}")),
    responses(
        (status = 200, description = "Evidence file bytes", content_type = "application/octet-stream"),
        (status = 404, description = "No such blob"),
        (status = 502, description = "Blob store unavailable")
    )
)]
pub async fn blob_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_blob_path(&path) {
        return Err(ApiError::not_found(format!("Blob {path}")));
    }

    let blob = state
        .cases
        .pipeline()
        .blobs()
        .fetch(&path)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Blob {path}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, blob.media_type),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        blob.bytes,
    ))
}

/// Relative path of plain segments only.
fn is_blob_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blob_path() {
        assert!(is_blob_path("case-1/abc.png"));
        assert!(!is_blob_path(""));
        assert!(!is_blob_path("case-1/../etc/passwd"));
        assert!(!is_blob_path("/etc/passwd"));
        assert!(!is_blob_path("case-1//x.png"));
    }
}
