//! Evidence handlers
//!
//! Handles evidence uploads into a case and listing a case's evidence.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use safecase_core::{EvidenceItem, EvidenceMetadata, ProgressReporter};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::multipart::MultipartFields;
use crate::owner::OwnerId;

/// A classified evidence item
#[derive(Debug, Serialize, ToSchema)]
pub struct EvidenceResponse {
    pub id: Uuid,
    pub case_id: Uuid,
    /// Where the original file is stored
    pub file_url: String,
    /// image, audio, video or document
    #[schema(example = "image")]
    pub kind: String,
    /// Text recovered from the file, empty when none
    pub extracted_text: String,
    pub harm_detected: bool,
    /// none, low, medium, high or critical
    #[schema(example = "high")]
    pub threat_level: String,
    /// Harm categories in detection order
    #[schema(example = json!(["threat", "harassment"]))]
    pub matched_categories: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
    /// Digest, size, blob path and analysis provenance
    #[schema(value_type = Object)]
    pub metadata: EvidenceMetadata,
}

impl From<EvidenceItem> for EvidenceResponse {
    fn from(item: EvidenceItem) -> Self {
        Self {
            id: item.id,
            case_id: item.case_id,
            file_url: item.file_url,
            kind: item.kind.as_str().to_string(),
            extracted_text: item.extracted_text,
            harm_detected: item.harm_detected,
            threat_level: item.threat_level.as_str().to_string(),
            matched_categories: item.matched_categories,
            uploaded_at: item.uploaded_at,
            metadata: item.metadata,
        }
    }
}

/// Upload evidence into a case
///
/// Accepts multipart/form-data with:
/// - **file** (required): image, audio, video or document (max 25MB by default)
///
/// The file is stored, its text extracted and classified, and the resulting
/// record returned.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{case_id}/evidence",
    tag = "Evidence",
    params(
        ("case_id" = Uuid, Path, description = "Case ID"),
        ("x-owner-id" = String, Header, description = "Owner identity")
    ),
    request_body(content_type = "multipart/form-data", description = "Evidence file in the 'file' field"),
    responses(
        (status = 201, description = "Evidence ingested", body = EvidenceResponse),
        (status = 400, description = "Missing, empty or unsupported file, or unknown case"),
        (status = 401, description = "Missing owner identity"),
        (status = 502, description = "Evidence storage unavailable"),
        (status = 500, description = "Evidence could not be recorded")
    )
)]
pub async fn upload_evidence_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(case_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<EvidenceResponse>), ApiError> {
    let mut fields = MultipartFields::parse(&mut multipart, state.max_file_size).await?;
    let file = fields.take_file()?;

    tracing::debug!(
        case_id = %case_id,
        bytes = file.data.len(),
        content_type = ?file.content_type,
        "Evidence upload received"
    );

    let item = state
        .cases
        .add_evidence(
            owner.as_str(),
            case_id,
            file.into(),
            &ProgressReporter::disabled(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// List a case's evidence
///
/// Sorted by upload time (newest first).
#[utoipa::path(
    get,
    path = "/api/v1/cases/{case_id}/evidence",
    tag = "Evidence",
    params(
        ("case_id" = Uuid, Path, description = "Case ID"),
        ("x-owner-id" = String, Header, description = "Owner identity")
    ),
    responses(
        (status = 200, description = "Evidence items", body = [EvidenceResponse]),
        (status = 401, description = "Missing owner identity"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn list_evidence_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(case_id): Path<Uuid>,
) -> Result<Json<Vec<EvidenceResponse>>, ApiError> {
    let items = state.cases.list_evidence(owner.as_str(), case_id).await?;
    Ok(Json(items.into_iter().map(EvidenceResponse::from).collect()))
}
