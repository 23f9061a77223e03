//! Case handlers
//!
//! Create, list, inspect, re-status and delete the caller's cases, plus the
//! derived timeline and export views.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use safecase_core::{Case, CaseStatus, ExportFormat, NewCase, Timeline};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::evidence::EvidenceResponse;
use crate::handlers::AppState;
use crate::owner::OwnerId;

/// Request body for creating a case
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCaseRequest {
    /// Case title (required, non-blank)
    #[schema(example = "Messages from former partner")]
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Platforms where the abuse happened
    #[serde(default)]
    #[schema(example = json!(["instagram", "whatsapp"]))]
    pub platforms: Vec<String>,
}

/// Request body for changing a case's status
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// New status: draft, active, submitted or archived
    #[schema(example = "active")]
    pub status: String,
}

/// A case as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct CaseResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// draft, active, submitted or archived
    pub status: String,
    pub platforms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Case> for CaseResponse {
    fn from(case: Case) -> Self {
        Self {
            id: case.id,
            title: case.title,
            description: case.description,
            status: case.status.as_str().to_string(),
            platforms: case.platforms,
            created_at: case.created_at,
        }
    }
}

/// Response for case deletion
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteCaseResponse {
    pub id: Uuid,
    /// Number of evidence items removed with the case
    pub evidence_removed: usize,
}

/// Evidence counts for a case
#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub total: usize,
    pub harmful: usize,
    pub images: usize,
    pub audio: usize,
    pub videos: usize,
    pub documents: usize,
}

/// One numbered timeline entry
#[derive(Debug, Serialize, ToSchema)]
pub struct TimelineEntryResponse {
    /// 1 for the oldest item
    pub number: usize,
    /// `Evidence #N`
    pub label: String,
    /// e.g. `HIGH THREAT`, absent when no harm was detected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub evidence: EvidenceResponse,
}

/// Timeline of a case, newest first
#[derive(Debug, Serialize, ToSchema)]
pub struct TimelineResponse {
    pub case_id: Uuid,
    pub summary: SummaryResponse,
    pub entries: Vec<TimelineEntryResponse>,
}

impl From<Timeline> for TimelineResponse {
    fn from(timeline: Timeline) -> Self {
        use safecase_core::EvidenceKind;

        let summary = SummaryResponse {
            total: timeline.summary.total,
            harmful: timeline.summary.harmful,
            images: timeline.summary.count(EvidenceKind::Image),
            audio: timeline.summary.count(EvidenceKind::Audio),
            videos: timeline.summary.count(EvidenceKind::Video),
            documents: timeline.summary.count(EvidenceKind::Document),
        };

        Self {
            case_id: timeline.case_id,
            summary,
            entries: timeline
                .entries
                .into_iter()
                .map(|entry| TimelineEntryResponse {
                    number: entry.number,
                    label: entry.label,
                    badge: entry.badge,
                    evidence: entry.item.into(),
                })
                .collect(),
        }
    }
}

/// Query parameters for case export
#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// Output format: text (default) or json
    #[param(default = "text")]
    pub format: Option<String>,
}

fn parse_format(format: Option<&str>) -> Result<ExportFormat, ApiError> {
    match format.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("text") => Ok(ExportFormat::Text),
        Some("json") => Ok(ExportFormat::Json),
        Some(other) => Err(ApiError::bad_request(format!(
            "Unsupported export format '{}'. Use 'text' or 'json'.",
            other
        ))),
    }
}

/// Create a case
///
/// The case starts in `draft` status and belongs to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/cases",
    tag = "Cases",
    request_body = CreateCaseRequest,
    params(("x-owner-id" = String, Header, description = "Owner identity")),
    responses(
        (status = 201, description = "Case created", body = CaseResponse),
        (status = 400, description = "Blank title"),
        (status = 401, description = "Missing owner identity")
    )
)]
pub async fn create_case_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    Json(body): Json<CreateCaseRequest>,
) -> Result<(StatusCode, Json<CaseResponse>), ApiError> {
    let mut input = NewCase::new(owner.as_str(), body.title).with_platforms(body.platforms);
    if let Some(description) = body.description {
        input = input.with_description(description);
    }

    let case = state.cases.create_case(input).await?;
    Ok((StatusCode::CREATED, Json(case.into())))
}

/// List the caller's cases
///
/// Sorted by creation date (newest first).
#[utoipa::path(
    get,
    path = "/api/v1/cases",
    tag = "Cases",
    params(("x-owner-id" = String, Header, description = "Owner identity")),
    responses(
        (status = 200, description = "Caller's cases", body = [CaseResponse]),
        (status = 401, description = "Missing owner identity")
    )
)]
pub async fn list_cases_handler(
    State(state): State<AppState>,
    owner: OwnerId,
) -> Result<Json<Vec<CaseResponse>>, ApiError> {
    let cases = state.cases.list_cases(owner.as_str()).await?;
    Ok(Json(cases.into_iter().map(CaseResponse::from).collect()))
}

/// Get one case
#[utoipa::path(
    get,
    path = "/api/v1/cases/{case_id}",
    tag = "Cases",
    params(
        ("case_id" = Uuid, Path, description = "Case ID"),
        ("x-owner-id" = String, Header, description = "Owner identity")
    ),
    responses(
        (status = 200, description = "Case details", body = CaseResponse),
        (status = 401, description = "Missing owner identity"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn get_case_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(case_id): Path<Uuid>,
) -> Result<Json<CaseResponse>, ApiError> {
    let case = state.cases.get_case(owner.as_str(), case_id).await?;
    Ok(Json(case.into()))
}

/// Change a case's status
///
/// Any status may follow any other.
#[utoipa::path(
    patch,
    path = "/api/v1/cases/{case_id}/status",
    tag = "Cases",
    request_body = UpdateStatusRequest,
    params(
        ("case_id" = Uuid, Path, description = "Case ID"),
        ("x-owner-id" = String, Header, description = "Owner identity")
    ),
    responses(
        (status = 200, description = "Updated case", body = CaseResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn update_status_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(case_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<CaseResponse>, ApiError> {
    let status: CaseStatus = body.status.parse()?;
    let case = state
        .cases
        .set_status(owner.as_str(), case_id, status)
        .await?;
    Ok(Json(case.into()))
}

/// Delete a case and all of its evidence
#[utoipa::path(
    delete,
    path = "/api/v1/cases/{case_id}",
    tag = "Cases",
    params(
        ("case_id" = Uuid, Path, description = "Case ID"),
        ("x-owner-id" = String, Header, description = "Owner identity")
    ),
    responses(
        (status = 200, description = "Case deleted", body = DeleteCaseResponse),
        (status = 404, description = "Case not found")
    )
)]
pub async fn delete_case_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(case_id): Path<Uuid>,
) -> Result<Json<DeleteCaseResponse>, ApiError> {
    let evidence_removed = state.cases.delete_case(owner.as_str(), case_id).await?;
    Ok(Json(DeleteCaseResponse {
        id: case_id,
        evidence_removed,
    }))
}

/// Case timeline
///
/// Evidence newest first, numbered from the oldest, with per-kind counts.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{case_id}/timeline",
    tag = "Cases",
    params(
        ("case_id" = Uuid, Path, description = "Case ID"),
        ("x-owner-id" = String, Header, description = "Owner identity")
    ),
    responses(
        (status = 200, description = "Case timeline", body = TimelineResponse),
        (status = 404, description = "Case not found")
    )
)]
pub async fn timeline_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(case_id): Path<Uuid>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let timeline = state.cases.timeline(owner.as_str(), case_id).await?;
    Ok(Json(timeline.into()))
}

/// Export a case report
///
/// Plain text by default; `?format=json` returns the same content as JSON.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{case_id}/export",
    tag = "Cases",
    params(
        ("case_id" = Uuid, Path, description = "Case ID"),
        ("x-owner-id" = String, Header, description = "Owner identity"),
        ExportQuery
    ),
    responses(
        (status = 200, description = "Case report", content_type = "text/plain", body = String),
        (status = 400, description = "Unsupported format"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn export_case_handler(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(case_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = parse_format(query.format.as_deref())?;
    let body = state.cases.export(owner.as_str(), case_id, format).await?;

    tracing::info!(case_id = %case_id, format = ?format, bytes = body.len(), "Case exported");

    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format(None).unwrap(), ExportFormat::Text);
        assert_eq!(parse_format(Some("JSON")).unwrap(), ExportFormat::Json);
        assert!(parse_format(Some("pdf")).is_err());
    }
}
