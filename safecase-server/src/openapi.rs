//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3.0 document for the SafeCase API.

use utoipa::OpenApi;

use crate::handlers::{
    CaseResponse, ClassificationResponse, ClassifyRequest, CreateCaseRequest, DeleteCaseResponse,
    EvidenceResponse, HealthResponse, ReadyResponse, RecommendationResponse, SummaryResponse,
    SupportResourceResponse, TimelineEntryResponse, TimelineResponse, UpdateStatusRequest,
};

/// SafeCase API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SafeCase - Evidence Intake API",
        version = "0.1.0",
        description = r#"
## Evidence Intake & Threat Analysis

SafeCase helps people document online abuse as organized, analyzable cases:

- **Cases** group evidence under a title, platforms and a status
- **Evidence** uploads are stored, their text extracted (OCR for images) and classified
- **Threat levels** follow the number of distinct harm categories detected
- **Timeline** and **export** views present a case's evidence in order
- **Support** resources are recommended for the detected threat level

### Owner identity

Every case route requires an `x-owner-id` header set by the upstream
gateway. Cases belonging to another owner behave as if they did not exist.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Cases", description = "Create and manage cases, timeline and export"),
        (name = "Evidence", description = "Upload and list classified evidence"),
        (name = "Classification", description = "Classify free text without storing it"),
        (name = "Support", description = "Support resources and recommendations"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::cases::create_case_handler,
        crate::handlers::cases::list_cases_handler,
        crate::handlers::cases::get_case_handler,
        crate::handlers::cases::update_status_handler,
        crate::handlers::cases::delete_case_handler,
        crate::handlers::cases::timeline_handler,
        crate::handlers::cases::export_case_handler,
        crate::handlers::evidence::upload_evidence_handler,
        crate::handlers::evidence::list_evidence_handler,
        crate::handlers::blobs::blob_handler,
        crate::handlers::classify::classify_handler,
        crate::handlers::support::list_support_handler,
        crate::handlers::support::recommend_support_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            CreateCaseRequest,
            UpdateStatusRequest,
            CaseResponse,
            DeleteCaseResponse,
            SummaryResponse,
            TimelineEntryResponse,
            TimelineResponse,
            EvidenceResponse,
            ClassifyRequest,
            ClassificationResponse,
            SupportResourceResponse,
            RecommendationResponse,
        )
    )
)]
pub struct ApiDoc;
