//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod blobs;
pub mod cases;
pub mod classify;
pub mod evidence;
pub mod health;
pub mod support;

pub use crate::state::AppState;
pub use blobs::blob_handler;
pub use cases::{
    create_case_handler, delete_case_handler, export_case_handler, get_case_handler,
    list_cases_handler, timeline_handler, update_status_handler, CaseResponse, CreateCaseRequest,
    DeleteCaseResponse, ExportQuery, SummaryResponse, TimelineEntryResponse, TimelineResponse,
    UpdateStatusRequest,
};
pub use classify::{classify_handler, ClassificationResponse, ClassifyRequest};
pub use evidence::{list_evidence_handler, upload_evidence_handler, EvidenceResponse};
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use support::{
    list_support_handler, recommend_support_handler, RecommendationQuery, RecommendationResponse,
    SupportQuery, SupportResourceResponse,
};
