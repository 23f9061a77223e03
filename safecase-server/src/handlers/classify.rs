//! Text classification handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::handlers::AppState;

/// Maximum accepted text length in bytes
const MAX_TEXT_BYTES: usize = 1024 * 1024;

/// Request body for text classification
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClassifyRequest {
    #[schema(example = "I will kill you if you tell anyone")]
    pub text: String,
}

/// Classification of a text
#[derive(Debug, Serialize, ToSchema)]
pub struct ClassificationResponse {
    pub harm_detected: bool,
    /// Harm categories in detection order
    #[schema(example = json!(["threat"]))]
    pub matched_categories: Vec<String>,
    /// none, low, medium, high or critical
    #[schema(example = "medium")]
    pub threat_level: String,
}

/// Classify free text
///
/// Runs the local harm classifier; nothing is stored.
#[utoipa::path(
    post,
    path = "/api/v1/classify",
    tag = "Classification",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Classification result", body = ClassificationResponse),
        (status = 400, description = "Text too large")
    )
)]
pub async fn classify_handler(
    State(state): State<AppState>,
    Json(body): Json<ClassifyRequest>,
) -> Result<Json<ClassificationResponse>, ApiError> {
    if body.text.len() > MAX_TEXT_BYTES {
        return Err(ApiError::bad_request(format!(
            "Text exceeds {} bytes",
            MAX_TEXT_BYTES
        )));
    }

    let classification = state.cases.classify_text(&body.text);
    Ok(Json(ClassificationResponse {
        harm_detected: classification.harm_detected,
        threat_level: classification.threat_level.as_str().to_string(),
        matched_categories: classification.matched_categories,
    }))
}
