//! Support resource handlers
//!
//! Lists helplines and services, optionally filtered by category, and
//! recommends resources for a threat level.

use axum::{
    extract::{Query, State},
    Json,
};
use safecase_core::{SupportCategory, SupportResource, ThreatLevel};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::handlers::AppState;

/// A support resource
#[derive(Debug, Serialize, ToSchema)]
pub struct SupportResourceResponse {
    pub name: String,
    /// emergency, police, medical, counseling or legal
    #[schema(example = "counseling")]
    pub category: String,
    /// Human-readable category label
    #[schema(example = "Counseling & Support")]
    pub category_label: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub region: String,
    pub available_24_7: bool,
    pub verified: bool,
}

impl From<&SupportResource> for SupportResourceResponse {
    fn from(resource: &SupportResource) -> Self {
        Self {
            name: resource.name.clone(),
            category: resource.category.as_str().to_string(),
            category_label: resource.category.label().to_string(),
            description: resource.description.clone(),
            phone: resource.phone.clone(),
            website: resource.website.clone(),
            region: resource.region.clone(),
            available_24_7: resource.available_24_7,
            verified: resource.verified,
        }
    }
}

/// Query parameters for listing support resources
#[derive(Debug, Deserialize, IntoParams)]
pub struct SupportQuery {
    /// Filter by category (emergency, police, medical, counseling, legal)
    pub category: Option<String>,
}

/// Query parameters for recommendations
#[derive(Debug, Deserialize, IntoParams)]
pub struct RecommendationQuery {
    /// Threat level (none, low, medium, high, critical)
    pub threat_level: String,
}

/// Recommended resources for a threat level
#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationResponse {
    pub threat_level: String,
    /// Categories in order of urgency
    pub categories: Vec<String>,
    pub resources: Vec<SupportResourceResponse>,
}

/// List support resources
///
/// Ordered by category then name.
#[utoipa::path(
    get,
    path = "/api/v1/support",
    tag = "Support",
    params(SupportQuery),
    responses(
        (status = 200, description = "Support resources", body = [SupportResourceResponse]),
        (status = 400, description = "Unknown category")
    )
)]
pub async fn list_support_handler(
    State(state): State<AppState>,
    Query(query): Query<SupportQuery>,
) -> Result<Json<Vec<SupportResourceResponse>>, ApiError> {
    let directory = state.cases.support();
    let resources: Vec<SupportResourceResponse> = match query.category.as_deref() {
        Some(category) => {
            let category: SupportCategory = category.parse()?;
            directory
                .by_category(category)
                .into_iter()
                .map(SupportResourceResponse::from)
                .collect()
        }
        None => directory
            .all()
            .iter()
            .map(SupportResourceResponse::from)
            .collect(),
    };

    Ok(Json(resources))
}

/// Recommend resources for a threat level
///
/// Critical and high threats surface emergency and police resources first.
#[utoipa::path(
    get,
    path = "/api/v1/support/recommendations",
    tag = "Support",
    params(RecommendationQuery),
    responses(
        (status = 200, description = "Recommended resources", body = RecommendationResponse),
        (status = 400, description = "Unknown threat level")
    )
)]
pub async fn recommend_support_handler(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let level: ThreatLevel = query.threat_level.parse()?;

    Ok(Json(RecommendationResponse {
        threat_level: level.as_str().to_string(),
        categories: SupportCategory::recommended_for(level)
            .iter()
            .map(|c| c.as_str().to_string())
            .collect(),
        resources: state
            .cases
            .support()
            .recommend(level)
            .into_iter()
            .map(SupportResourceResponse::from)
            .collect(),
    }))
}
