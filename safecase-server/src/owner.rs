//! Owner identity extractor.
//!
//! Authentication happens upstream; this service trusts the `x-owner-id`
//! header set by the gateway and scopes every case operation to it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// Header carrying the authenticated owner identity.
pub const OWNER_HEADER: &str = "x-owner-id";

const MAX_OWNER_LEN: usize = 256;

/// The caller's owner identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::unauthorized(format!("Missing {OWNER_HEADER} header")))?;

        if owner.len() > MAX_OWNER_LEN {
            return Err(ApiError::bad_request(format!(
                "{OWNER_HEADER} exceeds {MAX_OWNER_LEN} characters"
            )));
        }

        Ok(Self(owner.to_string()))
    }
}
