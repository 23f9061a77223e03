//! Collaborator HTTP client with retry and backoff.
//!
//! Shared infrastructure for the HTTP-based collaborators (OCR service,
//! remote analysis service).

use backoff::{future::retry_notify, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::{Result, SafecaseError};

/// Configuration for a collaborator HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for transient errors.
    pub max_retries: u32,
    /// Initial retry interval.
    pub initial_interval: Duration,
    /// Maximum retry interval.
    pub max_interval: Duration,
    /// Refuse plain-HTTP endpoints.
    pub https_only: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(4),
            https_only: false,
        }
    }
}

/// JSON-over-HTTP client that retries transient failures.
pub struct CollaboratorHttpClient {
    client: Client,
    config: HttpClientConfig,
    service_name: &'static str,
    make_error: fn(String) -> SafecaseError,
}

impl CollaboratorHttpClient {
    /// Create a client. Errors are reported through `make_error` so each
    /// collaborator surfaces its own failure category.
    pub fn new(
        config: HttpClientConfig,
        service_name: &'static str,
        make_error: fn(String) -> SafecaseError,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .https_only(config.https_only)
            .build()
            .map_err(|e| make_error(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            service_name,
            make_error,
        })
    }

    /// POST `body` as JSON to `url` with retry, parsing the JSON response.
    pub async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let backoff = self.build_backoff();

        retry_notify(
            backoff,
            || async move { self.post_once::<B, R>(url, body).await },
            |err: SafecaseError, duration: Duration| {
                warn!(
                    service = self.service_name,
                    error = %err,
                    retry_after_ms = duration.as_millis() as u64,
                    "Retry scheduled"
                );
            },
        )
        .await
    }

    async fn post_once<B, R>(
        &self,
        url: &str,
        body: &B,
    ) -> std::result::Result<R, backoff::Error<SafecaseError>>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let start = Instant::now();
        let service = self.service_name;

        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            let latency_ms = start.elapsed().as_millis() as u64;
            if is_transient_error(&e) {
                warn!(service, error = %e, latency_ms, "Transient error, will retry");
                backoff::Error::transient((self.make_error)(format!(
                    "Transient error (will retry): {e}"
                )))
            } else {
                warn!(service, error = %e, latency_ms, "Permanent error, aborting");
                backoff::Error::permanent((self.make_error)(format!(
                    "{service} request failed: {e}"
                )))
            }
        })?;

        let status = response.status();
        debug!(service, status = %status, "Received HTTP response");

        if !status.is_success() {
            let latency_ms = start.elapsed().as_millis() as u64;
            let err = (self.make_error)(format!("{service} returned status: {status}"));
            return if is_transient_status(status) {
                warn!(service, status = %status, latency_ms, "Transient HTTP status, will retry");
                Err(backoff::Error::transient(err))
            } else {
                warn!(service, status = %status, latency_ms, "Permanent HTTP error");
                Err(backoff::Error::permanent(err))
            };
        }

        let parsed: R = response.json().await.map_err(|e| {
            warn!(service, error = %e, "Failed to parse JSON response");
            backoff::Error::permanent((self.make_error)(format!(
                "Failed to parse {service} response: {e}"
            )))
        })?;

        debug!(
            service,
            latency_ms = start.elapsed().as_millis() as u64,
            "Request completed successfully"
        );

        Ok(parsed)
    }

    fn build_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.config.initial_interval,
            max_interval: self.config.max_interval,
            max_elapsed_time: Some(self.config.timeout * self.config.max_retries.max(1)),
            ..Default::default()
        }
    }
}

/// Join a base URL and an endpoint path with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Check if a reqwest error is transient and should be retried.
pub fn is_transient_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// Check if an HTTP status code indicates a transient error.
pub fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
            | StatusCode::BAD_GATEWAY
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8001/", "/analyze-evidence"),
            "http://localhost:8001/analyze-evidence"
        );
        assert_eq!(join_url("http://ocr", "recognize"), "http://ocr/recognize");
    }

    #[test]
    fn test_transient_status_codes() {
        assert!(is_transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient_status(StatusCode::GATEWAY_TIMEOUT));
        assert!(is_transient_status(StatusCode::BAD_GATEWAY));
        assert!(!is_transient_status(StatusCode::NOT_FOUND));
        assert!(!is_transient_status(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_unreachable_service_maps_to_collaborator_error() {
        let config = HttpClientConfig {
            timeout: Duration::from_millis(200),
            max_retries: 1,
            initial_interval: Duration::from_millis(10),
            max_interval: Duration::from_millis(20),
            https_only: false,
        };
        let client =
            CollaboratorHttpClient::new(config, "test-service", SafecaseError::AnalysisFailure)
                .unwrap();

        let result: Result<serde_json::Value> = client
            .post_json("http://127.0.0.1:9/unreachable", &serde_json::json!({}))
            .await;

        assert!(matches!(result, Err(SafecaseError::AnalysisFailure(_))));
    }
}
