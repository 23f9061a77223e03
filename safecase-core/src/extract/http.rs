//! OCR over HTTP.
//!
//! Posts the raster to an OCR service as base64 JSON:
//!
//! ```text
//! POST {base_url}/recognize
//! { "image": "<base64>", "mediaType": "image/png", "language": "eng" }
//! -> { "text": "..." }
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use super::{ProgressReporter, TextRecognizer};
use crate::error::{Result, SafecaseError};
use crate::http_client::{join_url, CollaboratorHttpClient, HttpClientConfig};
use crate::model::EvidenceFile;

/// Configuration for [`HttpOcrRecognizer`].
#[derive(Debug, Clone)]
pub struct HttpOcrConfig {
    /// Service base URL, e.g. `http://localhost:8884`.
    pub base_url: String,
    /// OCR language hint.
    pub language: String,
    pub http: HttpClientConfig,
}

impl HttpOcrConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            language: "eng".to_string(),
            http: HttpClientConfig::default(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    image: String,
    media_type: &'a str,
    language: &'a str,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    text: String,
}

/// OCR recognizer backed by a remote recognition service.
pub struct HttpOcrRecognizer {
    client: CollaboratorHttpClient,
    endpoint: String,
    language: String,
}

impl HttpOcrRecognizer {
    pub fn new(config: HttpOcrConfig) -> Result<Self> {
        let client = CollaboratorHttpClient::new(
            config.http,
            "ocr-service",
            SafecaseError::ExtractionFailure,
        )?;
        Ok(Self {
            client,
            endpoint: join_url(&config.base_url, "recognize"),
            language: config.language,
        })
    }
}

#[async_trait]
impl TextRecognizer for HttpOcrRecognizer {
    async fn recognize(&self, file: &EvidenceFile, progress: &ProgressReporter) -> Result<String> {
        let request = RecognizeRequest {
            image: BASE64.encode(&file.bytes),
            media_type: file.media_type(),
            language: &self.language,
        };
        progress.report(0.1);

        let response: RecognizeResponse = self.client.post_json(&self.endpoint, &request).await?;
        progress.report(0.9);

        Ok(response.text)
    }

    fn name(&self) -> &'static str {
        "http-ocr"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_is_joined() {
        let recognizer = HttpOcrRecognizer::new(HttpOcrConfig::new("http://localhost:8884/")).unwrap();
        assert_eq!(recognizer.endpoint, "http://localhost:8884/recognize");
    }

    #[test]
    fn test_response_defaults_to_empty_text() {
        let parsed: RecognizeResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.text.is_empty());
    }
}
