//! Optional remote analysis collaborator.
//!
//! When configured, the remote service sees every ingested artifact and its
//! labels replace the local classifier's categories. The threat level is still
//! derived locally from the label count.
//!
//! ```text
//! POST {base_url}/analyze-evidence
//! { "caseId": "...", "evidenceId": "...", "fileUrl": "...", "text": "...", "type": "image" }
//! -> { "extractedText": "...", "abuseLabels": [...], "severityScore": 0.8,
//!      "summary": "...", "participants": [{ "type": "handle", "value": "@x" }] }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::classifier::Classification;
use crate::error::Result;
use crate::model::{CaseId, EvidenceId, EvidenceKind};

/// Artifact type as understood by the analysis service.
pub fn remote_type(kind: EvidenceKind) -> &'static str {
    match kind {
        EvidenceKind::Image => "image",
        EvidenceKind::Audio => "audio",
        EvidenceKind::Video => "video",
        EvidenceKind::Document => "other",
    }
}

/// Request body for the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub case_id: CaseId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_id: Option<EvidenceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl AnalysisRequest {
    pub fn new(case_id: CaseId, kind: EvidenceKind) -> Self {
        Self {
            case_id,
            evidence_id: None,
            file_url: None,
            text: None,
            kind: remote_type(kind),
        }
    }

    pub fn with_file_url(mut self, file_url: impl Into<String>) -> Self {
        self.file_url = Some(file_url.into());
        self
    }

    /// Attach locally extracted text; empty text is omitted.
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string()).filter(|t| !t.is_empty());
        self
    }
}

/// A party named in the evidence (handle, phone number, email, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Response of the analysis service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAnalysis {
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub abuse_labels: Vec<String>,
    #[serde(default)]
    pub severity_score: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl RemoteAnalysis {
    /// Remote text when non-empty, otherwise `local_text`.
    pub fn text_or(&self, local_text: String) -> String {
        match self.extracted_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => local_text,
        }
    }

    /// Categories from the remote labels, level derived by count.
    pub fn classification(&self) -> Classification {
        Classification::from_labels(&self.abuse_labels)
    }

    /// The parts of the response kept in evidence metadata.
    pub fn findings(&self) -> RemoteFindings {
        RemoteFindings {
            severity_score: self.severity_score,
            summary: self.summary.clone().filter(|s| !s.trim().is_empty()),
            participants: self.participants.clone(),
        }
    }
}

/// Remote output stored alongside an evidence item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemoteFindings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<Participant>,
}

/// Remote evidence analysis service.
#[async_trait]
pub trait RemoteAnalyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<RemoteAnalysis>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

#[cfg(feature = "network")]
pub use http::{HttpAnalyzerConfig, HttpRemoteAnalyzer};

#[cfg(feature = "network")]
mod http {
    use async_trait::async_trait;

    use super::{AnalysisRequest, RemoteAnalysis, RemoteAnalyzer};
    use crate::error::{Result, SafecaseError};
    use crate::http_client::{join_url, CollaboratorHttpClient, HttpClientConfig};

    #[derive(Debug, Clone)]
    pub struct HttpAnalyzerConfig {
        pub base_url: String,
        pub http: HttpClientConfig,
    }

    impl HttpAnalyzerConfig {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                base_url: base_url.into(),
                http: HttpClientConfig::default(),
            }
        }
    }

    /// [`RemoteAnalyzer`] over HTTP.
    pub struct HttpRemoteAnalyzer {
        client: CollaboratorHttpClient,
        endpoint: String,
    }

    impl HttpRemoteAnalyzer {
        pub fn new(config: HttpAnalyzerConfig) -> Result<Self> {
            let client = CollaboratorHttpClient::new(
                config.http,
                "analysis-service",
                SafecaseError::AnalysisFailure,
            )?;
            Ok(Self {
                client,
                endpoint: join_url(&config.base_url, "analyze-evidence"),
            })
        }

        pub fn endpoint(&self) -> &str {
            &self.endpoint
        }
    }

    #[async_trait]
    impl RemoteAnalyzer for HttpRemoteAnalyzer {
        async fn analyze(&self, request: &AnalysisRequest) -> Result<RemoteAnalysis> {
            self.client.post_json(&self.endpoint, request).await
        }

        fn name(&self) -> &'static str {
            "http-analysis"
        }
    }
}
