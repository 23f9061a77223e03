//! Evidence ingestion pipeline.
//!
//! `ingest` is all-or-nothing from the caller's view: either a fully
//! classified [`EvidenceItem`] is persisted and returned, or an error is
//! returned and no record exists. A stored blob may outlive a failed or
//! abandoned ingestion; a record never exists without its blob.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sha3::{Digest, Sha3_256};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::analysis::{AnalysisRequest, RemoteAnalyzer};
use crate::classifier::HarmClassifier;
use crate::error::{Result, SafecaseError};
use crate::extract::{ProgressReporter, TextExtractor};
use crate::model::{
    now_micros, CaseId, ClassificationSource, EvidenceFile, EvidenceItem, EvidenceMetadata,
};
use crate::storage::{blob_path, BlobStore};
use crate::store::RecordStore;

/// Hex SHA3-256 digest of `bytes`.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Default upper bound on one remote analysis call, retries included.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Upload, extract, classify and persist one evidence file.
#[derive(Clone)]
pub struct IngestionPipeline {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    extractor: TextExtractor,
    classifier: HarmClassifier,
    analyzer: Option<Arc<dyn RemoteAnalyzer>>,
    analysis_timeout: Duration,
}

impl IngestionPipeline {
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        extractor: TextExtractor,
        classifier: HarmClassifier,
    ) -> Self {
        Self {
            records,
            blobs,
            extractor,
            classifier,
            analyzer: None,
            analysis_timeout: DEFAULT_ANALYSIS_TIMEOUT,
        }
    }

    /// Let a remote analysis service supersede the local classifier.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn RemoteAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Bound the remote analysis step; past it the local result stands.
    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    pub fn classifier(&self) -> &HarmClassifier {
        &self.classifier
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    /// Ingest `file` into `case_id`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty file or unknown case (nothing written)
    /// - `StorageFailure` when the blob upload fails (no record)
    /// - `PersistenceFailure` when the record insert fails (blob orphaned)
    #[instrument(
        level = "info",
        skip(self, file, progress),
        fields(case_id = %case_id, bytes = file.bytes.len())
    )]
    pub async fn ingest(
        &self,
        case_id: CaseId,
        file: EvidenceFile,
        progress: &ProgressReporter,
    ) -> Result<EvidenceItem> {
        let start = Instant::now();

        if file.is_empty() {
            return Err(SafecaseError::InvalidInput("Evidence file is empty".into()));
        }
        if self.records.get_case(case_id).await?.is_none() {
            return Err(SafecaseError::InvalidInput(format!(
                "Case {case_id} does not exist"
            )));
        }

        let kind = file.kind();
        let media_type = file.media_type().to_string();
        let path = blob_path(case_id, &file.extension());

        let file_url = self
            .blobs
            .put(&path, &file.bytes, &media_type)
            .await
            .map_err(|e| match e {
                SafecaseError::StorageFailure(_) => e,
                other => SafecaseError::StorageFailure(other.to_string()),
            })?;
        debug!(blob_path = %path, store = self.blobs.name(), "Blob stored");

        let extraction = self.extractor.extract(&file, kind, progress).await;

        let evidence_id = Uuid::new_v4();
        let mut text = extraction.text;
        let mut classification = self.classifier.classify(&text);
        let mut source = ClassificationSource::Local;
        let mut remote = None;

        if let Some(analyzer) = &self.analyzer {
            let mut request = AnalysisRequest::new(case_id, kind)
                .with_file_url(file_url.clone())
                .with_text(&text);
            request.evidence_id = Some(evidence_id);

            match tokio::time::timeout(self.analysis_timeout, analyzer.analyze(&request)).await {
                Ok(Ok(analysis)) => {
                    text = analysis.text_or(text);
                    classification = analysis.classification();
                    source = ClassificationSource::Remote;
                    remote = Some(analysis.findings());
                }
                Ok(Err(e)) => warn!(
                    analyzer = analyzer.name(),
                    error = %e,
                    "Remote analysis failed, using local classification"
                ),
                Err(_) => warn!(
                    analyzer = analyzer.name(),
                    timeout_secs = self.analysis_timeout.as_secs(),
                    "Remote analysis timed out, using local classification"
                ),
            }
        }

        let metadata = EvidenceMetadata {
            byte_size: file.bytes.len() as u64,
            sha3_256: content_digest(&file.bytes),
            media_type,
            file_name: file.file_name,
            blob_path: path.clone(),
            dimensions: extraction.dimensions,
            classification_source: source,
            remote,
        };

        let mut item = EvidenceItem::new(
            case_id,
            file_url,
            kind,
            text,
            classification,
            now_micros(),
            metadata,
        );
        item.id = evidence_id;

        if let Err(e) = self.records.insert_evidence(&item).await {
            error!(
                blob_path = %path,
                evidence_id = %item.id,
                error = %e,
                "Evidence record not persisted, blob orphaned"
            );
            return Err(match e {
                SafecaseError::PersistenceFailure(_) => e,
                other => SafecaseError::PersistenceFailure(other.to_string()),
            });
        }

        info!(
            evidence_id = %item.id,
            kind = %item.kind,
            threat_level = %item.threat_level,
            harm_detected = item.harm_detected,
            latency_ms = start.elapsed().as_millis() as u64,
            "Evidence ingested"
        );

        Ok(item)
    }
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("records", &self.records.name())
            .field("blobs", &self.blobs.name())
            .field("extractor", &self.extractor)
            .field("analyzer", &self.analyzer.as_ref().map(|a| a.name()))
            .field("analysis_timeout", &self.analysis_timeout)
            .finish()
    }
}
