//! SafeCase Core - evidence intake and threat analysis engine
//!
//! This crate turns uploaded evidence (screenshots, documents, recordings)
//! into classified, case-scoped records for people facing harassment or
//! threats.
//!
//! # Features
//!
//! - Text extraction with pluggable recognizers (HTTP OCR service, static test double)
//! - Deterministic, explainable harm classification over six ordered categories
//! - All-or-nothing ingestion pipeline over blob and record store collaborators
//! - Optional remote analysis service that supersedes the local classifier
//! - Timeline projection, case export and a support resource directory
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use safecase_core::{
//!     CaseService, EvidenceFile, HarmClassifier, IngestionPipeline, MemoryBlobStore,
//!     MemoryRecordStore, NewCase, ProgressReporter, StaticRecognizer, TextExtractor,
//! };
//!
//! # async fn example() -> safecase_core::Result<()> {
//! let extractor = TextExtractor::new()
//!     .with_ocr(Arc::new(StaticRecognizer::new("I know where you live")));
//! let pipeline = IngestionPipeline::new(
//!     Arc::new(MemoryRecordStore::new()),
//!     Arc::new(MemoryBlobStore::default()),
//!     extractor,
//!     HarmClassifier::new()?,
//! );
//! let service = CaseService::new(pipeline);
//!
//! let case = service.create_case(NewCase::new("owner-1", "Messages from J.")).await?;
//! let file = EvidenceFile::new(std::fs::read("screenshot.png").unwrap_or_default())
//!     .with_name("screenshot.png")
//!     .with_media_type("image/png");
//! let item = service
//!     .add_evidence("owner-1", case.id, file, &ProgressReporter::disabled())
//!     .await?;
//! println!("{} -> {}", item.id, item.threat_level);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cases;
pub mod classifier;
pub mod error;
pub mod export;
pub mod extract;
#[cfg(feature = "network")]
pub mod http_client;
pub mod ingest;
pub mod model;
pub mod storage;
pub mod store;
pub mod support;
pub mod timeline;

// Re-export main types for convenience
pub use analysis::{AnalysisRequest, Participant, RemoteAnalysis, RemoteAnalyzer, RemoteFindings};
pub use cases::CaseService;
pub use classifier::{Classification, HarmCategory, HarmClassifier};
pub use error::{Result, SafecaseError};
pub use export::{CaseReport, ExportFormat, ExportedEvidence, NO_TEXT};
pub use extract::{
    Extraction, ProgressReporter, StaticRecognizer, TextExtractor, TextRecognizer,
    DEFAULT_EXTRACTION_TIMEOUT,
};
pub use ingest::{content_digest, IngestionPipeline, DEFAULT_ANALYSIS_TIMEOUT};
pub use model::{
    media_type_for_extension, normalize_platforms, now_micros, Case, CaseId, CaseStatus,
    ClassificationSource, EvidenceFile, EvidenceId, EvidenceItem, EvidenceKind, EvidenceMetadata,
    ImageDimensions, NewCase, ThreatLevel,
};
pub use storage::{blob_path, BlobStore, LocalBlobStore, MemoryBlobStore, StoredBlob};
pub use store::{MemoryRecordStore, RecordStore};
pub use support::{SupportCategory, SupportDirectory, SupportResource};
pub use timeline::{threat_badge, CaseSummary, Timeline, TimelineEntry};

// Network-dependent exports
#[cfg(feature = "network")]
pub use analysis::{HttpAnalyzerConfig, HttpRemoteAnalyzer};
#[cfg(feature = "network")]
pub use extract::{HttpOcrConfig, HttpOcrRecognizer};
#[cfg(feature = "network")]
pub use http_client::HttpClientConfig;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Create a case, ingest a document, read it back through every view.
    #[tokio::test]
    async fn test_full_case_workflow() {
        let pipeline = IngestionPipeline::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryBlobStore::default()),
            TextExtractor::new(),
            HarmClassifier::new().expect("category table compiles"),
        );
        let service = CaseService::new(pipeline);

        let case = service
            .create_case(NewCase::new("owner-1", "Workplace harassment"))
            .await
            .expect("Failed to create case");
        assert_eq!(case.status, CaseStatus::Draft);

        let file = EvidenceFile::new(b"%PDF-1.7 ...".to_vec())
            .with_name("letter.pdf")
            .with_media_type("application/pdf");
        let item = service
            .add_evidence("owner-1", case.id, file, &ProgressReporter::disabled())
            .await
            .expect("Failed to ingest evidence");

        assert_eq!(item.kind, EvidenceKind::Document);
        assert_eq!(item.extracted_text, "");
        assert_eq!(item.threat_level, ThreatLevel::None);
        assert!(!item.harm_detected);
        assert_eq!(item.metadata.sha3_256, content_digest(b"%PDF-1.7 ..."));

        let timeline = service.timeline("owner-1", case.id).await.unwrap();
        assert_eq!(timeline.summary.total, 1);
        assert_eq!(timeline.entries[0].label, "Evidence #1");

        let export = service
            .export("owner-1", case.id, ExportFormat::Text)
            .await
            .unwrap();
        assert!(export.contains("Workplace harassment"));
        assert!(export.contains(NO_TEXT));
    }
}
