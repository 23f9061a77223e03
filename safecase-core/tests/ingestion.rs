//! End-to-end ingestion and case management over in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use safecase_core::{
    AnalysisRequest, BlobStore, Case, CaseId, CaseService, CaseStatus, ClassificationSource,
    EvidenceFile, EvidenceItem, EvidenceKind, HarmClassifier, IngestionPipeline, MemoryBlobStore,
    MemoryRecordStore, NewCase, ProgressReporter, RecordStore, RemoteAnalysis, RemoteAnalyzer,
    Result, SafecaseError, StaticRecognizer, StoredBlob, TextExtractor, ThreatLevel,
};

const OWNER: &str = "owner-1";

struct Harness {
    records: Arc<MemoryRecordStore>,
    blobs: Arc<MemoryBlobStore>,
    service: CaseService,
}

fn harness_with(extractor: TextExtractor, analyzer: Option<Arc<dyn RemoteAnalyzer>>) -> Harness {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::default());
    let mut pipeline = IngestionPipeline::new(
        records.clone(),
        blobs.clone(),
        extractor,
        HarmClassifier::new().expect("category table compiles"),
    );
    if let Some(analyzer) = analyzer {
        pipeline = pipeline.with_analyzer(analyzer);
    }
    Harness {
        records,
        blobs,
        service: CaseService::new(pipeline),
    }
}

fn harness() -> Harness {
    harness_with(TextExtractor::new(), None)
}

async fn new_case(service: &CaseService) -> Case {
    service
        .create_case(NewCase::new(OWNER, "Threatening messages"))
        .await
        .expect("Failed to create case")
}

fn pdf() -> EvidenceFile {
    EvidenceFile::new(b"%PDF-1.7 fake".to_vec())
        .with_name("letter.pdf")
        .with_media_type("application/pdf")
}

#[cfg(feature = "raster")]
fn png() -> EvidenceFile {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([0, 0, 0]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    EvidenceFile::new(out.into_inner())
        .with_name("screenshot.PNG")
        .with_media_type("image/png")
}

async fn ingest(h: &Harness, case_id: CaseId, file: EvidenceFile) -> Result<EvidenceItem> {
    h.service
        .add_evidence(OWNER, case_id, file, &ProgressReporter::disabled())
        .await
}

#[tokio::test]
async fn test_document_ingests_with_empty_text() {
    let h = harness();
    let case = new_case(&h.service).await;

    let item = ingest(&h, case.id, pdf()).await.unwrap();

    assert_eq!(item.kind, EvidenceKind::Document);
    assert_eq!(item.extracted_text, "");
    assert_eq!(item.threat_level, ThreatLevel::None);
    assert!(!item.harm_detected);
    assert!(item.matched_categories.is_empty());
    assert_eq!(item.metadata.file_name.as_deref(), Some("letter.pdf"));
    assert_eq!(item.metadata.byte_size, 13);
    assert!(item.metadata.blob_path.starts_with(&format!("{}/", case.id)));
    assert!(item.metadata.blob_path.ends_with(".pdf"));
    assert!(h.blobs.contains(&item.metadata.blob_path));

    let listed = h.service.list_evidence(OWNER, case.id).await.unwrap();
    assert_eq!(listed, vec![item]);
}

#[cfg(feature = "raster")]
#[tokio::test]
async fn test_image_is_ocrd_and_classified() {
    let extractor = TextExtractor::new().with_ocr(Arc::new(StaticRecognizer::new(
        "I know where you live.\nYou better do what I say or I'll share those photos with everyone.",
    )));
    let h = harness_with(extractor, None);
    let case = new_case(&h.service).await;

    let item = ingest(&h, case.id, png()).await.unwrap();

    assert_eq!(item.kind, EvidenceKind::Image);
    assert_eq!(item.matched_categories, vec!["threat", "coercion", "exposure"]);
    assert_eq!(item.threat_level, ThreatLevel::Critical);
    assert!(item.harm_detected);
    assert!(item.metadata.blob_path.ends_with(".png"));
    assert_eq!(item.metadata.dimensions.map(|d| d.width), Some(8));
    assert_eq!(item.metadata.classification_source, ClassificationSource::Local);
}

#[tokio::test]
async fn test_unknown_case_has_no_side_effects() {
    let h = harness();

    let err = ingest(&h, uuid::Uuid::new_v4(), pdf()).await.unwrap_err();

    assert!(matches!(err, SafecaseError::InvalidInput(_)));
    assert!(h.blobs.is_empty());
    assert_eq!(h.records.evidence_count(), 0);
}

#[tokio::test]
async fn test_empty_file_is_rejected() {
    let h = harness();
    let case = new_case(&h.service).await;

    let err = ingest(&h, case.id, EvidenceFile::new(Vec::new())).await.unwrap_err();

    assert!(matches!(err, SafecaseError::InvalidInput(_)));
    assert!(h.blobs.is_empty());
}

#[tokio::test]
async fn test_listing_is_newest_first_and_delete_cascades() {
    let h = harness();
    let case = new_case(&h.service).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(ingest(&h, case.id, pdf()).await.unwrap().id);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let listed: Vec<_> = h
        .service
        .list_evidence(OWNER, case.id)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    ids.reverse();
    assert_eq!(listed, ids);

    assert_eq!(h.service.delete_case(OWNER, case.id).await.unwrap(), 3);
    assert!(h.blobs.is_empty());
    assert_eq!(h.records.evidence_count(), 0);
    assert!(matches!(
        h.service.list_evidence(OWNER, case.id).await,
        Err(SafecaseError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_concurrent_ingestion_into_one_case() {
    let h = harness();
    let case = new_case(&h.service).await;

    let service = Arc::new(h.service.clone());
    let mut handles = Vec::new();
    for i in 0..16 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let file = EvidenceFile::new(format!("note {i}").into_bytes())
                .with_name(format!("note-{i}.txt"))
                .with_media_type("text/plain");
            service
                .add_evidence(OWNER, case.id, file, &ProgressReporter::disabled())
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let items = h.service.list_evidence(OWNER, case.id).await.unwrap();
    assert_eq!(items.len(), 16);
    assert!(items
        .windows(2)
        .all(|pair| pair[0].uploaded_at >= pair[1].uploaded_at));

    let timeline = h.service.timeline(OWNER, case.id).await.unwrap();
    assert_eq!(timeline.summary.total, items.len());
    assert_eq!(
        timeline.summary.harmful,
        items.iter().filter(|item| item.harm_detected).count()
    );
    assert_eq!(timeline.summary.count(EvidenceKind::Document), 16);
}

#[tokio::test]
async fn test_other_owner_cannot_see_case() {
    let h = harness();
    let case = new_case(&h.service).await;

    assert!(matches!(
        h.service.get_case("intruder", case.id).await,
        Err(SafecaseError::NotFound(_))
    ));
    assert!(matches!(
        h.service.delete_case("intruder", case.id).await,
        Err(SafecaseError::NotFound(_))
    ));
    assert!(matches!(
        h.service
            .add_evidence("intruder", case.id, pdf(), &ProgressReporter::disabled())
            .await,
        Err(SafecaseError::InvalidInput(_))
    ));
    assert!(h.service.list_cases("intruder").await.unwrap().is_empty());
    assert!(h.blobs.is_empty());
}

#[tokio::test]
async fn test_status_changes_any_to_any() {
    let h = harness();
    let case = new_case(&h.service).await;

    let archived = h
        .service
        .set_status(OWNER, case.id, CaseStatus::Archived)
        .await
        .unwrap();
    assert_eq!(archived.status, CaseStatus::Archived);

    let reopened = h
        .service
        .set_status(OWNER, case.id, CaseStatus::Active)
        .await
        .unwrap();
    assert_eq!(reopened.status, CaseStatus::Active);
}

// ---------------------------------------------------------------------------
// Failing collaborators
// ---------------------------------------------------------------------------

struct RefusingBlobStore;

#[async_trait]
impl BlobStore for RefusingBlobStore {
    async fn put(&self, _: &str, _: &[u8], _: &str) -> Result<String> {
        Err(SafecaseError::StorageFailure("bucket unavailable".into()))
    }

    async fn fetch(&self, _: &str) -> Result<Option<StoredBlob>> {
        Ok(None)
    }

    async fn delete(&self, _: &str) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "refusing"
    }
}

/// Accepts cases but refuses every evidence insert.
struct ReadOnlyEvidenceStore {
    inner: MemoryRecordStore,
}

#[async_trait]
impl RecordStore for ReadOnlyEvidenceStore {
    async fn insert_case(&self, case: &Case) -> Result<()> {
        self.inner.insert_case(case).await
    }

    async fn get_case(&self, id: CaseId) -> Result<Option<Case>> {
        self.inner.get_case(id).await
    }

    async fn list_cases(&self, owner_id: &str) -> Result<Vec<Case>> {
        self.inner.list_cases(owner_id).await
    }

    async fn update_case_status(&self, id: CaseId, status: CaseStatus) -> Result<Option<Case>> {
        self.inner.update_case_status(id, status).await
    }

    async fn delete_case(&self, id: CaseId) -> Result<Option<Vec<EvidenceItem>>> {
        self.inner.delete_case(id).await
    }

    async fn insert_evidence(&self, _: &EvidenceItem) -> Result<()> {
        Err(SafecaseError::PersistenceFailure("disk full".into()))
    }

    async fn list_evidence(&self, case_id: CaseId) -> Result<Vec<EvidenceItem>> {
        self.inner.list_evidence(case_id).await
    }

    fn name(&self) -> &'static str {
        "read-only"
    }
}

#[tokio::test]
async fn test_blob_failure_creates_no_record() {
    let records = Arc::new(MemoryRecordStore::new());
    let pipeline = IngestionPipeline::new(
        records.clone(),
        Arc::new(RefusingBlobStore),
        TextExtractor::new(),
        HarmClassifier::new().unwrap(),
    );
    let service = CaseService::new(pipeline);
    let case = new_case(&service).await;

    let err = service
        .add_evidence(OWNER, case.id, pdf(), &ProgressReporter::disabled())
        .await
        .unwrap_err();

    assert!(matches!(err, SafecaseError::StorageFailure(_)));
    assert_eq!(records.evidence_count(), 0);
}

#[tokio::test]
async fn test_persistence_failure_leaves_orphan_blob_only() {
    let blobs = Arc::new(MemoryBlobStore::default());
    let records = Arc::new(ReadOnlyEvidenceStore {
        inner: MemoryRecordStore::new(),
    });
    let pipeline = IngestionPipeline::new(
        records.clone(),
        blobs.clone(),
        TextExtractor::new(),
        HarmClassifier::new().unwrap(),
    );
    let service = CaseService::new(pipeline);
    let case = new_case(&service).await;

    let err = service
        .add_evidence(OWNER, case.id, pdf(), &ProgressReporter::disabled())
        .await
        .unwrap_err();

    assert!(matches!(err, SafecaseError::PersistenceFailure(_)));
    assert_eq!(blobs.len(), 1);
    assert!(records.list_evidence(case.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Remote analysis
// ---------------------------------------------------------------------------

struct FixedAnalyzer {
    response: RemoteAnalysis,
    calls: AtomicUsize,
}

#[async_trait]
impl RemoteAnalyzer for FixedAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<RemoteAnalysis> {
        assert!(request.file_url.is_some());
        assert!(request.evidence_id.is_some());
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct DownAnalyzer;

#[async_trait]
impl RemoteAnalyzer for DownAnalyzer {
    async fn analyze(&self, _: &AnalysisRequest) -> Result<RemoteAnalysis> {
        Err(SafecaseError::AnalysisFailure("503".into()))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

#[tokio::test]
async fn test_remote_analysis_supersedes_local() {
    let analyzer = Arc::new(FixedAnalyzer {
        response: RemoteAnalysis {
            extracted_text: Some("send money or else".into()),
            abuse_labels: vec!["extortion".into(), "harassment".into()],
            severity_score: Some(0.82),
            summary: Some("Financial extortion attempt".into()),
            participants: Vec::new(),
        },
        calls: AtomicUsize::new(0),
    });
    let h = harness_with(TextExtractor::new(), Some(analyzer.clone()));
    let case = new_case(&h.service).await;

    let item = ingest(&h, case.id, pdf()).await.unwrap();

    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(item.extracted_text, "send money or else");
    assert_eq!(item.matched_categories, vec!["extortion", "harassment"]);
    assert_eq!(item.threat_level, ThreatLevel::High);
    assert!(item.harm_detected);
    assert_eq!(item.metadata.classification_source, ClassificationSource::Remote);
    let findings = item.metadata.remote.as_ref().unwrap();
    assert_eq!(findings.severity_score, Some(0.82));
    assert_eq!(findings.summary.as_deref(), Some("Financial extortion attempt"));
}

#[tokio::test]
async fn test_remote_failure_falls_back_to_local() {
    let extractor = TextExtractor::new().with_collaborator(
        EvidenceKind::Document,
        Arc::new(StaticRecognizer::new("If you tell anyone I will hurt you.")),
    );
    let h = harness_with(extractor, Some(Arc::new(DownAnalyzer)));
    let case = new_case(&h.service).await;

    let item = ingest(&h, case.id, pdf()).await.unwrap();

    assert_eq!(item.matched_categories, vec!["threat"]);
    assert_eq!(item.threat_level, ThreatLevel::Medium);
    assert_eq!(item.metadata.classification_source, ClassificationSource::Local);
    assert!(item.metadata.remote.is_none());
}

struct HungAnalyzer;

#[async_trait]
impl RemoteAnalyzer for HungAnalyzer {
    async fn analyze(&self, _: &AnalysisRequest) -> Result<RemoteAnalysis> {
        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        Err(SafecaseError::AnalysisFailure("never answers".into()))
    }

    fn name(&self) -> &'static str {
        "hung"
    }
}

#[tokio::test(start_paused = true)]
async fn test_hung_remote_analysis_times_out_to_local() {
    let extractor = TextExtractor::new().with_collaborator(
        EvidenceKind::Document,
        Arc::new(StaticRecognizer::new("If you tell anyone I will hurt you.")),
    );
    let records = Arc::new(MemoryRecordStore::new());
    let pipeline = IngestionPipeline::new(
        records.clone(),
        Arc::new(MemoryBlobStore::default()),
        extractor,
        HarmClassifier::new().unwrap(),
    )
    .with_analyzer(Arc::new(HungAnalyzer))
    .with_analysis_timeout(Duration::from_secs(5));
    let service = CaseService::new(pipeline);
    let case = new_case(&service).await;

    let item = tokio::time::timeout(
        Duration::from_secs(600),
        service.add_evidence(OWNER, case.id, pdf(), &ProgressReporter::disabled()),
    )
    .await
    .expect("ingestion completes despite a hung analyzer")
    .unwrap();

    assert_eq!(item.matched_categories, vec!["threat"]);
    assert_eq!(item.metadata.classification_source, ClassificationSource::Local);
    assert_eq!(records.evidence_count(), 1);
}
