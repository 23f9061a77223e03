//! Owner-scoped case operations.
//!
//! Every read and write goes through the owner: a case belonging to someone
//! else behaves exactly like a case that does not exist.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::classifier::Classification;
use crate::error::{Result, SafecaseError};
use crate::export::{CaseReport, ExportFormat};
use crate::extract::ProgressReporter;
use crate::ingest::IngestionPipeline;
use crate::model::{now_micros, Case, CaseId, CaseStatus, EvidenceFile, EvidenceItem, NewCase};
use crate::storage::BlobStore;
use crate::store::RecordStore;
use crate::support::SupportDirectory;
use crate::timeline::Timeline;

#[derive(Debug, Clone)]
pub struct CaseService {
    pipeline: IngestionPipeline,
    support: SupportDirectory,
}

impl CaseService {
    pub fn new(pipeline: IngestionPipeline) -> Self {
        Self {
            pipeline,
            support: SupportDirectory::default(),
        }
    }

    pub fn with_support(mut self, support: SupportDirectory) -> Self {
        self.support = support;
        self
    }

    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.pipeline
    }

    pub fn support(&self) -> &SupportDirectory {
        &self.support
    }

    fn records(&self) -> &Arc<dyn RecordStore> {
        self.pipeline.records()
    }

    fn blobs(&self) -> &Arc<dyn BlobStore> {
        self.pipeline.blobs()
    }

    async fn owned_case(&self, owner_id: &str, case_id: CaseId) -> Result<Option<Case>> {
        Ok(self
            .records()
            .get_case(case_id)
            .await?
            .filter(|case| case.owner_id == owner_id))
    }

    async fn require_case(&self, owner_id: &str, case_id: CaseId) -> Result<Case> {
        self.owned_case(owner_id, case_id)
            .await?
            .ok_or_else(|| SafecaseError::NotFound(format!("Case {case_id}")))
    }

    /// Create a draft case.
    pub async fn create_case(&self, input: NewCase) -> Result<Case> {
        let case = input.into_case(now_micros())?;
        self.records().insert_case(&case).await?;
        info!(case_id = %case.id, platforms = case.platforms.len(), "Case created");
        Ok(case)
    }

    /// Cases of `owner_id`, newest first.
    pub async fn list_cases(&self, owner_id: &str) -> Result<Vec<Case>> {
        self.records().list_cases(owner_id).await
    }

    pub async fn get_case(&self, owner_id: &str, case_id: CaseId) -> Result<Case> {
        self.require_case(owner_id, case_id).await
    }

    /// Any status may follow any status.
    pub async fn set_status(
        &self,
        owner_id: &str,
        case_id: CaseId,
        status: CaseStatus,
    ) -> Result<Case> {
        let current = self.require_case(owner_id, case_id).await?;
        let updated = self
            .records()
            .update_case_status(case_id, status)
            .await?
            .ok_or_else(|| SafecaseError::NotFound(format!("Case {case_id}")))?;
        info!(case_id = %case_id, from = %current.status, to = %updated.status, "Case status changed");
        Ok(updated)
    }

    /// Delete a case and its evidence. Returns the number of evidence items
    /// removed. Blob removal is best-effort.
    pub async fn delete_case(&self, owner_id: &str, case_id: CaseId) -> Result<usize> {
        self.require_case(owner_id, case_id).await?;
        let removed = self
            .records()
            .delete_case(case_id)
            .await?
            .ok_or_else(|| SafecaseError::NotFound(format!("Case {case_id}")))?;

        for item in &removed {
            if let Err(e) = self.blobs().delete(&item.metadata.blob_path).await {
                warn!(
                    case_id = %case_id,
                    blob_path = %item.metadata.blob_path,
                    error = %e,
                    "Blob not removed after case deletion"
                );
            }
        }

        info!(case_id = %case_id, evidence = removed.len(), "Case deleted");
        Ok(removed.len())
    }

    /// Ingest a file into one of the owner's cases.
    ///
    /// A case owned by someone else is reported as unknown (`InvalidInput`).
    pub async fn add_evidence(
        &self,
        owner_id: &str,
        case_id: CaseId,
        file: EvidenceFile,
        progress: &ProgressReporter,
    ) -> Result<EvidenceItem> {
        if file.is_empty() {
            return Err(SafecaseError::InvalidInput("Evidence file is empty".into()));
        }
        if self.owned_case(owner_id, case_id).await?.is_none() {
            return Err(SafecaseError::InvalidInput(format!(
                "Case {case_id} does not exist"
            )));
        }
        self.pipeline.ingest(case_id, file, progress).await
    }

    /// Evidence of a case, newest first.
    pub async fn list_evidence(&self, owner_id: &str, case_id: CaseId) -> Result<Vec<EvidenceItem>> {
        self.require_case(owner_id, case_id).await?;
        self.records().list_evidence(case_id).await
    }

    pub async fn timeline(&self, owner_id: &str, case_id: CaseId) -> Result<Timeline> {
        let items = self.list_evidence(owner_id, case_id).await?;
        Ok(Timeline::build(case_id, items))
    }

    pub async fn report(&self, owner_id: &str, case_id: CaseId) -> Result<CaseReport> {
        let case = self.require_case(owner_id, case_id).await?;
        let items = self.records().list_evidence(case_id).await?;
        Ok(CaseReport::build(&case, items, &self.support, Utc::now()))
    }

    pub async fn export(
        &self,
        owner_id: &str,
        case_id: CaseId,
        format: ExportFormat,
    ) -> Result<String> {
        self.report(owner_id, case_id).await?.render(format)
    }

    /// Classify free text with the local classifier.
    pub fn classify_text(&self, text: &str) -> Classification {
        self.pipeline.classifier().classify(text)
    }
}
