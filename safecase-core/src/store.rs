//! Record persistence collaborator.
//!
//! Cases own their evidence: deleting a case removes every evidence record
//! that references it. Evidence records are insert-only.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{Result, SafecaseError};
use crate::model::{Case, CaseId, CaseStatus, EvidenceItem};

/// Insert / select / cascade-delete over cases and evidence.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_case(&self, case: &Case) -> Result<()>;

    async fn get_case(&self, id: CaseId) -> Result<Option<Case>>;

    /// Cases for `owner_id`, newest first.
    async fn list_cases(&self, owner_id: &str) -> Result<Vec<Case>>;

    /// Set the status of a case. Returns the updated case, `None` if missing.
    async fn update_case_status(&self, id: CaseId, status: CaseStatus) -> Result<Option<Case>>;

    /// Delete a case and all its evidence. Returns the removed evidence, or
    /// `None` when the case does not exist.
    async fn delete_case(&self, id: CaseId) -> Result<Option<Vec<EvidenceItem>>>;

    /// Atomically insert one evidence record. Fails if the case is gone.
    async fn insert_evidence(&self, item: &EvidenceItem) -> Result<()>;

    /// Evidence of a case, newest upload first; ties newest insert first.
    async fn list_evidence(&self, case_id: CaseId) -> Result<Vec<EvidenceItem>>;

    async fn check_health(&self) -> Result<()> {
        Ok(())
    }

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// In-memory record store (development and tests).
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    cases: DashMap<CaseId, (u64, Case)>,
    evidence: DashMap<CaseId, Vec<(u64, EvidenceItem)>>,
    seq: AtomicU64,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Total evidence records across all cases.
    pub fn evidence_count(&self) -> usize {
        self.evidence.iter().map(|entry| entry.value().len()).sum()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_case(&self, case: &Case) -> Result<()> {
        if self.cases.contains_key(&case.id) {
            return Err(SafecaseError::PersistenceFailure(format!(
                "Case {} already exists",
                case.id
            )));
        }
        let seq = self.next_seq();
        self.cases.insert(case.id, (seq, case.clone()));
        Ok(())
    }

    async fn get_case(&self, id: CaseId) -> Result<Option<Case>> {
        Ok(self.cases.get(&id).map(|entry| entry.value().1.clone()))
    }

    async fn list_cases(&self, owner_id: &str) -> Result<Vec<Case>> {
        let mut rows: Vec<(u64, Case)> = self
            .cases
            .iter()
            .filter(|entry| entry.value().1.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        Ok(rows.into_iter().map(|(_, case)| case).collect())
    }

    async fn update_case_status(&self, id: CaseId, status: CaseStatus) -> Result<Option<Case>> {
        Ok(self.cases.get_mut(&id).map(|mut entry| {
            entry.value_mut().1.status = status;
            entry.value().1.clone()
        }))
    }

    async fn delete_case(&self, id: CaseId) -> Result<Option<Vec<EvidenceItem>>> {
        if self.cases.remove(&id).is_none() {
            return Ok(None);
        }
        let removed = self
            .evidence
            .remove(&id)
            .map(|(_, rows)| rows.into_iter().map(|(_, item)| item).collect())
            .unwrap_or_default();
        Ok(Some(removed))
    }

    async fn insert_evidence(&self, item: &EvidenceItem) -> Result<()> {
        // Holding the case entry blocks a concurrent delete_case until the
        // evidence row is in place, so no row can outlive its case.
        let Some(_case) = self.cases.get(&item.case_id) else {
            return Err(SafecaseError::PersistenceFailure(format!(
                "Case {} no longer exists",
                item.case_id
            )));
        };
        let seq = self.next_seq();
        self.evidence
            .entry(item.case_id)
            .or_default()
            .push((seq, item.clone()));
        Ok(())
    }

    async fn list_evidence(&self, case_id: CaseId) -> Result<Vec<EvidenceItem>> {
        let mut rows: Vec<(u64, EvidenceItem)> = self
            .evidence
            .get(&case_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            b.uploaded_at.cmp(&a.uploaded_at).then(seq_b.cmp(seq_a))
        });
        Ok(rows.into_iter().map(|(_, item)| item).collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::classifier::Classification;
    use crate::model::{EvidenceKind, EvidenceMetadata, NewCase};

    fn case_at(owner: &str, title: &str, secs: i64) -> Case {
        NewCase::new(owner, title)
            .into_case(Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap())
            .unwrap()
    }

    fn item(case_id: CaseId, uploaded_at: chrono::DateTime<Utc>, text: &str) -> EvidenceItem {
        EvidenceItem::new(
            case_id,
            format!("memory://evidence/{case_id}/{text}"),
            EvidenceKind::Document,
            text.to_string(),
            Classification::default(),
            uploaded_at,
            EvidenceMetadata {
                file_name: None,
                byte_size: 1,
                media_type: "application/pdf".into(),
                sha3_256: String::new(),
                blob_path: format!("{case_id}/{text}"),
                dimensions: None,
                classification_source: Default::default(),
                remote: None,
            },
        )
    }

    #[tokio::test]
    async fn test_list_cases_newest_first_for_owner() {
        let store = MemoryRecordStore::new();
        let older = case_at("alice", "older", 0);
        let newer = case_at("alice", "newer", 10);
        let other = case_at("bob", "other", 20);
        for case in [&older, &newer, &other] {
            store.insert_case(case).await.unwrap();
        }

        let titles: Vec<_> = store
            .list_cases("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_evidence_ordering_and_tie_break() {
        let store = MemoryRecordStore::new();
        let case = case_at("alice", "case", 0);
        store.insert_case(&case).await.unwrap();

        let t0 = Utc.timestamp_opt(1_700_000_100, 0).unwrap();
        store.insert_evidence(&item(case.id, t0 + Duration::seconds(2), "t3")).await.unwrap();
        store.insert_evidence(&item(case.id, t0, "t1-first")).await.unwrap();
        store.insert_evidence(&item(case.id, t0, "t1-second")).await.unwrap();
        store.insert_evidence(&item(case.id, t0 + Duration::seconds(1), "t2")).await.unwrap();

        let texts: Vec<_> = store
            .list_evidence(case.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.extracted_text)
            .collect();
        assert_eq!(texts, vec!["t3", "t2", "t1-second", "t1-first"]);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let store = MemoryRecordStore::new();
        let case = case_at("alice", "case", 0);
        store.insert_case(&case).await.unwrap();
        store.insert_evidence(&item(case.id, Utc::now(), "a")).await.unwrap();
        store.insert_evidence(&item(case.id, Utc::now(), "b")).await.unwrap();

        let removed = store.delete_case(case.id).await.unwrap().unwrap();
        assert_eq!(removed.len(), 2);
        assert!(store.list_evidence(case.id).await.unwrap().is_empty());
        assert!(store.get_case(case.id).await.unwrap().is_none());
        assert_eq!(store.evidence_count(), 0);
        assert!(store.delete_case(case.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_evidence_for_missing_case_fails() {
        let store = MemoryRecordStore::new();
        let err = store
            .insert_evidence(&item(uuid::Uuid::new_v4(), Utc::now(), "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, SafecaseError::PersistenceFailure(_)));
    }

    #[tokio::test]
    async fn test_update_status_any_to_any() {
        let store = MemoryRecordStore::new();
        let case = case_at("alice", "case", 0);
        store.insert_case(&case).await.unwrap();

        for status in [CaseStatus::Archived, CaseStatus::Draft, CaseStatus::Submitted] {
            let updated = store.update_case_status(case.id, status).await.unwrap().unwrap();
            assert_eq!(updated.status, status);
        }
        assert!(store
            .update_case_status(uuid::Uuid::new_v4(), CaseStatus::Active)
            .await
            .unwrap()
            .is_none());
    }
}
