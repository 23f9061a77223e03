//! Timeline projection over a case's evidence.
//!
//! Everything here is derived on read and never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{CaseId, EvidenceItem, EvidenceKind, ThreatLevel};

/// Display badge for a threat level, `None` for [`ThreatLevel::None`].
pub fn threat_badge(level: ThreatLevel) -> Option<String> {
    match level {
        ThreatLevel::None => None,
        other => Some(format!("{} THREAT", other.as_str().to_uppercase())),
    }
}

/// Counts over a case's evidence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaseSummary {
    pub total: usize,
    pub harmful: usize,
    /// Count per kind; every kind is present, zero when unused.
    pub by_kind: BTreeMap<EvidenceKind, usize>,
}

impl CaseSummary {
    pub fn from_items(items: &[EvidenceItem]) -> Self {
        let mut by_kind: BTreeMap<EvidenceKind, usize> =
            EvidenceKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        let mut harmful = 0;
        for item in items {
            *by_kind.entry(item.kind).or_default() += 1;
            if item.harm_detected {
                harmful += 1;
            }
        }
        Self {
            total: items.len(),
            harmful,
            by_kind,
        }
    }

    pub fn count(&self, kind: EvidenceKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// 1 for the oldest item, `total` for the newest.
    pub number: usize,
    /// `Evidence #N`.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub item: EvidenceItem,
}

/// Newest-first, numbered view of a case's evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub case_id: CaseId,
    pub summary: CaseSummary,
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Build the timeline from `items` in store order.
    ///
    /// Items are re-sorted newest first; the sort is stable so items with
    /// equal timestamps keep the order they were given in.
    pub fn build(case_id: CaseId, mut items: Vec<EvidenceItem>) -> Self {
        items.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        let summary = CaseSummary::from_items(&items);
        let total = items.len();

        let entries = items
            .into_iter()
            .enumerate()
            .map(|(position, item)| {
                let number = total - position;
                TimelineEntry {
                    number,
                    label: format!("Evidence #{number}"),
                    badge: threat_badge(item.threat_level),
                    item,
                }
            })
            .collect();

        Self {
            case_id,
            summary,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
