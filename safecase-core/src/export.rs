//! Case export.
//!
//! Renders a case and all of its evidence, oldest first, followed by a
//! closing support line. No evidence item is ever omitted.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Case, CaseStatus, EvidenceItem, EvidenceKind, ThreatLevel};
use crate::support::SupportDirectory;
use crate::timeline::CaseSummary;

/// Placeholder rendered for an item with no extracted text.
pub const NO_TEXT: &str = "(no text)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedEvidence {
    pub number: usize,
    pub uploaded_at: DateTime<Utc>,
    pub kind: EvidenceKind,
    pub threat_level: ThreatLevel,
    pub matched_categories: Vec<String>,
    pub extracted_text: String,
    pub file_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub sha3_256: String,
}

/// Chronological export of one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub title: String,
    pub status: CaseStatus,
    pub platforms: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub summary: CaseSummary,
    /// Oldest first.
    pub evidence: Vec<ExportedEvidence>,
    pub support: String,
}

impl CaseReport {
    /// Build a report from `items` in any order.
    pub fn build(
        case: &Case,
        mut items: Vec<EvidenceItem>,
        support: &SupportDirectory,
        generated_at: DateTime<Utc>,
    ) -> Self {
        // Store order is newest first; reverse before the stable sort so
        // equal timestamps come out oldest-inserted first.
        items.reverse();
        items.sort_by_key(|item| item.uploaded_at);

        let summary = CaseSummary::from_items(&items);
        let evidence = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| ExportedEvidence {
                number: index + 1,
                uploaded_at: item.uploaded_at,
                kind: item.kind,
                threat_level: item.threat_level,
                matched_categories: item.matched_categories,
                extracted_text: item.extracted_text,
                file_url: item.file_url,
                file_name: item.metadata.file_name,
                sha3_256: item.metadata.sha3_256,
            })
            .collect();

        Self {
            title: case.title.clone(),
            status: case.status,
            platforms: case.platforms.clone(),
            created_at: case.created_at,
            generated_at,
            summary,
            evidence,
            support: support.closing_line(),
        }
    }

    pub fn render(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Text => Ok(self.to_text()),
            ExportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    /// Plain-text rendering.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let platforms = if self.platforms.is_empty() {
            "none".to_string()
        } else {
            self.platforms.join(", ")
        };

        // Writing to a String cannot fail.
        let _ = writeln!(out, "SafeCase Evidence Report");
        let _ = writeln!(out, "Case: {}", self.title);
        let _ = writeln!(out, "Status: {}", self.status);
        let _ = writeln!(out, "Platforms: {platforms}");
        let _ = writeln!(out, "Created: {}", timestamp(&self.created_at));
        let _ = writeln!(out, "Generated: {}", timestamp(&self.generated_at));
        let _ = writeln!(
            out,
            "Evidence items: {} ({} flagged)",
            self.summary.total, self.summary.harmful
        );

        for entry in &self.evidence {
            let categories = if entry.matched_categories.is_empty() {
                "none".to_string()
            } else {
                entry.matched_categories.join(", ")
            };
            let text = if entry.extracted_text.trim().is_empty() {
                NO_TEXT
            } else {
                entry.extracted_text.as_str()
            };

            let _ = writeln!(out);
            let _ = writeln!(out, "Evidence #{}", entry.number);
            let _ = writeln!(out, "Uploaded: {}", timestamp(&entry.uploaded_at));
            let _ = writeln!(out, "Kind: {}", entry.kind);
            let _ = writeln!(out, "Threat level: {}", entry.threat_level);
            let _ = writeln!(out, "Categories: {categories}");
            let _ = writeln!(out, "Extracted text:");
            let _ = writeln!(out, "{text}");
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.support);
        out
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
