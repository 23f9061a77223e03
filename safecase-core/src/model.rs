//! Case and evidence entities.
//!
//! A [`Case`] exclusively owns its [`EvidenceItem`]s. Evidence items are
//! append-only: they are built once by the ingestion pipeline and never
//! mutated afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::RemoteFindings;
use crate::classifier::Classification;
use crate::error::{Result, SafecaseError};

/// Case identifier.
pub type CaseId = Uuid;
/// Evidence item identifier.
pub type EvidenceId = Uuid;

/// Lifecycle status of a case.
///
/// Transitions are owner-driven: any status may follow any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Draft,
    Active,
    Submitted,
    Archived,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Submitted => "submitted",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = SafecaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "submitted" => Ok(Self::Submitted),
            "archived" => Ok(Self::Archived),
            other => Err(SafecaseError::InvalidInput(format!(
                "Unknown case status '{other}'"
            ))),
        }
    }
}

/// A container for one incident's evidence, owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    /// Platform tags, de-duplicated case-insensitively and kept sorted.
    pub platforms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new case.
#[derive(Debug, Clone, Default)]
pub struct NewCase {
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub platforms: Vec<String>,
}

impl NewCase {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the input and build a draft case stamped with `now`.
    pub fn into_case(self, now: DateTime<Utc>) -> Result<Case> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(SafecaseError::InvalidInput(
                "Case title must not be empty".into(),
            ));
        }
        if self.owner_id.trim().is_empty() {
            return Err(SafecaseError::InvalidInput(
                "Case owner must not be empty".into(),
            ));
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Case {
            id: Uuid::new_v4(),
            owner_id: self.owner_id,
            title: title.to_string(),
            description,
            status: CaseStatus::Draft,
            platforms: normalize_platforms(self.platforms),
            created_at: now,
        })
    }
}

/// Trim, drop empty, de-duplicate (case-insensitive, first spelling wins) and sort.
pub fn normalize_platforms<I, S>(platforms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for platform in platforms {
        let tag = platform.as_ref().trim();
        if tag.is_empty() {
            continue;
        }
        if !out.iter().any(|seen| seen.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    out.sort_by_key(|tag| tag.to_lowercase());
    out
}

/// Kind of an uploaded artifact, derived from its declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Image,
    Audio,
    Video,
    Document,
}

impl EvidenceKind {
    pub const ALL: [EvidenceKind; 4] = [Self::Image, Self::Audio, Self::Video, Self::Document];

    /// `image/*`, `audio/*` and `video/*` map to their kind; everything else is a document.
    pub fn from_media_type(media_type: &str) -> Self {
        let media_type = media_type.trim().to_ascii_lowercase();
        if media_type.starts_with("image/") {
            Self::Image
        } else if media_type.starts_with("audio/") {
            Self::Audio
        } else if media_type.starts_with("video/") {
            Self::Video
        } else {
            Self::Document
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvidenceKind {
    type Err = SafecaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            "document" => Ok(Self::Document),
            other => Err(SafecaseError::InvalidInput(format!(
                "Unknown evidence kind '{other}'"
            ))),
        }
    }
}

/// Ordinal severity attached to an evidence item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    /// Step function over the number of matched harm categories.
    ///
    /// `Low` is a valid level but is never produced here.
    pub fn from_match_count(count: usize) -> Self {
        match count {
            0 => Self::None,
            1 => Self::Medium,
            2 => Self::High,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreatLevel {
    type Err = SafecaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(SafecaseError::InvalidInput(format!(
                "Unknown threat level '{other}'"
            ))),
        }
    }
}

/// A raw uploaded artifact, before ingestion.
#[derive(Debug, Clone, Default)]
pub struct EvidenceFile {
    pub bytes: Vec<u8>,
    /// Original filename as supplied by the uploader.
    pub file_name: Option<String>,
    /// Declared media type (e.g. `image/png`).
    pub media_type: Option<String>,
}

impl EvidenceFile {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Declared media type, defaulting to `application/octet-stream`.
    pub fn media_type(&self) -> &str {
        self.media_type
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("application/octet-stream")
    }

    pub fn kind(&self) -> EvidenceKind {
        EvidenceKind::from_media_type(self.media_type())
    }

    /// Lowercased extension of the original filename, `bin` when unknown.
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Current time truncated to the microsecond precision record stores keep,
/// so a returned record equals the one read back later.
pub fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(now)
}

/// Media type for a file extension, case-insensitive.
pub fn media_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" | "aac" => "audio/aac",
        "ogg" | "opus" => "audio/ogg",
        "flac" => "audio/flac",
        "txt" | "log" => "text/plain",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Where the matched categories of an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    #[default]
    Local,
    Remote,
}

/// Pixel dimensions of a decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Free-form metadata captured at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceMetadata {
    pub file_name: Option<String>,
    pub byte_size: u64,
    pub media_type: String,
    /// Hex SHA3-256 of the uploaded bytes.
    pub sha3_256: String,
    /// Path of the stored blob, kept for cleanup and reconciliation.
    pub blob_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
    #[serde(default)]
    pub classification_source: ClassificationSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteFindings>,
}

/// One immutable, classified artifact belonging to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: EvidenceId,
    pub case_id: CaseId,
    /// Opaque pointer to the stored blob; the blob is not owned by this record.
    pub file_url: String,
    pub kind: EvidenceKind,
    pub extracted_text: String,
    pub harm_detected: bool,
    pub threat_level: ThreatLevel,
    pub matched_categories: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
    pub metadata: EvidenceMetadata,
}

impl EvidenceItem {
    /// Assemble a new item. Harm flag and threat level come from `classification`.
    pub fn new(
        case_id: CaseId,
        file_url: String,
        kind: EvidenceKind,
        extracted_text: String,
        classification: Classification,
        uploaded_at: DateTime<Utc>,
        metadata: EvidenceMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            case_id,
            file_url,
            kind,
            extracted_text,
            harm_detected: classification.harm_detected,
            threat_level: classification.threat_level,
            matched_categories: classification.matched_categories,
            uploaded_at,
            metadata,
        }
    }
}
