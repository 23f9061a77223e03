use thiserror::Error;

#[derive(Error, Debug)]
pub enum SafecaseError {
    /// Rejected before any side effect (unknown case, empty file, blank title).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The blob store refused the upload. No record was created.
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// The record store refused the write after the blob was stored.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Text recognition failed. Absorbed by the extractor, never surfaced by ingestion.
    #[error("Extraction failure: {0}")]
    ExtractionFailure(String),

    #[error("Remote analysis failure: {0}")]
    AnalysisFailure(String),

    #[error("Harm pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[cfg(feature = "network")]
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl SafecaseError {
    /// Stable machine-readable code for the error category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::StorageFailure(_) => "STORAGE_FAILURE",
            Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            Self::ExtractionFailure(_) => "EXTRACTION_FAILURE",
            Self::AnalysisFailure(_) => "ANALYSIS_FAILURE",
            Self::Pattern(_) => "PATTERN_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            #[cfg(feature = "network")]
            Self::HttpError(_) => "UPSTREAM_ERROR",
        }
    }

    /// Whether the caller can safely retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StorageFailure(_) | Self::AnalysisFailure(_)
        )
    }
}

impl From<serde_json::Error> for SafecaseError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SafecaseError>;
