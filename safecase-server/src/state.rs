//! Application state module
//!
//! Defines shared state accessible across all request handlers, and wires
//! the engine's collaborators from configuration.

use std::sync::Arc;
use std::time::Duration;

use safecase_core::{
    BlobStore, CaseService, HarmClassifier, HttpAnalyzerConfig, HttpOcrConfig, HttpOcrRecognizer,
    HttpRemoteAnalyzer, IngestionPipeline, LocalBlobStore, MemoryBlobStore, MemoryRecordStore,
    RecordStore, SafecaseError, TextExtractor,
};

use crate::config::Config;
use crate::db::{DbError, PoolSettings, PostgresRecordStore};

/// Errors raised while wiring the application state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Engine(#[from] SafecaseError),
}

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Case management and evidence intake
    pub cases: Arc<CaseService>,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
}

impl AppState {
    pub fn new(cases: CaseService, max_file_size: usize) -> Self {
        Self {
            cases: Arc::new(cases),
            max_file_size,
        }
    }

    /// Wire collaborators from `config`, falling back to in-memory stores.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let records: Arc<dyn RecordStore> = match &config.database_url {
            Some(url) => {
                let settings = PoolSettings {
                    max_connections: config.database_max_connections,
                    min_connections: config.database_min_connections,
                };
                Arc::new(PostgresRecordStore::new(url, settings).await?)
            }
            None => {
                tracing::warn!(
                    "DATABASE_URL not set, using in-memory record store (data is lost on restart)"
                );
                Arc::new(MemoryRecordStore::new())
            }
        };

        let blobs: Arc<dyn BlobStore> = match &config.blob_dir {
            Some(dir) => {
                tracing::info!(blob_dir = %dir.display(), "Using local blob store");
                Arc::new(LocalBlobStore::new(dir, config.blob_base_url.clone()))
            }
            None => {
                tracing::warn!("BLOB_DIR not set, using in-memory blob store");
                Arc::new(MemoryBlobStore::new(config.blob_base_url.clone()))
            }
        };

        let mut extractor =
            TextExtractor::new().with_timeout(Duration::from_secs(config.ocr_timeout_secs));
        match &config.ocr_service_url {
            Some(url) => {
                let recognizer = HttpOcrRecognizer::new(HttpOcrConfig::new(url.as_str()))?;
                tracing::info!(ocr_service = %url, "OCR enabled");
                extractor = extractor.with_ocr(Arc::new(recognizer));
            }
            None => tracing::warn!("OCR_SERVICE_URL not set, images will yield empty text"),
        }

        let mut pipeline =
            IngestionPipeline::new(records, blobs, extractor, HarmClassifier::new()?);
        if let Some(url) = &config.analysis_service_url {
            let analyzer = HttpRemoteAnalyzer::new(HttpAnalyzerConfig::new(url.as_str()))?;
            tracing::info!(analysis_service = %url, "Remote analysis enabled");
            pipeline = pipeline
                .with_analyzer(Arc::new(analyzer))
                .with_analysis_timeout(Duration::from_secs(config.analysis_timeout_secs));
        }

        Ok(Self::new(CaseService::new(pipeline), config.max_file_size()))
    }
}
