//! Fixed-output recognizer for tests and offline demos.

use async_trait::async_trait;

use super::{ProgressReporter, TextRecognizer};
use crate::error::Result;
use crate::model::EvidenceFile;

/// Recognizer that returns the same text for every file.
///
/// WARNING: does not look at the file contents.
#[derive(Debug, Clone, Default)]
pub struct StaticRecognizer {
    text: String,
}

impl StaticRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl TextRecognizer for StaticRecognizer {
    async fn recognize(&self, _file: &EvidenceFile, progress: &ProgressReporter) -> Result<String> {
        progress.report(0.5);
        Ok(self.text.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
