//! Text extraction.
//!
//! Turns a raw evidence file into plain text. Images go through an OCR
//! [`TextRecognizer`]; documents, audio and video yield an empty string unless
//! a collaborator is registered for that kind.
//!
//! Extraction never fails from the caller's point of view: recognizer errors
//! and timeouts degrade to an empty string, because an unreadable artifact is
//! still evidence. Images are handed to the recognizer whether or not the
//! local raster decoder understands the format (HEIC, TIFF, AVIF).

#[cfg(feature = "network")]
mod http;
mod progress;
mod static_text;

#[cfg(feature = "network")]
pub use http::{HttpOcrConfig, HttpOcrRecognizer};
pub use progress::ProgressReporter;
pub use static_text::StaticRecognizer;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{EvidenceFile, EvidenceKind, ImageDimensions};

/// Default upper bound on a single recognition call.
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// A source of text for one kind of evidence (OCR, document text, speech-to-text).
///
/// Implementations must be thread-safe (`Send + Sync`). Dropping the returned
/// future cancels the recognition.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize all text in `file`, preserving whitespace and line breaks.
    ///
    /// Returns an empty string when no text is found.
    async fn recognize(&self, file: &EvidenceFile, progress: &ProgressReporter) -> Result<String>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Output of [`TextExtractor::extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    /// Present when the file decoded locally as a raster image.
    pub dimensions: Option<ImageDimensions>,
}

/// Dispatches a file to the recognizer registered for its kind.
#[derive(Clone)]
pub struct TextExtractor {
    ocr: Option<Arc<dyn TextRecognizer>>,
    collaborators: HashMap<EvidenceKind, Arc<dyn TextRecognizer>>,
    timeout: Duration,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor {
    /// An extractor with no recognizers: every kind yields empty text.
    pub fn new() -> Self {
        Self {
            ocr: None,
            collaborators: HashMap::new(),
            timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }

    /// Use `recognizer` for images.
    pub fn with_ocr(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.ocr = Some(recognizer);
        self
    }

    /// Plug in a text source for a non-image kind.
    pub fn with_collaborator(
        mut self,
        kind: EvidenceKind,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Self {
        if kind == EvidenceKind::Image {
            self.ocr = Some(recognizer);
        } else {
            self.collaborators.insert(kind, recognizer);
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// Extract text from `file`, treating it as `kind`.
    pub async fn extract(
        &self,
        file: &EvidenceFile,
        kind: EvidenceKind,
        progress: &ProgressReporter,
    ) -> Extraction {
        let mut extraction = Extraction::default();

        let recognizer = match kind {
            EvidenceKind::Image => {
                extraction.dimensions = probe_raster(&file.bytes);
                self.ocr.as_ref()
            }
            other => self.collaborators.get(&other),
        };

        let Some(recognizer) = recognizer else {
            progress.finish();
            return extraction;
        };

        progress.report(0.0);
        let outcome = tokio::time::timeout(self.timeout, recognizer.recognize(file, progress)).await;

        extraction.text = match outcome {
            Ok(Ok(text)) => {
                tracing::debug!(
                    recognizer = recognizer.name(),
                    kind = %kind,
                    chars = text.len(),
                    "Text extracted"
                );
                text
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    recognizer = recognizer.name(),
                    kind = %kind,
                    error = %e,
                    "Text extraction failed, continuing with empty text"
                );
                String::new()
            }
            Err(_) => {
                tracing::warn!(
                    recognizer = recognizer.name(),
                    kind = %kind,
                    timeout_secs = self.timeout.as_secs(),
                    "Text extraction timed out, continuing with empty text"
                );
                String::new()
            }
        };

        progress.finish();
        extraction
    }
}

impl std::fmt::Debug for TextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut collaborators: Vec<_> = self
            .collaborators
            .iter()
            .map(|(kind, r)| (kind.as_str(), r.name()))
            .collect();
        collaborators.sort();
        f.debug_struct("TextExtractor")
            .field("ocr", &self.ocr.as_ref().map(|r| r.name()))
            .field("collaborators", &collaborators)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Decode locally to record dimensions. `None` for formats the decoder does
/// not support, which are still sent to OCR.
#[cfg(feature = "raster")]
fn probe_raster(bytes: &[u8]) -> Option<ImageDimensions> {
    use image::GenericImageView;

    match image::load_from_memory(bytes) {
        Ok(img) => {
            let (width, height) = img.dimensions();
            Some(ImageDimensions { width, height })
        }
        Err(e) => {
            tracing::debug!(error = %e, bytes = bytes.len(), "Image not decodable locally");
            None
        }
    }
}

#[cfg(not(feature = "raster"))]
fn probe_raster(_bytes: &[u8]) -> Option<ImageDimensions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SafecaseError;

    struct FailingRecognizer;

    #[async_trait]
    impl TextRecognizer for FailingRecognizer {
        async fn recognize(&self, _: &EvidenceFile, _: &ProgressReporter) -> Result<String> {
            Err(SafecaseError::ExtractionFailure("engine crashed".into()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct SlowRecognizer;

    #[async_trait]
    impl TextRecognizer for SlowRecognizer {
        async fn recognize(&self, _: &EvidenceFile, _: &ProgressReporter) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late".into())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[cfg(feature = "raster")]
    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([255, 255, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[cfg(feature = "raster")]
    #[tokio::test]
    async fn test_image_runs_ocr_and_records_dimensions() {
        let extractor =
            TextExtractor::new().with_ocr(Arc::new(StaticRecognizer::new("line one\nline two")));
        let file = EvidenceFile::new(png_bytes()).with_media_type("image/png");

        let out = extractor
            .extract(&file, EvidenceKind::Image, &ProgressReporter::disabled())
            .await;

        assert_eq!(out.text, "line one\nline two");
        assert_eq!(out.dimensions, Some(ImageDimensions { width: 4, height: 3 }));
    }

    #[tokio::test]
    async fn test_undecodable_image_still_reaches_ocr() {
        let extractor =
            TextExtractor::new().with_ocr(Arc::new(StaticRecognizer::new("I will kill you")));

        for media_type in ["image/heic", "image/tiff", "image/bmp"] {
            let file = EvidenceFile::new(b"\0\0\0\x18ftypheic opaque".to_vec())
                .with_media_type(media_type);

            let out = extractor
                .extract(&file, EvidenceKind::Image, &ProgressReporter::disabled())
                .await;

            assert_eq!(out.text, "I will kill you", "{media_type}");
            assert!(out.dimensions.is_none());
        }
    }

    #[cfg(feature = "raster")]
    #[tokio::test]
    async fn test_recognizer_failure_yields_empty_text() {
        let extractor = TextExtractor::new().with_ocr(Arc::new(FailingRecognizer));
        let file = EvidenceFile::new(png_bytes()).with_media_type("image/png");

        let out = extractor
            .extract(&file, EvidenceKind::Image, &ProgressReporter::disabled())
            .await;

        assert!(out.text.is_empty());
    }

    #[cfg(feature = "raster")]
    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_empty_text() {
        let extractor = TextExtractor::new()
            .with_ocr(Arc::new(SlowRecognizer))
            .with_timeout(Duration::from_secs(1));
        let file = EvidenceFile::new(png_bytes()).with_media_type("image/png");

        let out = extractor
            .extract(&file, EvidenceKind::Image, &ProgressReporter::disabled())
            .await;

        assert!(out.text.is_empty());
    }

    #[tokio::test]
    async fn test_document_without_collaborator_is_empty() {
        let extractor = TextExtractor::new().with_ocr(Arc::new(StaticRecognizer::new("ocr")));
        let file = EvidenceFile::new(b"%PDF-1.7".to_vec()).with_media_type("application/pdf");

        let out = extractor
            .extract(&file, EvidenceKind::Document, &ProgressReporter::disabled())
            .await;

        assert!(out.text.is_empty());
        assert!(out.dimensions.is_none());
    }

    #[tokio::test]
    async fn test_document_collaborator_supplies_text() {
        let extractor = TextExtractor::new().with_collaborator(
            EvidenceKind::Audio,
            Arc::new(StaticRecognizer::new("transcribed words")),
        );
        let file = EvidenceFile::new(vec![0u8; 16]).with_media_type("audio/wav");

        let out = extractor
            .extract(&file, EvidenceKind::Audio, &ProgressReporter::disabled())
            .await;

        assert_eq!(out.text, "transcribed words");
    }

    #[tokio::test]
    async fn test_progress_finishes_at_one() {
        let (progress, rx) = ProgressReporter::channel();
        let extractor = TextExtractor::new();
        let file = EvidenceFile::new(vec![1, 2, 3]).with_media_type("video/mp4");

        extractor.extract(&file, EvidenceKind::Video, &progress).await;

        assert_eq!(*rx.borrow(), 1.0);
    }
}
