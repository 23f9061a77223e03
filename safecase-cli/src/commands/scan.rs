//! Scan command implementation.
//!
//! Detects a file's kind, extracts its text and classifies it, the same
//! way the intake pipeline does but without storing anything.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use safecase_core::{
    content_digest, EvidenceFile, EvidenceKind, HarmClassifier, HttpOcrConfig, HttpOcrRecognizer,
    ProgressReporter, SafecaseError, TextExtractor, TextRecognizer,
};
use serde_json::json;
use tracing::{debug, info};

use crate::utils::{detect_media_type, print_classification, read_file, Verdict};

/// Execute the scan command.
///
/// Images are sent to the OCR service when `ocr_url` is set; a failing
/// service is an error here rather than an empty result.
pub async fn execute(
    file: PathBuf,
    ocr_url: Option<String>,
    ocr_timeout: Duration,
    json: bool,
    quiet: bool,
) -> Result<Verdict> {
    let bytes = read_file(&file)?;
    info!(path = %file.display(), bytes = bytes.len(), "Read file");

    let media_type = detect_media_type(&file);
    let mut evidence = EvidenceFile::new(bytes).with_media_type(media_type);
    if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
        evidence = evidence.with_name(name);
    }
    if evidence.is_empty() {
        return Err(SafecaseError::InvalidInput(format!("File is empty: {}", file.display())).into());
    }

    let kind = evidence.kind();
    debug!(media_type, kind = %kind, "Detected evidence kind");

    let text = match (kind, ocr_url) {
        (EvidenceKind::Image, Some(url)) => recognize(&evidence, &url, ocr_timeout, quiet).await?,
        _ => {
            TextExtractor::new()
                .extract(&evidence, kind, &ProgressReporter::disabled())
                .await
                .text
        }
    };

    let classifier = HarmClassifier::new().context("Failed to build classifier")?;
    let classification = classifier.classify(&text);
    let digest = content_digest(&evidence.bytes);

    if json {
        let report = json!({
            "file": file.display().to_string(),
            "kind": kind.as_str(),
            "media_type": media_type,
            "bytes": evidence.bytes.len(),
            "sha3_256": digest,
            "extracted_text": text,
            "harm_detected": classification.harm_detected,
            "matched_categories": classification.matched_categories,
            "threat_level": classification.threat_level.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !quiet {
        println!();
        println!("{} {}", "Scanned:".bold(), file.display());
        println!("   {} {}", "Kind:".dimmed(), kind);
        println!("   {} {}", "SHA3-256:".dimmed(), &digest[..16]);
        if text.trim().is_empty() {
            println!("   {} {}", "Text:".dimmed(), "(no text)".dimmed());
        } else {
            println!("   {} {}", "Text:".dimmed(), text.trim());
        }
        print_classification(&classification);
    }

    Ok(Verdict::from(&classification))
}

async fn recognize(
    evidence: &EvidenceFile,
    url: &str,
    timeout: Duration,
    quiet: bool,
) -> Result<String> {
    let recognizer = HttpOcrRecognizer::new(HttpOcrConfig::new(url))?;

    let (progress, mut rx) = ProgressReporter::channel();
    if !quiet {
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let fraction = *rx.borrow_and_update();
                eprint!("\rOCR {:>3.0}%", fraction * 100.0);
            }
            eprintln!();
        });
    }

    let text = tokio::time::timeout(timeout, recognizer.recognize(evidence, &progress))
        .await
        .map_err(|_| {
            SafecaseError::ExtractionFailure(format!(
                "OCR service timed out after {}s",
                timeout.as_secs()
            ))
        })?
        .with_context(|| format!("OCR service unavailable at {url}"))?;

    progress.finish();
    Ok(text)
}
