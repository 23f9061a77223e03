//! Common utility functions shared across CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use safecase_core::{media_type_for_extension, Classification, ThreatLevel};

/// Outcome of a command that inspected content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    Harmful,
}

impl From<&Classification> for Verdict {
    fn from(classification: &Classification) -> Self {
        if classification.harm_detected {
            Self::Harmful
        } else {
            Self::Clean
        }
    }
}

/// Detect the media type from a file extension.
pub fn detect_media_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(media_type_for_extension)
        .unwrap_or("application/octet-stream")
}

/// Read a whole file, with the path in the error context.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Threat level colored by severity.
pub fn colored_level(level: ThreatLevel) -> ColoredString {
    let label = level.as_str().to_uppercase();
    match level {
        ThreatLevel::Critical => label.red().bold(),
        ThreatLevel::High => label.red(),
        ThreatLevel::Medium => label.yellow(),
        ThreatLevel::Low => label.blue(),
        ThreatLevel::None => label.green(),
    }
}

/// Print a classification block.
pub fn print_classification(classification: &Classification) {
    println!(
        "   {} {}",
        "Threat level:".dimmed(),
        colored_level(classification.threat_level)
    );
    if classification.matched_categories.is_empty() {
        println!("   {} {}", "Categories:".dimmed(), "none".green());
    } else {
        println!(
            "   {} {}",
            "Categories:".dimmed(),
            classification.matched_categories.join(", ").red()
        );
    }
}
