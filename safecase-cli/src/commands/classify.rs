//! Classify command implementation.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use safecase_core::HarmClassifier;
use tracing::info;

use crate::utils::{print_classification, read_file, Verdict};

/// Execute the classify command.
///
/// Text comes from the argument, from `--file`, or from stdin when the
/// argument is `-`.
pub fn execute(
    text: Option<String>,
    file: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<Verdict> {
    let text = match (text, file) {
        (_, Some(path)) => {
            let bytes = read_file(&path)?;
            info!(path = %path.display(), bytes = bytes.len(), "Read file");
            String::from_utf8_lossy(&bytes).into_owned()
        }
        (Some(text), None) if text == "-" => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
        (Some(text), None) => text,
        // clap requires one of the two
        (None, None) => String::new(),
    };

    let classifier = HarmClassifier::new().context("Failed to build classifier")?;
    let classification = classifier.classify(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
    } else if !quiet {
        println!();
        if classification.harm_detected {
            println!("{}", "Harmful content detected".red().bold());
        } else {
            println!("{}", "No harmful content detected".green().bold());
        }
        print_classification(&classification);
    }

    Ok(Verdict::from(&classification))
}
