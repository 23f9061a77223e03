//! SafeCase CLI - Classify text and evidence files for online-abuse harm.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use safecase_core::{SupportCategory, ThreatLevel};
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::{ExitCode, SUCCESS, USAGE_ERROR};
use utils::Verdict;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   No harmful content detected
  1   General error
  2   Harmful content detected
  64  Usage error
  66  Input file missing, unreadable or empty
  69  OCR service unavailable";

#[derive(Parser)]
#[command(name = "safecase")]
#[command(author, version, about = "Evidence classification for online-abuse cases", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Suppress human-readable output (exit code only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify text for harm categories and threat level
    Classify {
        /// Text to classify ("-" reads stdin)
        #[arg(value_name = "TEXT", required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect a file's kind, extract its text and classify it
    Scan {
        /// Evidence file to scan
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// OCR service base URL used for images
        #[arg(long, value_name = "URL", value_parser = parse_service_url)]
        ocr_url: Option<String>,

        /// Upper bound on the OCR call in seconds
        #[arg(long, value_name = "SECS", default_value_t = 60)]
        ocr_timeout: u64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List support resources
    Support {
        /// Only resources of this category (emergency, police, medical, counseling, legal)
        #[arg(short, long, value_name = "CATEGORY")]
        category: Option<SupportCategory>,

        /// Recommend resources for a threat level (none, low, medium, high, critical)
        #[arg(short, long, value_name = "LEVEL", conflicts_with = "category")]
        threat_level: Option<ThreatLevel>,

        /// Print the resources as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Accept only absolute http(s) URLs.
fn parse_service_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(format!("'{raw}' is not an http(s) URL"))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "safecase_cli=debug,safecase_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { USAGE_ERROR } else { SUCCESS };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);
    let quiet = cli.quiet;

    let result = match cli.command {
        Commands::Classify { text, file, json } => {
            commands::classify::execute(text, file, json, quiet)
        }
        Commands::Scan {
            file,
            ocr_url,
            ocr_timeout,
            json,
        } => {
            commands::scan::execute(file, ocr_url, Duration::from_secs(ocr_timeout), json, quiet)
                .await
        }
        Commands::Support {
            category,
            threat_level,
            json,
        } => commands::support::execute(category, threat_level, json).map(|()| Verdict::Clean),
    };

    let exit = match result {
        Ok(Verdict::Clean) => ExitCode::success(),
        Ok(Verdict::Harmful) => ExitCode::harm_detected(),
        Err(e) => ExitCode::from_anyhow(&e),
    };

    if let Some(message) = &exit.message {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
    std::process::exit(exit.code);
}
