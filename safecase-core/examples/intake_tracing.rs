//! Example demonstrating intake pipeline tracing.
//!
//! Run with: cargo run -p safecase-core --example intake_tracing
//!
//! Set ANALYSIS_SERVICE_URL to also exercise the remote analyzer.

use std::sync::Arc;

use safecase_core::{
    CaseService, EvidenceFile, EvidenceKind, HarmClassifier, HttpAnalyzerConfig,
    HttpRemoteAnalyzer, IngestionPipeline, MemoryBlobStore, MemoryRecordStore, NewCase,
    ProgressReporter, StaticRecognizer, TextExtractor,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with debug level
    fmt()
        .with_env_filter(EnvFilter::new("safecase_core=debug,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== SafeCase Intake Tracing Demo ===\n");

    let classifier = match HarmClassifier::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to build classifier: {}", e);
            return;
        }
    };

    // Documents "read" as a fixed message so the classifier has something to do
    let extractor = TextExtractor::new().with_collaborator(
        EvidenceKind::Document,
        Arc::new(StaticRecognizer::new(
            "Send the money by Friday or I'll post your photos. You'll regret this.",
        )),
    );

    let mut pipeline = IngestionPipeline::new(
        Arc::new(MemoryRecordStore::new()),
        Arc::new(MemoryBlobStore::default()),
        extractor,
        classifier,
    );

    if let Ok(url) = std::env::var("ANALYSIS_SERVICE_URL") {
        match HttpRemoteAnalyzer::new(HttpAnalyzerConfig::new(url)) {
            Ok(analyzer) => pipeline = pipeline.with_analyzer(Arc::new(analyzer)),
            Err(e) => eprintln!("Remote analyzer disabled: {}", e),
        }
    }

    let service = CaseService::new(pipeline);

    let case = match service
        .create_case(NewCase::new("demo-owner", "Demo case").with_platforms(["email"]))
        .await
    {
        Ok(case) => case,
        Err(e) => {
            eprintln!("Failed to create case: {}", e);
            return;
        }
    };

    println!("\nIngesting evidence...\n");

    let file = EvidenceFile::new(b"%PDF-1.7 demo".to_vec())
        .with_name("message.pdf")
        .with_media_type("application/pdf");

    match service
        .add_evidence("demo-owner", case.id, file, &ProgressReporter::disabled())
        .await
    {
        Ok(item) => {
            println!("\n✅ Ingested");
            println!("   Threat:     {}", item.threat_level);
            println!("   Categories: {}", item.matched_categories.join(", "));
            println!("   SHA3-256:   {}", item.metadata.sha3_256);
        }
        Err(e) => {
            println!("\n❌ Failed: {}", e);
        }
    }
}
