//! SafeCase Server - REST API for evidence intake and threat analysis
//!
//! Exposes safecase-core over HTTP:
//! - /api/v1/cases - Case management, evidence upload, timeline and export
//! - /api/v1/classify - Classify free text
//! - /api/v1/support - Support resources and recommendations

use std::net::SocketAddr;

use safecase_server::{create_router_with_config, AppState, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("safecase_server=info,safecase_core=info,tower_http=info")),
        )
        .init();

    println!("╔════════════════════════════════════════════╗");
    println!("║       SafeCase Evidence API v{:<14}║", env!("CARGO_PKG_VERSION"));
    println!("║    Evidence Intake & Threat Analysis       ║");
    println!("╚════════════════════════════════════════════╝");

    let config = Config::from_env();
    let state = AppState::from_config(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize application state");
        e
    })?;

    let app = create_router_with_config(&config, state);

    let addr = config.socket_addr();
    println!("\nListening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  POST /api/v1/cases                  - Create case (x-owner-id header)");
    println!("  POST /api/v1/cases/{{id}}/evidence    - Upload evidence (multipart: file)");
    println!("  GET  /api/v1/cases/{{id}}/timeline    - Case timeline");
    println!("  GET  /api/v1/cases/{{id}}/export      - Case report (?format=text|json)");
    println!("  POST /api/v1/classify               - Classify text");
    println!("  GET  /api/v1/support                - Support resources");
    println!("  GET  /blobs/{{case}}/{{file}}            - Stored evidence file");
    println!("  GET  /health                        - Health check");
    println!("  GET  /swagger-ui                    - API documentation");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
