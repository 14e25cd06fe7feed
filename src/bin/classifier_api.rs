//! Coin Classifier API Server
//!
//! REST API over the classification engine.
//!
//! Usage:
//!   cargo run --bin classifier_api
//!
//! Environment:
//!   CLASSIFIER_PORT    - Server port (default: 8080, PORT also honoured)
//!   CLASSIFIER_HOST    - Server host (default: 0.0.0.0)
//!   COINGECKO_API_KEY  - Optional provider key
//!   SCAM_REGISTRY_PATH - Known-scam registry file
//!   RUST_LOG           - Log level (default: info)

use coin_classifier::api::{create_router, start_cleanup_task, AppState};
use coin_classifier::core::{ClassificationService, Classifier};
use coin_classifier::models::AppConfig;
use coin_classifier::providers::{CoinGeckoClient, JsonFileScamRegistry};
use coin_classifier::utils::constants::{APP_NAME, APP_VERSION};
use coin_classifier::TelemetryCollector;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("🚀 {} API v{}", APP_NAME, APP_VERSION);

    let config = AppConfig::from_env()?;
    let registry = Arc::new(JsonFileScamRegistry::open(&config.registry_path)?);
    let classifier = Classifier::new(registry, config.scoring_config()?)?;

    let client = CoinGeckoClient::new(&config)?;
    let cache = client.cache().clone();

    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();
    let service = ClassificationService::new(classifier, Arc::new(client), telemetry);

    let state = Arc::new(AppState::new(service, Some(cache)));

    start_cleanup_task();
    info!("🧹 Background cleanup task started");

    let app = create_router(state);

    // PORT wins for hosted deployments
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", config.host, port).parse()?;

    info!("🌐 API listening on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /v1/classify        - Classify one project");
    info!("  POST /v1/classify/batch  - Batch classification (up to 100)");
    info!("  GET  /v1/stats           - Classification statistics");
    info!("  GET  /v1/health          - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received, exporting telemetry...");
    let stats = telemetry_for_shutdown.get_stats();
    info!("   Total classified: {}", stats.total_classified);
    info!("   Known scams:      {}", stats.known_scams);
    info!("   Errors:           {}", stats.errors);

    match telemetry_for_shutdown.export_stats_json() {
        Ok(path) => info!("   ✅ Stats exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }

    info!("👋 {} API shutdown complete", APP_NAME);
    Ok(())
}
