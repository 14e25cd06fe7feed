//! Coin Classifier CLI
//!
//! Classifies one or more crypto projects and prints a report.
//!
//! Usage:
//!   coin_classifier bitcoin
//!   coin_classifier bitcoin ethereum solana --format markdown
//!   coin_classifier mycoin --payload mycoin.json --format json
//!
//! Environment:
//!   COINGECKO_API_KEY  - Optional, raises the request budget
//!   SCAM_REGISTRY_PATH - Known-scam registry (default: scam_indicators.json)
//!   RUST_LOG           - Log level (default: info), logs go to stderr

use clap::Parser;
use coin_classifier::core::{ClassificationService, Classifier};
use coin_classifier::models::AppConfig;
use coin_classifier::providers::{
    CoinGeckoClient, JsonFileScamRegistry, OfflineProvider, ProjectDataProvider, ScamRegistry,
};
use coin_classifier::report::{self, ReportFormat};
use coin_classifier::utils::constants::{APP_NAME, APP_VERSION, DEFAULT_BATCH_CONCURRENCY};
use coin_classifier::TelemetryCollector;

use eyre::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "coin_classifier", version, about = "Crypto project risk/quality classifier")]
struct Cli {
    /// Project identifiers (CoinGecko id, name or symbol)
    #[arg(required = true)]
    identifiers: Vec<String>,

    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render a comparison table even for a single identifier
    #[arg(long)]
    batch: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Override SCAM_REGISTRY_PATH
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Classify a local JSON payload instead of fetching
    #[arg(long)]
    payload: Option<PathBuf>,

    /// Concurrent classifications in batch mode
    #[arg(long, default_value_t = DEFAULT_BATCH_CONCURRENCY)]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries only the report
    let default_level = if cli.quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    info!("🚀 {} v{}", APP_NAME, APP_VERSION);

    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.registry.clone() {
        config.registry_path = path;
    }

    let registry = Arc::new(JsonFileScamRegistry::open(&config.registry_path)?);
    let classifier = Classifier::new(registry.clone(), config.scoring_config()?)?;

    let provider: Arc<dyn ProjectDataProvider> = match &cli.payload {
        Some(path) => {
            if cli.identifiers.len() != 1 {
                bail!("--payload classifies exactly one identifier");
            }
            Arc::new(OfflineProvider::from_file(path, &cli.identifiers[0])?)
        }
        None => Arc::new(CoinGeckoClient::new(&config)?),
    };

    let telemetry = Arc::new(TelemetryCollector::new());
    let service = ClassificationService::new(classifier, provider, telemetry.clone());

    let rendered = if cli.batch || cli.identifiers.len() > 1 {
        let outcomes = service
            .classify_many(&cli.identifiers, cli.concurrency)
            .await;
        report::render_batch(&outcomes, cli.format)?
    } else {
        let result = service.classify(&cli.identifiers[0]).await?;
        let mut rendered = report::render(&result, cli.format)?;
        if result.is_known_scam {
            let section = registry
                .lookup(&cli.identifiers[0])
                .and_then(|record| record.scam_type)
                .and_then(|label| {
                    let definition = registry.scam_type_info(&label)?;
                    report::scam_type_section(&label, &definition, cli.format)
                });
            if let Some(section) = section {
                rendered.push('\n');
                rendered.push_str(&section);
            }
        }
        rendered
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            info!("💾 Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    let stats = telemetry.get_stats();
    info!(
        "📊 {} classified, {} known scams, {} errors, avg {:.1}ms",
        stats.total_classified, stats.known_scams, stats.errors, stats.avg_latency_ms
    );

    Ok(())
}
