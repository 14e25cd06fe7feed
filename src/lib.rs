//! Coin Classifier Library
//!
//! Composite risk/quality classification of crypto projects:
//! - Technical, economic and social scoring from market payloads
//! - Known-scam registry lookups and heuristic fraud signals
//! - Fraud-penalised final score mapped to grade, risk tier and category

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod report;
pub mod utils;

pub use crate::core::{ClassificationService, Classifier, NormalizedFacts};
pub use models::{
    AppConfig, AppError, AppResult, BatchOutcome, ClassificationResult, ErrorCode,
    LetterGrade, ProjectCategory, RawProjectPayload, RiskTier, ScamRecord, ScamSignal, ScamType,
    ScoringConfig,
};
pub use providers::{
    CoinGeckoClient, InMemoryScamRegistry, JsonFileScamRegistry, OfflineProvider,
    ProjectDataProvider, ScamRegistry,
};
pub use report::ReportFormat;
pub use utils::telemetry::{TelemetryCollector, TelemetryStats};
