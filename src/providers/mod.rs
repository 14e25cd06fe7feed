//! Providers Module - External Data Sources
//!
//! Market data (CoinGecko or offline payloads) and the known-scam
//! registry. The engine depends on the traits only.

pub mod coingecko;
pub mod offline;
pub mod registry;

use async_trait::async_trait;

use crate::models::{AppResult, RawProjectPayload};

pub use coingecko::CoinGeckoClient;
pub use offline::OfflineProvider;
pub use registry::{InMemoryScamRegistry, JsonFileScamRegistry, ScamRegistry};

/// Source of raw project payloads.
/// Retries and backoff live here, never in the engine.
#[async_trait]
pub trait ProjectDataProvider: Send + Sync {
    /// Fails with `NotFound` for unknown identifiers
    async fn fetch(&self, identifier: &str) -> AppResult<RawProjectPayload>;
}
