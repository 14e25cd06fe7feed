//! Telemetry Module
//!
//! Counters over classifications served by the CLI and the API:
//! throughput, known-scam hits, heuristic flags, errors, tier
//! distribution and latency. No payload content is stored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::info;

use crate::models::{ClassificationResult, RiskTier, ScoringConfig};
use crate::utils::constants::TELEMETRY_DIR;

/// Snapshot of the collected counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub total_classified: u64,
    pub known_scams: u64,
    /// Heuristic probability above the scam-type threshold
    pub heuristic_flags: u64,
    pub errors: u64,
    pub errors_by_code: HashMap<String, u64>,
    pub risk_tiers: HashMap<String, u64>,
    pub avg_latency_ms: f64,
    pub period_start: i64,
    pub period_end: i64,
}

/// Thread-safe telemetry collector
pub struct TelemetryCollector {
    total_classified: AtomicU64,
    known_scams: AtomicU64,
    heuristic_flags: AtomicU64,
    errors: AtomicU64,
    total_latency_ms: AtomicU64,
    risk_tiers: RwLock<HashMap<RiskTier, u64>>,
    errors_by_code: RwLock<HashMap<String, u64>>,
    flag_threshold: f64,
    session_start: i64,
    export_dir: PathBuf,
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self::with_export_dir(PathBuf::from(TELEMETRY_DIR))
    }

    pub fn with_export_dir(export_dir: PathBuf) -> Self {
        Self {
            total_classified: AtomicU64::new(0),
            known_scams: AtomicU64::new(0),
            heuristic_flags: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            risk_tiers: RwLock::new(HashMap::new()),
            errors_by_code: RwLock::new(HashMap::new()),
            flag_threshold: ScoringConfig::default().scam_type_probability,
            session_start: chrono::Utc::now().timestamp(),
            export_dir,
        }
    }

    pub fn record_classification(&self, result: &ClassificationResult, latency_ms: u64) {
        self.total_classified.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if result.is_known_scam {
            self.known_scams.fetch_add(1, Ordering::Relaxed);
        } else if result.fraud_probability > self.flag_threshold {
            self.heuristic_flags.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut tiers) = self.risk_tiers.write() {
            *tiers.entry(result.risk_tier).or_insert(0) += 1;
        }
    }

    pub fn record_error(&self, code: &str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut codes) = self.errors_by_code.write() {
            *codes.entry(code.to_string()).or_insert(0) += 1;
        }
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let total = self.total_classified.load(Ordering::Relaxed);
        let latency = self.total_latency_ms.load(Ordering::Relaxed);
        let avg_latency_ms = if total > 0 {
            latency as f64 / total as f64
        } else {
            0.0
        };

        let risk_tiers = self
            .risk_tiers
            .read()
            .map(|tiers| {
                tiers
                    .iter()
                    .map(|(tier, count)| (tier.as_str().to_string(), *count))
                    .collect()
            })
            .unwrap_or_default();
        let errors_by_code = self
            .errors_by_code
            .read()
            .map(|codes| codes.clone())
            .unwrap_or_default();

        TelemetryStats {
            total_classified: total,
            known_scams: self.known_scams.load(Ordering::Relaxed),
            heuristic_flags: self.heuristic_flags.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            errors_by_code,
            risk_tiers,
            avg_latency_ms,
            period_start: self.session_start,
            period_end: chrono::Utc::now().timestamp(),
        }
    }

    /// Write the current stats to `<export_dir>/stats_<ts>.json`
    pub fn export_stats_json(&self) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(&self.export_dir)?;
        let stats = self.get_stats();
        let path = self
            .export_dir
            .join(format!("stats_{}.json", stats.period_end));
        let json = serde_json::to_string_pretty(&stats)?;
        fs::write(&path, json)?;
        info!("📊 Telemetry exported to {}", path.display());
        Ok(path)
    }

    pub fn reset(&self) {
        self.total_classified.store(0, Ordering::Relaxed);
        self.known_scams.store(0, Ordering::Relaxed);
        self.heuristic_flags.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.total_latency_ms.store(0, Ordering::Relaxed);
        if let Ok(mut tiers) = self.risk_tiers.write() {
            tiers.clear();
        }
        if let Ok(mut codes) = self.errors_by_code.write() {
            codes.clear();
        }
    }
}
