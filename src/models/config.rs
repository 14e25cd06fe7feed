//! Configuration module for the project classifier
//!
//! Two layers:
//! - `ScoringConfig`: versioned weights and thresholds handed to the aggregator
//! - `AppConfig`: runtime settings for the binaries, read from the environment

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{EconomicMetrics, SocialMetrics, TechnicalMetrics};
use crate::utils::constants::{
    COINGECKO_BASE_URL, DEFAULT_CACHE_TTL_SECS, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_REGISTRY_PATH, DEFAULT_REQUEST_TIMEOUT_SECS, KEYED_MAX_ATTEMPTS, KEYED_PACING_MS,
    PUBLIC_MAX_ATTEMPTS, PUBLIC_PACING_MS, SCORING_VERSION,
};

/// Tolerance when checking that a weight table sums to 1.0
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

// ============================================
// Scoring configuration
// ============================================

/// Weights of the three axes in the composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisWeights {
    pub technical: f64,
    pub economic: f64,
    pub social: f64,
}

impl Default for AxisWeights {
    fn default() -> Self {
        Self {
            technical: 0.40,
            economic: 0.35,
            social: 0.25,
        }
    }
}

/// Sub-metric weights per axis, in the order of each metric set's `NAMES`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubMetricWeights {
    pub technical: [f64; 6],
    pub economic: [f64; 7],
    pub social: [f64; 7],
}

impl Default for SubMetricWeights {
    fn default() -> Self {
        Self {
            technical: [0.15, 0.18, 0.22, 0.22, 0.13, 0.10],
            economic: [0.18, 0.12, 0.15, 0.20, 0.15, 0.12, 0.08],
            social: [0.22, 0.18, 0.18, 0.15, 0.10, 0.08, 0.09],
        }
    }
}

/// Everything the aggregator needs to turn metric sets into a classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Version tag stamped on every result
    pub version: String,
    pub axis_weights: AxisWeights,
    pub sub_metric_weights: SubMetricWeights,
    /// final = raw * (1 - factor * probability)
    pub fraud_penalty_factor: f64,
    /// Heuristic probability above which the tier is forced to Critical
    pub critical_probability: f64,
    /// Upper bound of the heuristic probability
    pub max_heuristic_probability: f64,
    /// Heuristic probability above which a scam type is assigned
    pub scam_type_probability: f64,
    /// Max entries in each of strengths / weaknesses
    pub max_highlights: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            version: SCORING_VERSION.to_string(),
            axis_weights: AxisWeights::default(),
            sub_metric_weights: SubMetricWeights::default(),
            fraud_penalty_factor: 0.5,
            critical_probability: 0.8,
            max_heuristic_probability: 0.95,
            scam_type_probability: 0.6,
            max_highlights: 7,
        }
    }
}

impl ScoringConfig {
    /// Load from a JSON document; absent keys keep their defaults
    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigInvalidValue,
                format!("Cannot read scoring config {}", path.display()),
                e,
            )
        })?;
        let config: ScoringConfig = serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigInvalidValue,
                format!("Malformed scoring config {}", path.display()),
                e,
            )
        })?;
        config.validate()?;
        info!(
            "⚖️ Scoring config '{}' loaded from {}",
            config.version,
            path.display()
        );
        Ok(config)
    }

    /// Check weight sums, signs and probability bounds
    pub fn validate(&self) -> AppResult<()> {
        let axes = [
            self.axis_weights.technical,
            self.axis_weights.economic,
            self.axis_weights.social,
        ];
        check_weights("axis", &axes)?;
        check_weights("technical", &self.sub_metric_weights.technical)?;
        check_weights("economic", &self.sub_metric_weights.economic)?;
        check_weights("social", &self.sub_metric_weights.social)?;

        for (name, value) in [
            ("fraud_penalty_factor", self.fraud_penalty_factor),
            ("critical_probability", self.critical_probability),
            ("max_heuristic_probability", self.max_heuristic_probability),
            ("scam_type_probability", self.scam_type_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::invalid_config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Weighted technical axis score in [0, 100]
    pub fn technical_score(&self, metrics: &TechnicalMetrics) -> f64 {
        weighted_axis(&metrics.values(), &self.sub_metric_weights.technical)
    }

    /// Weighted economic axis score in [0, 100]
    pub fn economic_score(&self, metrics: &EconomicMetrics) -> f64 {
        weighted_axis(&metrics.values(), &self.sub_metric_weights.economic)
    }

    /// Weighted social axis score in [0, 100]
    pub fn social_score(&self, metrics: &SocialMetrics) -> f64 {
        weighted_axis(&metrics.values(), &self.sub_metric_weights.social)
    }
}

fn check_weights(table: &str, weights: &[f64]) -> AppResult<()> {
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(AppError::invalid_weights(format!(
            "{} weights contain an invalid entry: {}",
            table, w
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(AppError::invalid_weights(format!(
            "{} weights sum to {}, expected 1.0",
            table, sum
        )));
    }
    Ok(())
}

/// Σ(score × weight) × 10
fn weighted_axis(scores: &[f64], weights: &[f64]) -> f64 {
    scores
        .iter()
        .zip(weights)
        .map(|(score, weight)| score * weight)
        .sum::<f64>()
        * 10.0
}

// ============================================
// Runtime configuration
// ============================================

/// Request pacing for the market data provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    /// Minimum gap between two outgoing requests
    pub min_interval: Duration,
    pub max_attempts: u32,
}

impl Pacing {
    /// Keyed clients get a tighter gap and more attempts
    pub fn for_key(api_key: Option<&str>) -> Self {
        match api_key {
            Some(_) => Self {
                min_interval: Duration::from_millis(KEYED_PACING_MS),
                max_attempts: KEYED_MAX_ATTEMPTS,
            },
            None => Self {
                min_interval: Duration::from_millis(PUBLIC_PACING_MS),
                max_attempts: PUBLIC_MAX_ATTEMPTS,
            },
        }
    }
}

/// Runtime configuration for the CLI and the API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub coingecko_api_key: Option<String>,
    pub coingecko_base_url: String,
    pub registry_path: PathBuf,
    pub scoring_config_path: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub pacing: Pacing,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            coingecko_api_key: None,
            coingecko_base_url: COINGECKO_BASE_URL.to_string(),
            registry_path: PathBuf::from(DEFAULT_REGISTRY_PATH),
            scoring_config_path: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            pacing: Pacing::for_key(None),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Build from environment variables
    /// The API key is NEVER logged
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let coingecko_api_key = env_non_empty("COINGECKO_API_KEY");
        if coingecko_api_key.is_some() {
            info!("🔑 COINGECKO_API_KEY configured (key hidden)");
        } else {
            warn!("⚠️ COINGECKO_API_KEY not set, using public rate limits");
        }

        let cache_ttl = match env_non_empty("CLASSIFIER_CACHE_TTL_SECS") {
            Some(raw) => Duration::from_secs(parse_env("CLASSIFIER_CACHE_TTL_SECS", &raw)?),
            None => defaults.cache_ttl,
        };
        let port = match env_non_empty("CLASSIFIER_PORT") {
            Some(raw) => parse_env("CLASSIFIER_PORT", &raw)?,
            None => defaults.port,
        };

        Ok(Self {
            pacing: Pacing::for_key(coingecko_api_key.as_deref()),
            coingecko_api_key,
            coingecko_base_url: env_non_empty("COINGECKO_BASE_URL")
                .unwrap_or(defaults.coingecko_base_url),
            registry_path: env_non_empty("SCAM_REGISTRY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.registry_path),
            scoring_config_path: env_non_empty("SCORING_CONFIG_PATH").map(PathBuf::from),
            cache_ttl,
            request_timeout: defaults.request_timeout,
            host: env_non_empty("CLASSIFIER_HOST").unwrap_or(defaults.host),
            port,
        })
    }

    /// Scoring config from `scoring_config_path`, or the built-in default
    pub fn scoring_config(&self) -> AppResult<ScoringConfig> {
        match &self.scoring_config_path {
            Some(path) => ScoringConfig::from_json_file(path),
            None => Ok(ScoringConfig::default()),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::invalid_config(format!("{} has invalid value '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());

        let subs = config.sub_metric_weights;
        for table in [&subs.technical[..], &subs.economic[..], &subs.social[..]] {
            let sum: f64 = table.iter().sum();
            assert!((sum - 1.0).abs() < WEIGHT_TOLERANCE);
        }
    }

    #[test]
    fn test_rejects_bad_axis_weights() {
        let mut config = ScoringConfig::default();
        config.axis_weights.social = 0.30;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidWeights);
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut config = ScoringConfig::default();
        config.sub_metric_weights.technical = [0.35, 0.18, 0.22, 0.22, 0.13, -0.10];
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidWeights);
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        let config = ScoringConfig {
            critical_probability: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ScoringConfig =
            serde_json::from_str(r#"{"version": "experiment-1", "max_highlights": 5}"#).unwrap();
        assert_eq!(config.version, "experiment-1");
        assert_eq!(config.max_highlights, 5);
        assert_eq!(config.axis_weights, AxisWeights::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_axis_score_all_tens() {
        let config = ScoringConfig::default();
        let metrics = TechnicalMetrics {
            code_availability: 10.0,
            architecture_quality: 10.0,
            decentralization: 10.0,
            security: 10.0,
            audit_status: 10.0,
            contract_risk: 10.0,
        };
        assert!((config.technical_score(&metrics) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pacing_for_key() {
        assert_eq!(Pacing::for_key(Some("k")).max_attempts, KEYED_MAX_ATTEMPTS);
        assert_eq!(Pacing::for_key(None).max_attempts, PUBLIC_MAX_ATTEMPTS);
        assert!(Pacing::for_key(None).min_interval > Pacing::for_key(Some("k")).min_interval);
    }
}
