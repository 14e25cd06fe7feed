//! API Request/Response Types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{AppError, BatchOutcome, ClassificationResult, RawProjectPayload};
use crate::utils::cache::CacheStats;
use crate::utils::constants::DEFAULT_BATCH_CONCURRENCY;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "API_BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "API_RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: None,
        }
    }
}

// ============================================
// Classification
// ============================================

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub identifier: String,
    /// Classify this payload instead of fetching one
    #[serde(default)]
    pub payload: Option<RawProjectPayload>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyData {
    pub result: ClassificationResult,
}

// ============================================
// Batch Classification
// ============================================

#[derive(Debug, Deserialize)]
pub struct BatchClassifyRequest {
    pub identifiers: Vec<String>,
    /// Clamped to 1..=20
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    DEFAULT_BATCH_CONCURRENCY
}

#[derive(Debug, Serialize)]
pub struct BatchClassifyData {
    pub total_requested: usize,
    pub total_succeeded: usize,
    pub total_failed: usize,
    pub known_scams: usize,
    pub results: Vec<BatchOutcome>,
    pub processing_time_ms: f64,
}

// ============================================
// Stats / Telemetry
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub total_classified: u64,
    pub known_scams: u64,
    pub heuristic_flags: u64,
    pub errors: u64,
    pub risk_tiers: HashMap<String, u64>,
    pub errors_by_code: HashMap<String, u64>,
    pub avg_latency_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
    pub registry_entries: usize,
    pub scoring_version: String,
    pub uptime_seconds: u64,
    pub api_version: String,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
