//! API Request Handlers

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::types::*;
use crate::core::service::ClassificationService;
use crate::models::{AppError, BatchOutcome};
use crate::report::rounded;
use crate::utils::cache::PayloadCache;
use crate::utils::constants::MAX_BATCH_SIZE;

type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub service: ClassificationService,
    /// Provider payload cache, when the provider has one
    pub cache: Option<PayloadCache>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: ClassificationService, cache: Option<PayloadCache>) -> Self {
        // Background task: cleanup expired cache entries every 60 seconds
        if let Some(cache) = cache.clone() {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
                loop {
                    interval.tick().await;
                    cache.cleanup_expired();
                }
            });
        }

        Self {
            service,
            cache,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn failure(err: &AppError, start: Instant) -> ApiFailure {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

fn bad_request(message: impl Into<String>, start: Instant) -> ApiFailure {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(
            ApiError::bad_request(message),
            elapsed_ms(start),
        )),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Classification
// ============================================

pub async fn classify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<ApiResponse<ClassifyData>>, ApiFailure> {
    let start = Instant::now();

    let identifier = req.identifier.trim();
    if identifier.is_empty() {
        return Err(bad_request("identifier must not be empty", start));
    }

    let outcome = match &req.payload {
        Some(payload) => state.service.classify_with_payload(identifier, payload),
        None => state.service.classify(identifier).await,
    };
    let result = outcome.map_err(|e| failure(&e, start))?;

    Ok(Json(ApiResponse::success(
        ClassifyData {
            result: rounded(&result),
        },
        elapsed_ms(start),
    )))
}

// ============================================
// Batch Classification
// ============================================

pub async fn classify_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchClassifyRequest>,
) -> Result<Json<ApiResponse<BatchClassifyData>>, ApiFailure> {
    let start = Instant::now();

    if req.identifiers.is_empty() {
        return Err(bad_request("identifiers must not be empty", start));
    }
    if req.identifiers.len() > MAX_BATCH_SIZE {
        return Err(bad_request(
            format!("Maximum {} identifiers per batch", MAX_BATCH_SIZE),
            start,
        ));
    }

    info!(
        "📦 Batch classification: {} identifiers, concurrency {}",
        req.identifiers.len(),
        req.concurrency
    );
    let outcomes = state
        .service
        .classify_many(&req.identifiers, req.concurrency)
        .await;

    let total_failed = outcomes.iter().filter(|o| o.is_error()).count();
    let known_scams = outcomes
        .iter()
        .filter_map(|o| o.result())
        .filter(|r| r.is_known_scam)
        .count();
    let results = outcomes
        .into_iter()
        .map(|o| match o {
            BatchOutcome::Success(r) => BatchOutcome::Success(Box::new(rounded(&r))),
            other => other,
        })
        .collect::<Vec<_>>();

    let data = BatchClassifyData {
        total_requested: req.identifiers.len(),
        total_succeeded: results.len() - total_failed,
        total_failed,
        known_scams,
        results,
        processing_time_ms: elapsed_ms(start),
    };

    Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let stats = state.service.telemetry().get_stats();
    let cache = state.cache.as_ref().map(|c| c.stats());

    if let Some(cache_stats) = &cache {
        info!(
            "📊 Cache Stats: {} entries, {:.1}% hit rate ({} hits / {} misses)",
            cache_stats.entries, cache_stats.hit_rate, cache_stats.hits, cache_stats.misses
        );
    }

    let classifier = state.service.classifier();
    let data = StatsData {
        total_classified: stats.total_classified,
        known_scams: stats.known_scams,
        heuristic_flags: stats.heuristic_flags,
        errors: stats.errors,
        risk_tiers: stats.risk_tiers,
        errors_by_code: stats.errors_by_code,
        avg_latency_ms: stats.avg_latency_ms,
        cache,
        registry_entries: classifier.registry().len(),
        scoring_version: classifier.config().version.clone(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
