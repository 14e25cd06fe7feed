//! API Middleware (Rate Limiting, Logging)

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::types::{ApiError, ApiResponse};
use crate::utils::constants::RATE_LIMIT_PER_MINUTE;

/// Rate limiter configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: RATE_LIMIT_PER_MINUTE,
            window_duration: Duration::from_secs(60),
        }
    }
}

/// Fixed-window in-memory rate limiter keyed by API key or client IP
pub struct RateLimiter {
    requests: DashMap<String, (u32, Instant)>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            requests: DashMap::new(),
            config,
        }
    }

    /// Returns (allowed, remaining, reset_seconds)
    pub fn check(&self, key: &str) -> (bool, u32, u64) {
        let now = Instant::now();

        let mut entry = self.requests.entry(key.to_string()).or_insert((0, now));

        // Reset window if expired
        if now.duration_since(entry.1) > self.config.window_duration {
            entry.0 = 0;
            entry.1 = now;
        }

        let reset_secs = self
            .config
            .window_duration
            .saturating_sub(now.duration_since(entry.1))
            .as_secs();

        if entry.0 >= self.config.requests_per_window {
            return (false, 0, reset_secs);
        }

        entry.0 += 1;
        let remaining = self.config.requests_per_window - entry.0;
        (true, remaining, reset_secs)
    }

    /// Drop windows idle for two periods
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let before = self.requests.len();
        self.requests.retain(|_, (_, started)| {
            now.duration_since(*started) < self.config.window_duration * 2
        });
        before.saturating_sub(self.requests.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

// Global rate limiter instance
lazy_static::lazy_static! {
    pub static ref RATE_LIMITER: Arc<RateLimiter> = Arc::new(RateLimiter::default());
}

/// Periodically purge stale rate-limit windows
pub fn start_cleanup_task() {
    tokio::spawn(async {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            let removed = RATE_LIMITER.cleanup();
            if removed > 0 {
                debug!("🧹 Rate limiter cleanup: {} stale keys removed", removed);
            }
        }
    });
}

fn is_health_path(path: &str) -> bool {
    path == "/health" || path == "/v1/health"
}

fn rate_key(headers: &HeaderMap) -> String {
    headers
        .get("x-api-key")
        .or_else(|| headers.get("x-forwarded-for"))
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(headers: HeaderMap, request: Request, next: Next) -> Response {
    if is_health_path(request.uri().path()) {
        return next.run(request).await;
    }

    let key = rate_key(&headers);
    let (allowed, remaining, reset) = RATE_LIMITER.check(&key);

    if !allowed {
        warn!(key = %key, "Rate limit exceeded");
        let body = ApiResponse::error(ApiError::rate_limited(reset), 0.0);
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("x-ratelimit-remaining", remaining.into());
    headers.insert("x-ratelimit-reset", reset.into());

    response
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    info!(
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_window() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: 3,
            window_duration: Duration::from_secs(60),
        });
        assert!(limiter.check("k").0);
        assert_eq!(limiter.check("k").1, 1);
        assert!(limiter.check("k").0);
        let (allowed, remaining, _) = limiter.check("k");
        assert!(!allowed);
        assert_eq!(remaining, 0);
        assert!(limiter.check("other").0);
    }

    #[test]
    fn test_cleanup_keeps_fresh_windows() {
        let limiter = RateLimiter::default();
        limiter.check("a");
        assert_eq!(limiter.cleanup(), 0);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_rate_key_prefers_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.1".parse().unwrap());
        assert_eq!(rate_key(&headers), "10.0.0.1");
        headers.insert("x-api-key", "pk_demo".parse().unwrap());
        assert_eq!(rate_key(&headers), "pk_demo");
        assert_eq!(rate_key(&HeaderMap::new()), "unknown");
    }
}
