//! CoinGecko API Client
//!
//! Fetches `/coins/{id}` plus `/coins/markets` and assembles the
//! `{basic_info, market_data, coin_id}` payload the normalizer reads.
//!
//! Request discipline:
//! 1. Minimum gap between requests (0.5s keyed, 6s public)
//! 2. HTTP 429 waits 65s + 30s per attempt, with ±20% jitter
//! 3. Transport / HTTP errors wait 10s before the next attempt
//! 4. Assembled payloads are cached with a TTL

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::normalizer::resolve_rank;
use crate::models::{AppConfig, AppError, AppResult, ErrorCode, Pacing, RawProjectPayload};
use crate::providers::ProjectDataProvider;
use crate::utils::cache::PayloadCache;
use crate::utils::constants::{
    to_coin_id, COINGECKO_KEY_HEADER, ERROR_RETRY_WAIT_MS, RATE_LIMIT_BASE_WAIT_MS,
    RATE_LIMIT_STEP_MS, RETRY_JITTER, USER_AGENT as USER_AGENT_CONST,
};

/// CoinGecko REST client
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    pacing: Pacing,
    last_request: Mutex<Option<Instant>>,
    cache: PayloadCache,
}

impl CoinGeckoClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        if let Some(key) = &config.coingecko_api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| AppError::invalid_config("COINGECKO_API_KEY is not a valid header"))?;
            headers.insert(COINGECKO_KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorCode::ConfigInvalidValue, "Failed to build HTTP client", e)
            })?;

        info!(
            "🌐 CoinGecko client ready ({}, gap {}ms, {} attempts)",
            config.coingecko_base_url,
            config.pacing.min_interval.as_millis(),
            config.pacing.max_attempts
        );

        Ok(Self {
            client,
            base_url: config.coingecko_base_url.trim_end_matches('/').to_string(),
            pacing: config.pacing,
            last_request: Mutex::new(None),
            cache: PayloadCache::with_ttl(config.cache_ttl),
        })
    }

    pub fn cache(&self) -> &PayloadCache {
        &self.cache
    }

    /// Hold the caller until the pacing gap since the last request has passed
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < self.pacing.min_interval {
                tokio::time::sleep(self.pacing.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// GET with retries. `Ok(None)` means HTTP 404.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> AppResult<Option<Value>> {
        let url = format!("{}{}", self.base_url, path);
        let attempts = self.pacing.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            self.pace().await;
            let is_last = attempt + 1 == attempts;

            let response = match self.client.get(&url).query(query).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!("⚠️ Request to {} failed (attempt {}/{}): {}", path, attempt + 1, attempts, e);
                    last_error = Some(AppError::from(e));
                    if !is_last {
                        tokio::time::sleep(jittered(ERROR_RETRY_WAIT_MS)).await;
                    }
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 {
                let wait = jittered(rate_limit_wait_ms(attempt));
                warn!(
                    "⏳ Rate limited (HTTP 429) on {} (attempt {}/{}), waiting {}s",
                    path,
                    attempt + 1,
                    attempts,
                    wait.as_secs()
                );
                last_error = Some(AppError::rate_limited(attempt + 1));
                if !is_last {
                    tokio::time::sleep(wait).await;
                }
                continue;
            }
            if status.as_u16() == 404 {
                debug!("📭 {} returned 404", path);
                return Ok(None);
            }
            if !status.is_success() {
                warn!("⚠️ HTTP {} from {} (attempt {}/{})", status, path, attempt + 1, attempts);
                last_error = Some(AppError::provider_failed(format!(
                    "HTTP {} from {}",
                    status, path
                )));
                if !is_last {
                    tokio::time::sleep(jittered(ERROR_RETRY_WAIT_MS)).await;
                }
                continue;
            }

            let body: Value = response.json().await?;
            return Ok(Some(body));
        }

        Err(last_error.unwrap_or_else(|| AppError::rate_limited(attempts)))
    }

    async fn coin_details(&self, coin_id: &str) -> AppResult<Option<Value>> {
        let path = format!("/coins/{}", coin_id);
        let details = self
            .get_json(
                &path,
                &[
                    ("localization", "false"),
                    ("tickers", "true"),
                    ("market_data", "true"),
                    ("community_data", "true"),
                    ("developer_data", "true"),
                    ("sparkline", "false"),
                ],
            )
            .await?;
        Ok(details.filter(|d| d.get("error").is_none()))
    }

    async fn search(&self, query: &str) -> AppResult<Option<String>> {
        let body = self.get_json("/search", &[("query", query)]).await?;
        Ok(body.as_ref().and_then(|b| pick_search_hit(query, b)))
    }

    async fn market_row(&self, coin_id: &str) -> AppResult<Value> {
        let body = self
            .get_json(
                "/coins/markets",
                &[
                    ("vs_currency", "usd"),
                    ("ids", coin_id),
                    ("order", "market_cap_desc"),
                    ("sparkline", "false"),
                    ("price_change_percentage", "1h,24h,7d,30d"),
                ],
            )
            .await?;
        Ok(body
            .and_then(|rows| rows.as_array().and_then(|r| r.first().cloned()))
            .unwrap_or_else(|| json!({})))
    }
}

#[async_trait]
impl ProjectDataProvider for CoinGeckoClient {
    async fn fetch(&self, identifier: &str) -> AppResult<RawProjectPayload> {
        if let Some(cached) = self.cache.get(identifier) {
            return Ok(cached);
        }

        info!("🔍 CoinGecko: resolving '{}'", identifier);
        let direct_id = to_coin_id(identifier);
        let (coin_id, details) = match self.coin_details(&direct_id).await? {
            Some(details) => (direct_id, details),
            None => {
                let found = self
                    .search(identifier)
                    .await?
                    .ok_or_else(|| AppError::not_found(identifier))?;
                let details = self
                    .coin_details(&found)
                    .await?
                    .ok_or_else(|| AppError::not_found(identifier))?;
                (found, details)
            }
        };

        let market = self.market_row(&coin_id).await?;
        let payload = build_payload(details, market, &coin_id);
        if resolve_rank(&payload).is_none() {
            return Err(AppError::data_incomplete(identifier));
        }

        self.cache.set(identifier, payload.clone());
        Ok(payload)
    }
}

/// Compose the payload layout the normalizer expects
pub fn build_payload(details: Value, market: Value, coin_id: &str) -> RawProjectPayload {
    json!({
        "basic_info": details,
        "market_data": market,
        "coin_id": coin_id,
    })
}

/// Exact id/name/symbol match from a `/search` body, else the first hit
pub fn pick_search_hit(query: &str, body: &Value) -> Option<String> {
    let coins = body.get("coins")?.as_array()?;
    let wanted = query.trim().to_lowercase();
    let field = |coin: &Value, key: &str| {
        coin.get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase()
    };

    let exact = coins.iter().find(|coin| {
        [field(coin, "id"), field(coin, "name"), field(coin, "symbol")].contains(&wanted)
    });
    exact
        .or_else(|| coins.first())
        .and_then(|coin| coin.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// 429 wait before jitter
pub fn rate_limit_wait_ms(attempt: u32) -> u64 {
    RATE_LIMIT_BASE_WAIT_MS + RATE_LIMIT_STEP_MS * attempt as u64
}

/// Apply ±`RETRY_JITTER` random jitter
fn jittered(base_ms: u64) -> Duration {
    let range = (base_ms as f64 * RETRY_JITTER) as i64;
    let jitter: i64 = if range > 0 {
        rand::thread_rng().gen_range(-range..=range)
    } else {
        0
    };
    Duration::from_millis((base_ms as i64 + jitter).max(100) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_prefers_exact_match() {
        let body = json!({"coins": [
            {"id": "bitcoin-cash", "name": "Bitcoin Cash", "symbol": "BCH"},
            {"id": "bitcoin", "name": "Bitcoin", "symbol": "BTC"}
        ]});
        assert_eq!(pick_search_hit("btc", &body), Some("bitcoin".to_string()));
        assert_eq!(pick_search_hit("Bitcoin", &body), Some("bitcoin".to_string()));
        assert_eq!(pick_search_hit("bitco", &body), Some("bitcoin-cash".to_string()));
    }

    #[test]
    fn test_search_without_hits() {
        assert_eq!(pick_search_hit("x", &json!({"coins": []})), None);
        assert_eq!(pick_search_hit("x", &json!({})), None);
    }

    #[test]
    fn test_build_payload_layout() {
        let payload = build_payload(
            json!({"name": "Bitcoin"}),
            json!({"market_cap_rank": 1}),
            "bitcoin",
        );
        assert_eq!(payload["coin_id"], "bitcoin");
        assert_eq!(payload["basic_info"]["name"], "Bitcoin");
        assert_eq!(resolve_rank(&payload), Some(1));
    }

    #[test]
    fn test_rate_limit_wait_grows() {
        assert_eq!(rate_limit_wait_ms(0), 65_000);
        assert_eq!(rate_limit_wait_ms(2), 125_000);
    }

    #[test]
    fn test_jitter_bounds() {
        for _ in 0..100 {
            let d = jittered(10_000).as_millis() as u64;
            assert!((8_000..=12_000).contains(&d));
        }
        assert_eq!(jittered(0), Duration::from_millis(100));
    }

    #[test]
    fn test_client_builds_from_config() {
        let config = AppConfig {
            coingecko_api_key: Some("demo-key".to_string()),
            ..Default::default()
        };
        assert!(CoinGeckoClient::new(&config).is_ok());
    }
}
