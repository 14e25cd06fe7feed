//! Offline provider
//!
//! Serves payloads from memory or from a JSON file instead of the
//! network. Used by `--payload` on the CLI, by the API when a request
//! carries its own payload, and by tests.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::path::Path;
use tracing::info;

use crate::models::{AppError, AppResult, ErrorCode, RawProjectPayload};
use crate::providers::ProjectDataProvider;
use crate::utils::constants::to_coin_id;

#[derive(Debug, Default)]
pub struct OfflineProvider {
    payloads: DashMap<String, RawProjectPayload>,
}

impl OfflineProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, identifier: &str, payload: RawProjectPayload) {
        self.payloads.insert(to_coin_id(identifier), payload);
    }

    /// Load a file holding one payload or an `{identifier: payload}` map.
    /// A single payload is stored under `default_identifier`.
    pub fn from_file(path: &Path, default_identifier: &str) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::ProviderRequestFailed,
                format!("Cannot read payload file {}", path.display()),
                e,
            )
        })?;
        let document: Value = serde_json::from_str(&raw)?;
        let provider = Self::new();

        let looks_like_payload = document.get("basic_info").is_some()
            || document.get("market_data").is_some()
            || document.get("coin_id").is_some();

        match document {
            Value::Object(map) if !looks_like_payload => {
                for (identifier, payload) in map {
                    provider.insert(&identifier, payload);
                }
            }
            single => provider.insert(default_identifier, single),
        }

        info!(
            "📄 Loaded {} offline payload(s) from {}",
            provider.payloads.len(),
            path.display()
        );
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

#[async_trait]
impl ProjectDataProvider for OfflineProvider {
    async fn fetch(&self, identifier: &str) -> AppResult<RawProjectPayload> {
        self.payloads
            .get(&to_coin_id(identifier))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(identifier))
    }
}
