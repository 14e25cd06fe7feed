//! Known-scam registry
//!
//! The engine only sees the `ScamRegistry` trait. Two backends:
//! - `InMemoryScamRegistry`: DashMap, for tests and embedding
//! - `JsonFileScamRegistry`: the `scam_indicators.json` document

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};

use crate::models::{AppError, AppResult, ErrorCode, ScamRecord};
use crate::utils::constants::{normalize_key, DEFAULT_RISK_MULTIPLIER};

/// Lookup/upsert interface over the known-scam registry
pub trait ScamRegistry: Send + Sync {
    /// Case-insensitive match across id, name and symbol variants
    fn lookup(&self, identifier: &str) -> Option<ScamRecord>;

    /// Insert or replace the record stored under `identifier`
    fn upsert(&self, identifier: &str, record: ScamRecord) -> AppResult<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared matching rules: exact key variants first, then name/symbol scan
fn match_record<'a, I>(records: I, identifier: &str) -> Option<ScamRecord>
where
    I: Iterator<Item = (&'a str, &'a ScamRecord)> + Clone,
{
    let lowered = identifier.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    let candidates = [normalize_key(identifier), lowered.clone(), identifier.to_string()];

    for key in &candidates {
        if let Some((_, record)) = records.clone().find(|(k, _)| *k == key.as_str()) {
            return Some(record.clone());
        }
    }

    records
        .filter(|(_, record)| {
            let name = record.name.as_deref().map(str::to_lowercase);
            let symbol = record.symbol.as_deref().map(str::to_lowercase);
            name.as_deref() == Some(lowered.as_str()) || symbol.as_deref() == Some(lowered.as_str())
        })
        .map(|(_, record)| record.clone())
        .next()
}

// ============================================
// In-memory backend
// ============================================

/// DashMap-backed registry
#[derive(Debug, Default)]
pub struct InMemoryScamRegistry {
    records: DashMap<String, ScamRecord>,
}

impl InMemoryScamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, ScamRecord)>,
    {
        let registry = Self::new();
        for (key, record) in records {
            registry.records.insert(key.to_lowercase(), record);
        }
        registry
    }
}

impl ScamRegistry for InMemoryScamRegistry {
    fn lookup(&self, identifier: &str) -> Option<ScamRecord> {
        let lowered = identifier.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        for key in [normalize_key(identifier), lowered] {
            if let Some(record) = self.records.get(&key) {
                return Some(record.value().clone());
            }
        }

        // Name/symbol scan in key order, same as the file backend
        let mut snapshot: Vec<(String, ScamRecord)> = self
            .records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        match_record(snapshot.iter().map(|(k, r)| (k.as_str(), r)), identifier)
    }

    fn upsert(&self, identifier: &str, record: ScamRecord) -> AppResult<()> {
        self.records.insert(identifier.to_lowercase(), record);
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

// ============================================
// JSON file backend
// ============================================

/// Market cap class with its risk multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCapThreshold {
    /// None = unbounded
    #[serde(default)]
    pub max_usd: Option<f64>,
    #[serde(default = "default_multiplier")]
    pub risk_multiplier: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

/// On-disk layout of `scam_indicators.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub known_scam_coins: BTreeMap<String, ScamRecord>,
    #[serde(default)]
    pub scam_type_definitions: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub red_flag_patterns: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub market_cap_thresholds: BTreeMap<String, MarketCapThreshold>,
}

impl RegistryDocument {
    /// Risk multiplier of the smallest class that contains `market_cap`
    pub fn risk_multiplier(&self, market_cap: f64) -> f64 {
        if market_cap <= 0.0 || self.market_cap_thresholds.is_empty() {
            return DEFAULT_RISK_MULTIPLIER;
        }
        let mut classes: Vec<&MarketCapThreshold> = self.market_cap_thresholds.values().collect();
        classes.sort_by(|a, b| {
            let a = a.max_usd.unwrap_or(f64::INFINITY);
            let b = b.max_usd.unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        });
        classes
            .into_iter()
            .find(|class| class.max_usd.map_or(true, |max| market_cap <= max))
            .map(|class| class.risk_multiplier)
            .unwrap_or(1.0)
    }
}

/// Registry persisted as a pretty-printed JSON document
#[derive(Debug)]
pub struct JsonFileScamRegistry {
    path: PathBuf,
    document: RwLock<RegistryDocument>,
}

impl JsonFileScamRegistry {
    /// Load the document; a missing file yields an empty registry
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                AppError::with_source(
                    ErrorCode::RegistryLoadFailed,
                    format!("Cannot read scam registry {}", path.display()),
                    e,
                )
            })?;
            let document: RegistryDocument = serde_json::from_str(&raw).map_err(|e| {
                AppError::with_source(
                    ErrorCode::RegistryLoadFailed,
                    format!("Malformed scam registry {}", path.display()),
                    e,
                )
            })?;
            info!(
                "🗂️ Scam registry loaded: {} known scams from {}",
                document.known_scam_coins.len(),
                path.display()
            );
            document
        } else {
            warn!(
                "⚠️ Scam registry not found at {}, starting empty",
                path.display()
            );
            RegistryDocument::default()
        };

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Definition of a scam type label, if the document has one
    pub fn scam_type_info(&self, scam_type: &str) -> Option<serde_json::Value> {
        self.read()
            .ok()?
            .scam_type_definitions
            .get(scam_type)
            .cloned()
    }

    pub fn risk_multiplier(&self, market_cap: f64) -> f64 {
        match self.read() {
            Ok(doc) => doc.risk_multiplier(market_cap),
            Err(_) => DEFAULT_RISK_MULTIPLIER,
        }
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, RegistryDocument>> {
        self.document
            .read()
            .map_err(|_| AppError::new(ErrorCode::RegistryLoadFailed, "Registry lock poisoned"))
    }

    fn store(&self, document: &RegistryDocument) -> AppResult<()> {
        let body = serde_json::to_string_pretty(document).map_err(|e| {
            AppError::with_source(ErrorCode::RegistryStoreFailed, "Cannot encode registry", e)
        })?;
        std::fs::write(&self.path, body).map_err(|e| {
            AppError::with_source(
                ErrorCode::RegistryStoreFailed,
                format!("Cannot write scam registry {}", self.path.display()),
                e,
            )
        })
    }
}

impl ScamRegistry for JsonFileScamRegistry {
    fn lookup(&self, identifier: &str) -> Option<ScamRecord> {
        let doc = self.read().ok()?;
        match_record(
            doc.known_scam_coins.iter().map(|(k, r)| (k.as_str(), r)),
            identifier,
        )
    }

    fn upsert(&self, identifier: &str, record: ScamRecord) -> AppResult<()> {
        let mut doc = self
            .document
            .write()
            .map_err(|_| AppError::new(ErrorCode::RegistryStoreFailed, "Registry lock poisoned"))?;
        // Memory only changes once the file write succeeded
        let mut updated = doc.clone();
        updated
            .known_scam_coins
            .insert(identifier.to_lowercase(), record);
        self.store(&updated)?;
        *doc = updated;
        info!("🗂️ Registry entry '{}' stored", identifier.to_lowercase());
        Ok(())
    }

    fn len(&self) -> usize {
        self.read().map(|doc| doc.known_scam_coins.len()).unwrap_or(0)
    }
}
