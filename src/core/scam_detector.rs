//! Scam Heuristic Detector
//!
//! Two paths, first match terminates:
//! 1. Registry lookup (identifier, then provider coin id, then name)
//! 2. Point-based heuristic over name, description and market figures

use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::normalizer::NormalizedFacts;
use crate::models::{ScamSignal, ScamType, ScoringConfig};
use crate::providers::registry::ScamRegistry;
use crate::utils::constants::{
    ATH_COLLAPSE_PCT, ATH_COLLAPSE_POINTS, ATH_CRASH_PCT, ATH_CRASH_POINTS, DEAD_VOLUME_POINTS,
    DEAD_VOLUME_USD, HYPE_NAME_TOKENS, HYPE_TOKEN_POINTS, LOW_RANK, MICRO_CAP_POINTS,
    MICRO_CAP_RANK, MICRO_CAP_USD, PONZI_PHRASES, RED_FLAG_PHRASES, RED_FLAG_PHRASE_POINTS,
    SMALL_CAP_POINTS, SMALL_CAP_USD, THIN_VOLUME_POINTS, THIN_VOLUME_USD,
};

pub const FLAG_ATH_COLLAPSE: &str = "Price dropped >99% from ATH";
pub const FLAG_DEAD_VOLUME: &str = "Extremely low trading volume";

/// Fraud detector over an injected registry
#[derive(Clone)]
pub struct ScamDetector {
    registry: Arc<dyn ScamRegistry>,
    max_probability: f64,
    scam_type_probability: f64,
}

impl ScamDetector {
    pub fn new(registry: Arc<dyn ScamRegistry>, config: &ScoringConfig) -> Self {
        Self {
            registry,
            max_probability: config.max_heuristic_probability,
            scam_type_probability: config.scam_type_probability,
        }
    }

    pub fn registry(&self) -> &Arc<dyn ScamRegistry> {
        &self.registry
    }

    /// Full detection for one project
    pub fn detect(&self, identifier: &str, facts: &NormalizedFacts) -> ScamSignal {
        if let Some(record) = self.registry.lookup(identifier) {
            warn!("🚨 Known scam matched: '{}'", identifier);
            return ScamSignal::known(record);
        }
        self.detect_by_payload(identifier, facts)
    }

    /// Detection for a project whose identifier already missed the registry:
    /// only the payload's coin id and name are looked up
    pub fn detect_by_payload(&self, identifier: &str, facts: &NormalizedFacts) -> ScamSignal {
        let candidates = [facts.coin_id.as_deref(), facts.name.as_deref()];
        for candidate in candidates.into_iter().flatten() {
            if candidate == identifier {
                continue;
            }
            if let Some(record) = self.registry.lookup(candidate) {
                warn!("🚨 Known scam matched: '{}' (via '{}')", identifier, candidate);
                return ScamSignal::known(record);
            }
        }
        self.heuristic(facts)
    }

    /// Point-based heuristic, never consults the registry
    pub fn heuristic(&self, facts: &NormalizedFacts) -> ScamSignal {
        let mut signal = ScamSignal::default();
        let mut points: u32 = 0;

        let name = facts.name.as_deref().unwrap_or("").to_lowercase();
        let description = facts.description.to_lowercase();

        for token in HYPE_NAME_TOKENS {
            if name.contains(token) {
                points += HYPE_TOKEN_POINTS;
                signal
                    .warnings
                    .push(format!("Name contains hype word: '{}'", token));
            }
        }

        for phrase in RED_FLAG_PHRASES {
            if description.contains(phrase) {
                points += RED_FLAG_PHRASE_POINTS;
                signal
                    .red_flags
                    .push(format!("Description contains red flag: '{}'", phrase));
            }
        }

        let has_market_cap = facts.market_cap > 0.0;

        if facts.rank > MICRO_CAP_RANK && has_market_cap {
            if facts.market_cap < MICRO_CAP_USD {
                points += MICRO_CAP_POINTS;
            } else if facts.market_cap < SMALL_CAP_USD {
                points += SMALL_CAP_POINTS;
            }
        }

        if facts.rank > LOW_RANK {
            if facts.ath_change_pct < ATH_COLLAPSE_PCT {
                points += ATH_COLLAPSE_POINTS;
                signal.red_flags.push(FLAG_ATH_COLLAPSE.to_string());
            } else if facts.ath_change_pct < ATH_CRASH_PCT {
                points += ATH_CRASH_POINTS;
            }

            if has_market_cap {
                if facts.volume_24h < DEAD_VOLUME_USD {
                    points += DEAD_VOLUME_POINTS;
                    signal.red_flags.push(FLAG_DEAD_VOLUME.to_string());
                } else if facts.volume_24h < THIN_VOLUME_USD {
                    points += THIN_VOLUME_POINTS;
                }
            }
        }

        signal.probability = (points as f64 / 100.0).min(self.max_probability);

        if signal.probability > self.scam_type_probability {
            signal.scam_type = if facts.ath_change_pct < ATH_COLLAPSE_PCT
                && facts.volume_24h < THIN_VOLUME_USD
            {
                ScamType::RugPull
            } else if PONZI_PHRASES.iter().any(|p| description.contains(p)) {
                ScamType::SuspectedPonzi
            } else {
                ScamType::PumpAndDump
            };
        }

        debug!(
            points,
            probability = signal.probability,
            scam_type = signal.scam_type.as_str(),
            "scam heuristic evaluated"
        );
        signal
    }
}
