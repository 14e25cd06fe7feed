//! Classifier - the engine's entry point
//!
//! Flow per project:
//! 1. Registry pre-check on the identifier (terminal)
//! 2. Normalize, reject payloads without a rank
//! 3. Scam detection (registry by coin id / name, then heuristic)
//! 4. Three analyzers, aggregation, mapping
//!
//! Pure and synchronous: no I/O beyond the injected registry.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::core::aggregator::Aggregator;
use crate::core::normalizer::{self, NormalizedFacts};
use crate::core::scam_detector::ScamDetector;
use crate::core::{economic, social, technical};
use crate::models::{
    probability_pct, AppError, AppResult, BatchOutcome, ClassificationResult, LetterGrade,
    MetricSets, ProjectCategory, RawProjectPayload, RiskTier, ScamRecord, ScamSignal, ScamType,
    ScoringConfig,
};
use crate::providers::registry::ScamRegistry;
use crate::utils::constants::KNOWN_SCAM_WARNING;

/// Classification engine over an injected registry and scoring config
#[derive(Clone)]
pub struct Classifier {
    detector: ScamDetector,
    aggregator: Aggregator,
    /// Fixed "now" for age computation; wall clock when None
    reference_time: Option<DateTime<Utc>>,
}

impl Classifier {
    /// Build a classifier; rejects invalid weights
    pub fn new(registry: Arc<dyn ScamRegistry>, config: ScoringConfig) -> AppResult<Self> {
        config.validate()?;
        info!(
            "🧮 Classifier ready (scoring {}, {} known scams)",
            config.version,
            registry.len()
        );
        Ok(Self {
            detector: ScamDetector::new(registry, &config),
            aggregator: Aggregator::new(config),
            reference_time: None,
        })
    }

    /// Pin the date used to turn genesis dates into ages
    pub fn with_reference_time(mut self, at: DateTime<Utc>) -> Self {
        self.reference_time = Some(at);
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        self.aggregator.config()
    }

    pub fn registry(&self) -> &Arc<dyn ScamRegistry> {
        self.detector.registry()
    }

    /// Registry-only pre-check, usable before any data is fetched
    pub fn check_known_scam(&self, identifier: &str) -> Option<ClassificationResult> {
        self.registry()
            .lookup(identifier)
            .map(|record| self.known_scam_report(identifier, None, record))
    }

    /// Normalized facts as the analyzers would see them
    pub fn normalize(&self, payload: &RawProjectPayload) -> NormalizedFacts {
        normalizer::normalize(payload, self.now())
    }

    /// Classify one project.
    ///
    /// Errors with `DataIncomplete` when the payload has no rank; every
    /// other missing field falls back to its default.
    pub fn classify(
        &self,
        identifier: &str,
        payload: &RawProjectPayload,
    ) -> AppResult<ClassificationResult> {
        let started = Instant::now();
        let result = self.evaluate(identifier, payload)?;

        info!(
            identifier,
            score = result.final_score,
            grade = result.letter_grade.as_str(),
            tier = result.risk_tier.as_str(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "classified"
        );
        Ok(result)
    }

    fn evaluate(
        &self,
        identifier: &str,
        payload: &RawProjectPayload,
    ) -> AppResult<ClassificationResult> {
        if let Some(report) = self.check_known_scam(identifier) {
            return Ok(report);
        }

        let facts = self.normalize(payload);
        if !facts.rank_resolved {
            return Err(AppError::data_incomplete(identifier));
        }

        // The raw identifier was already tried by the pre-check
        let signal = self.detector.detect_by_payload(identifier, &facts);
        if let Some(record) = signal.known_record.clone() {
            return Ok(self.known_scam_report(identifier, Some(&facts), record));
        }

        let metrics = MetricSets {
            technical: technical::analyze(&facts),
            economic: economic::analyze(&facts),
            social: social::analyze(&facts),
        };
        Ok(self.score(identifier, &facts, metrics, signal))
    }

    /// Classify many payloads; one failure never aborts the batch
    pub fn classify_batch(&self, items: &[(String, RawProjectPayload)]) -> Vec<BatchOutcome> {
        items
            .iter()
            .map(|(identifier, payload)| match self.classify(identifier, payload) {
                Ok(result) => BatchOutcome::Success(Box::new(result)),
                Err(e) => BatchOutcome::Error {
                    identifier: identifier.clone(),
                    code: e.code_str().to_string(),
                    message: e.message,
                },
            })
            .collect()
    }

    fn score(
        &self,
        identifier: &str,
        facts: &NormalizedFacts,
        metrics: MetricSets,
        signal: ScamSignal,
    ) -> ClassificationResult {
        let agg = &self.aggregator;
        let axes = agg.axis_scores(&metrics);
        let raw = agg.composite(&axes);
        let final_score = agg.apply_penalty(raw, signal.probability).clamp(0.0, 100.0);
        let (strengths, weaknesses) = agg.highlights(&metrics, &signal);

        ClassificationResult {
            identifier: identifier.to_string(),
            name: display_name(facts.name.as_deref(), identifier),
            symbol: display_symbol(facts.symbol.as_deref()),
            final_score,
            letter_grade: Aggregator::letter_grade(final_score),
            risk_tier: agg.risk_tier(final_score, &signal),
            category: Aggregator::category(facts, final_score),
            axis_scores: Some(axes),
            metric_sets: Some(metrics),
            is_known_scam: false,
            scam_type: signal.scam_type,
            fraud_probability: signal.probability,
            fraud_probability_pct: probability_pct(signal.probability),
            red_flags: signal.red_flags,
            warnings: signal.warnings,
            strengths,
            weaknesses,
            scam_description: None,
            collapse_date: None,
            estimated_losses: None,
            scoring_version: self.config().version.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Fixed-shape critical report carrying the record's own data
    fn known_scam_report(
        &self,
        identifier: &str,
        facts: Option<&NormalizedFacts>,
        record: ScamRecord,
    ) -> ClassificationResult {
        let name = record
            .name
            .clone()
            .or_else(|| facts.and_then(|f| f.name.clone()))
            .unwrap_or_else(|| identifier.to_string());
        let symbol = record
            .symbol
            .clone()
            .or_else(|| facts.and_then(|f| f.symbol.clone()));
        let final_score = record.score.unwrap_or(0.0).clamp(0.0, 100.0);
        let letter_grade = record
            .grade
            .as_deref()
            .and_then(LetterGrade::parse)
            .unwrap_or(LetterGrade::F);
        let scam_type = record
            .scam_type
            .as_deref()
            .map(ScamType::from_label)
            .unwrap_or(ScamType::Unknown);

        ClassificationResult {
            identifier: identifier.to_string(),
            name,
            symbol: display_symbol(symbol.as_deref()),
            final_score,
            letter_grade,
            risk_tier: RiskTier::Critical,
            category: ProjectCategory::Problematic,
            axis_scores: None,
            metric_sets: None,
            is_known_scam: true,
            scam_type,
            fraud_probability: 1.0,
            fraud_probability_pct: probability_pct(1.0),
            red_flags: record.red_flags,
            warnings: vec![KNOWN_SCAM_WARNING.to_string()],
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            scam_description: record.description,
            collapse_date: record.collapse_date,
            estimated_losses: record.estimated_losses,
            scoring_version: self.config().version.clone(),
            timestamp: Utc::now(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}

fn display_name(name: Option<&str>, identifier: &str) -> String {
    name.unwrap_or(identifier).to_string()
}

fn display_symbol(symbol: Option<&str>) -> String {
    symbol
        .map(str::to_uppercase)
        .unwrap_or_else(|| "???".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorCode;
    use crate::providers::registry::InMemoryScamRegistry;
    use chrono::TimeZone;
    use serde_json::json;

    fn classifier(registry: InMemoryScamRegistry) -> Classifier {
        Classifier::new(Arc::new(registry), ScoringConfig::default())
            .unwrap()
            .with_reference_time(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
    }

    fn terra() -> InMemoryScamRegistry {
        InMemoryScamRegistry::with_records([(
            "terra-luna".to_string(),
            ScamRecord {
                name: Some("Terra Luna".to_string()),
                symbol: Some("luna".to_string()),
                scam_type: Some("algorithmic_failure".to_string()),
                score: Some(140.0),
                grade: Some("f".to_string()),
                red_flags: vec!["Algorithmic stablecoin depeg".to_string()],
                description: Some("UST lost its peg".to_string()),
                collapse_date: Some("2022-05-09".to_string()),
                estimated_losses: Some(json!("$40B")),
            },
        )])
    }

    #[test]
    fn test_known_scam_report_shape() {
        let result = classifier(terra()).check_known_scam("Terra Luna").unwrap();
        assert!(result.is_known_scam);
        assert_eq!(result.symbol, "LUNA");
        assert_eq!(result.final_score, 100.0);
        assert_eq!(result.letter_grade, LetterGrade::F);
        assert_eq!(result.risk_tier, RiskTier::Critical);
        assert_eq!(result.category, ProjectCategory::Problematic);
        assert_eq!(result.scam_type, ScamType::AlgorithmicFailure);
        assert_eq!(result.fraud_probability, 1.0);
        assert_eq!(result.warnings, vec![KNOWN_SCAM_WARNING.to_string()]);
        assert!(result.axis_scores.is_none());
        assert!(result.metric_sets.is_none());
        assert_eq!(result.collapse_date.as_deref(), Some("2022-05-09"));
    }

    #[test]
    fn test_known_scam_bypasses_missing_rank() {
        let result = classifier(terra()).classify("terra-luna", &json!({})).unwrap();
        assert!(result.is_known_scam);
    }

    #[test]
    fn test_missing_rank_is_data_incomplete() {
        let err = classifier(InMemoryScamRegistry::new())
            .classify("mystery", &json!({"basic_info": {"name": "Mystery"}}))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DataIncomplete);
        assert!(err.message.contains("mystery"));
    }

    #[test]
    fn test_defaults_name_and_symbol() {
        let result = classifier(InMemoryScamRegistry::new())
            .classify("plain-coin", &json!({"market_data": {"market_cap_rank": 400}}))
            .unwrap();
        assert_eq!(result.name, "plain-coin");
        assert_eq!(result.symbol, "???");
        assert!(result.axis_scores.is_some());
    }

    #[test]
    fn test_batch_isolates_errors() {
        let c = classifier(terra());
        let items = vec![
            ("good".to_string(), json!({"market_data": {"market_cap_rank": 30}})),
            ("bad".to_string(), json!({})),
            ("terra-luna".to_string(), json!({})),
        ];
        let outcomes = c.classify_batch(&items);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result().is_some());
        match &outcomes[1] {
            BatchOutcome::Error { identifier, code, .. } => {
                assert_eq!(identifier, "bad");
                assert_eq!(code, "CLASSIFY_DATA_INCOMPLETE");
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert!(outcomes[2].result().is_some_and(|r| r.is_known_scam));
    }

    /// Registry that records every lookup key
    struct CountingRegistry {
        inner: InMemoryScamRegistry,
        keys: std::sync::Mutex<Vec<String>>,
    }

    impl ScamRegistry for CountingRegistry {
        fn lookup(&self, identifier: &str) -> Option<ScamRecord> {
            self.keys.lock().unwrap().push(identifier.to_string());
            self.inner.lookup(identifier)
        }

        fn upsert(&self, identifier: &str, record: ScamRecord) -> AppResult<()> {
            self.inner.upsert(identifier, record)
        }

        fn len(&self) -> usize {
            self.inner.len()
        }
    }

    #[test]
    fn test_identifier_looked_up_once() {
        let registry = Arc::new(CountingRegistry {
            inner: InMemoryScamRegistry::new(),
            keys: std::sync::Mutex::new(Vec::new()),
        });
        let c = Classifier::new(registry.clone(), ScoringConfig::default()).unwrap();
        c.classify(
            "plain-coin",
            &json!({
                "coin_id": "plain-coin",
                "basic_info": {"name": "Plain"},
                "market_data": {"market_cap_rank": 400}
            }),
        )
        .unwrap();

        let keys = registry.keys.lock().unwrap().clone();
        assert_eq!(keys, vec!["plain-coin".to_string(), "Plain".to_string()]);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_summary_logged_at_info() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            classifier(InMemoryScamRegistry::new())
                .classify("plain-coin", &json!({"market_data": {"market_cap_rank": 400}}))
                .unwrap();
        });

        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("INFO"));
        assert!(logs.contains("classified"));
        assert!(logs.contains("plain-coin"));
    }

    #[test]
    fn test_payload_name_still_matches_registry() {
        let result = classifier(terra())
            .classify(
                "ust-fork",
                &json!({"basic_info": {"name": "Terra Luna"}, "market_data": {"market_cap_rank": 900}}),
            )
            .unwrap();
        assert!(result.is_known_scam);
        assert_eq!(result.scam_type, ScamType::AlgorithmicFailure);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ScoringConfig::default();
        config.axis_weights.technical = 0.9;
        assert!(Classifier::new(Arc::new(InMemoryScamRegistry::new()), config).is_err());
    }
}
