//! Classification service
//!
//! Async composition used by the CLI and the API:
//! registry pre-check → provider fetch → classify, with telemetry.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::core::classifier::Classifier;
use crate::models::{AppError, AppResult, BatchOutcome, ClassificationResult, RawProjectPayload};
use crate::providers::ProjectDataProvider;
use crate::utils::constants::MAX_BATCH_CONCURRENCY;
use crate::utils::telemetry::TelemetryCollector;

#[derive(Clone)]
pub struct ClassificationService {
    classifier: Arc<Classifier>,
    provider: Arc<dyn ProjectDataProvider>,
    telemetry: Arc<TelemetryCollector>,
}

impl ClassificationService {
    pub fn new(
        classifier: Classifier,
        provider: Arc<dyn ProjectDataProvider>,
        telemetry: Arc<TelemetryCollector>,
    ) -> Self {
        Self {
            classifier: Arc::new(classifier),
            provider,
            telemetry,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn telemetry(&self) -> &Arc<TelemetryCollector> {
        &self.telemetry
    }

    /// Classify by identifier. Known scams never reach the provider.
    pub async fn classify(&self, identifier: &str) -> AppResult<ClassificationResult> {
        let start = Instant::now();

        if let Some(report) = self.classifier.check_known_scam(identifier) {
            info!("🚨 '{}' is a registered scam, skipping fetch", identifier);
            self.record(&Ok(report.clone()), start);
            return Ok(report);
        }

        let outcome = match self.provider.fetch(identifier).await {
            Ok(payload) => self.classifier.classify(identifier, &payload),
            Err(e) => Err(e),
        };
        self.record(&outcome, start);
        outcome
    }

    /// Classify a caller-supplied payload without fetching
    pub fn classify_with_payload(
        &self,
        identifier: &str,
        payload: &RawProjectPayload,
    ) -> AppResult<ClassificationResult> {
        let start = Instant::now();
        let outcome = self.classifier.classify(identifier, payload);
        self.record(&outcome, start);
        outcome
    }

    /// Classify many identifiers concurrently.
    /// Output order follows input order; failures become error outcomes.
    pub async fn classify_many(&self, identifiers: &[String], concurrency: usize) -> Vec<BatchOutcome> {
        let semaphore = Arc::new(Semaphore::new(concurrency.clamp(1, MAX_BATCH_CONCURRENCY)));
        let mut handles = Vec::with_capacity(identifiers.len());

        for identifier in identifiers {
            let sem = semaphore.clone();
            let service = self.clone();
            let id = identifier.clone();
            handles.push(tokio::spawn(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|_| AppError::internal("Batch semaphore closed"))?;
                service.classify(&id).await
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (identifier, handle) in identifiers.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(Ok(result)) => BatchOutcome::Success(Box::new(result)),
                Ok(Err(e)) => BatchOutcome::Error {
                    identifier: identifier.clone(),
                    code: e.code_str().to_string(),
                    message: e.message,
                },
                Err(join_error) => {
                    warn!("⚠️ Batch task for '{}' failed: {}", identifier, join_error);
                    let e = AppError::internal(format!("Task failed: {}", join_error));
                    self.telemetry.record_error(e.code_str());
                    BatchOutcome::Error {
                        identifier: identifier.clone(),
                        code: e.code_str().to_string(),
                        message: e.message,
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    fn record(&self, outcome: &AppResult<ClassificationResult>, start: Instant) {
        match outcome {
            Ok(result) => {
                debug!(
                    identifier = %result.identifier,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "{} classification recorded",
                    result.risk_tier.emoji()
                );
                self.telemetry
                    .record_classification(result, start.elapsed().as_millis() as u64);
            }
            Err(e) => {
                warn!("❌ Classification failed: {}", e);
                self.telemetry.record_error(e.code_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorCode, RiskTier, ScamRecord, ScoringConfig};
    use crate::providers::{InMemoryScamRegistry, OfflineProvider};
    use serde_json::json;

    fn service() -> ClassificationService {
        let registry = InMemoryScamRegistry::with_records(vec![(
            "bitconnect".to_string(),
            ScamRecord {
                name: Some("BitConnect".to_string()),
                scam_type: Some("ponzi_scheme".to_string()),
                ..Default::default()
            },
        )]);
        let provider = OfflineProvider::new();
        provider.insert("bitcoin", json!({"market_data": {"market_cap_rank": 1}}));
        provider.insert("norank", json!({"market_data": {}}));

        let classifier = Classifier::new(Arc::new(registry), ScoringConfig::default()).unwrap();
        ClassificationService::new(
            classifier,
            Arc::new(provider),
            Arc::new(TelemetryCollector::new()),
        )
    }

    #[tokio::test]
    async fn test_known_scam_skips_provider() {
        let service = service();
        let result = service.classify("bitconnect").await.unwrap();
        assert!(result.is_known_scam);
        assert_eq!(result.risk_tier, RiskTier::Critical);
    }

    #[tokio::test]
    async fn test_errors_are_propagated_and_counted() {
        let service = service();
        let err = service.classify("unknown-coin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        let err = service.classify("norank").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DataIncomplete);
        assert_eq!(service.telemetry().get_stats().errors, 2);
    }

    #[tokio::test]
    async fn test_classify_many_keeps_order() {
        let service = service();
        let ids: Vec<String> = ["bitcoin", "unknown-coin", "bitconnect"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let outcomes = service.classify_many(&ids, 0).await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].identifier(), "bitcoin");
        assert!(!outcomes[0].is_error());
        assert!(outcomes[1].is_error());
        assert!(outcomes[2].result().map(|r| r.is_known_scam).unwrap_or(false));
    }
}
