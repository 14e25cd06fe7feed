//! Integration tests for the coin classifier

use chrono::{TimeZone, Utc};
use coin_classifier::core::economic;
use coin_classifier::{
    BatchOutcome, ClassificationService, Classifier, ErrorCode, InMemoryScamRegistry,
    JsonFileScamRegistry, LetterGrade, OfflineProvider, ProjectCategory, RawProjectPayload,
    RiskTier, ScamRecord, ScamRegistry, ScamType, ScoringConfig, TelemetryCollector,
};
use serde_json::json;
use std::sync::Arc;

fn classifier_with(registry: Arc<dyn ScamRegistry>) -> Classifier {
    Classifier::new(registry, ScoringConfig::default())
        .unwrap()
        .with_reference_time(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
}

fn classifier() -> Classifier {
    classifier_with(Arc::new(InMemoryScamRegistry::new()))
}

fn bitcoin_like() -> RawProjectPayload {
    let description = "Bitcoin is a peer-to-peer electronic cash system. ".repeat(30);
    json!({
        "coin_id": "bitcoin",
        "basic_info": {
            "name": "Bitcoin",
            "symbol": "btc",
            "genesis_date": "2009-01-03",
            "categories": ["Layer 1 (L1)", "Proof of Work (PoW)"],
            "description": {"en": description},
            "sentiment_votes_up_percentage": 85.0,
            "links": {
                "homepage": ["https://bitcoin.org"],
                "whitepaper": "https://bitcoin.org/bitcoin.pdf",
                "chat_url": ["https://discord.gg/bitcoin"],
                "official_forum_url": ["https://bitcointalk.org"],
                "repos_url": {"github": ["https://github.com/bitcoin/bitcoin"]},
                "blockchain_site": ["https://mempool.space"]
            },
            "developer_data": {"stars": 75000, "forks": 35000, "commit_count_4_weeks": 120},
            "community_data": {
                "twitter_followers": 6500000,
                "reddit_subscribers": 5000000,
                "reddit_accounts_active_48h": 12000
            },
            "market_data": {
                "max_supply": 21000000.0,
                "circulating_supply": 19700000.0,
                "ath_change_percentage": {"usd": -10.0}
            }
        },
        "market_data": {
            "market_cap_rank": 1,
            "market_cap": 1.2e12,
            "total_volume": 3.0e10,
            "price_change_percentage_7d_in_currency": 2.0,
            "price_change_percentage_30d_in_currency": -4.0
        }
    })
}

fn obscure_token(rank: u32, market_cap: f64, volume: f64, description: &str, ath: f64) -> RawProjectPayload {
    json!({
        "basic_info": {
            "name": "Obscure",
            "symbol": "obs",
            "categories": ["BEP-20 Token"],
            "description": {"en": description},
            "market_data": {"ath_change_percentage": {"usd": ath}}
        },
        "market_data": {
            "market_cap_rank": rank,
            "market_cap": market_cap,
            "total_volume": volume
        }
    })
}

// ============================================
// Scenarios
// ============================================

#[test]
fn test_established_layer1_scores_top_grade() {
    let result = classifier().classify("bitcoin", &bitcoin_like()).unwrap();

    assert!(matches!(result.letter_grade, LetterGrade::A | LetterGrade::APlus));
    assert!(matches!(result.risk_tier, RiskTier::VeryLow | RiskTier::Low));
    assert_eq!(result.category, ProjectCategory::Layer1);
    assert_eq!(result.fraud_probability, 0.0);
    assert!(!result.is_known_scam);
    assert_eq!(result.name, "Bitcoin");
    assert_eq!(result.symbol, "BTC");
    assert!((result.final_score - 91.9775).abs() < 1e-6);
}

#[test]
fn test_registered_rug_pull_is_critical() {
    let registry = InMemoryScamRegistry::with_records([(
        "squid-game".to_string(),
        ScamRecord {
            name: Some("Squid Game".to_string()),
            symbol: Some("squid".to_string()),
            scam_type: Some("rug_pull".to_string()),
            red_flags: vec!["Sell function disabled".to_string()],
            ..Default::default()
        },
    )]);
    let c = classifier_with(Arc::new(registry));

    // Registry hit wins regardless of how healthy the payload looks
    let result = c.classify("squid-game", &bitcoin_like()).unwrap();
    assert_eq!(result.risk_tier.as_str(), "Critical Risk - Likely Scam");
    assert!(result.is_known_scam);
    assert_eq!(result.fraud_probability, 1.0);
    assert_eq!(result.scam_type, ScamType::RugPull);
    assert_eq!(result.category, ProjectCategory::Problematic);
    assert_eq!(result.red_flags, vec!["Sell function disabled".to_string()]);
}

#[test]
fn test_registry_matches_payload_name() {
    let registry = InMemoryScamRegistry::with_records([(
        "obscure-coin".to_string(),
        ScamRecord {
            name: Some("Obscure".to_string()),
            scam_type: Some("pump_and_dump".to_string()),
            ..Default::default()
        },
    )]);
    let c = classifier_with(Arc::new(registry));
    let payload = obscure_token(900, 5.0e6, 5.0e4, "A token", -30.0);
    let result = c.classify("some-other-id", &payload).unwrap();
    assert!(result.is_known_scam);
    assert_eq!(result.scam_type, ScamType::PumpAndDump);
}

#[test]
fn test_collapsed_micro_cap_is_rug_pull() {
    let payload = obscure_token(5000, 50_000.0, 200.0, "Guaranteed return for holders", -99.5);
    let result = classifier().classify("obscure", &payload).unwrap();

    assert!(result.fraud_probability >= 0.6);
    assert!((result.fraud_probability - 0.70).abs() < 1e-9);
    assert_eq!(result.scam_type, ScamType::RugPull);
    assert!(result
        .red_flags
        .contains(&"Price dropped >99% from ATH".to_string()));
    assert!(result
        .red_flags
        .contains(&"Extremely low trading volume".to_string()));
}

#[test]
fn test_missing_genesis_infers_age_from_rank() {
    let payload = json!({
        "basic_info": {"name": "Fifteen"},
        "market_data": {"market_cap_rank": 15}
    });
    let facts = classifier().normalize(&payload);
    assert_eq!(facts.age_years, 6.0);
    assert!(facts.age_inferred);
}

#[test]
fn test_high_probability_forces_critical() {
    let description =
        "Guaranteed return, risk free, 100x, the next bitcoin, get rich, limited time offer";
    let payload = json!({
        "basic_info": {
            "name": "Safe Moon Elon Doge Inu",
            "description": {"en": description}
        },
        "market_data": {"market_cap_rank": 3, "market_cap": 5.0e11, "total_volume": 2.0e10}
    });
    let result = classifier().classify("smedi", &payload).unwrap();
    assert!(result.fraud_probability > 0.8);
    assert_eq!(result.risk_tier, RiskTier::Critical);
    assert!(!result.is_known_scam);
    assert_eq!(result.warnings.len(), 5);
    assert_eq!(result.red_flags.len(), 6);
}

// ============================================
// Properties
// ============================================

#[test]
fn test_scores_stay_in_bounds() {
    let c = classifier();
    let payloads = vec![
        bitcoin_like(),
        json!({"market_data": {"market_cap_rank": 1}}),
        json!({"market_data": {"market_cap_rank": 250, "market_cap": 0, "total_volume": 0}}),
        obscure_token(5000, 50_000.0, 200.0, "guaranteed return get rich", -99.9),
        obscure_token(120, 3.0e8, 9.0e9, "", 0.0),
        obscure_token(1500, 2.0e6, 5_000.0, "risk free passive income", -96.0),
    ];

    for payload in &payloads {
        let result = c.classify("probe", payload).unwrap();
        assert!((0.0..=100.0).contains(&result.final_score));
        assert!((0.0..=1.0).contains(&result.fraud_probability));

        let axes = result.axis_scores.unwrap();
        for axis in [axes.technical, axes.economic, axes.social] {
            assert!((0.0..=100.0).contains(&axis), "axis {} out of range", axis);
        }

        let metrics = result.metric_sets.unwrap();
        let subs = metrics
            .technical
            .values()
            .into_iter()
            .chain(metrics.economic.values())
            .chain(metrics.social.values());
        for s in subs {
            assert!((0.0..=10.0).contains(&s), "sub-score {} out of range", s);
        }
    }
}

#[test]
fn test_default_weights_are_normalized() {
    let config = ScoringConfig::default();
    assert!(config.validate().is_ok());
    let axes = config.axis_weights.technical + config.axis_weights.economic + config.axis_weights.social;
    assert!((axes - 1.0).abs() < 1e-9);
}

#[test]
fn test_classification_is_idempotent() {
    let c = classifier();
    let payload = obscure_token(480, 4.0e6, 8.0e4, "A community token", -70.0);
    let first = c.classify("obscure", &payload).unwrap();
    let mut second = c.classify("obscure", &payload).unwrap();
    second.timestamp = first.timestamp;
    assert_eq!(first, second);
}

#[test]
fn test_liquidity_never_drops_with_volume() {
    let c = classifier();
    let mut previous = 0.0;
    for volume in [0.0, 5.0e4, 2.0e5, 5.0e6, 2.0e7, 6.0e7, 1.5e8, 3.0e8, 7.0e8, 1.5e9, 3.0e9] {
        let facts = c.normalize(&obscure_token(300, 1.0e9, volume, "", -40.0));
        let liquidity = economic::analyze(&facts).liquidity_depth;
        assert!(liquidity >= previous, "volume {} lowered liquidity", volume);
        previous = liquidity;
    }
    assert_eq!(previous, 9.5);
}

// ============================================
// Errors & batches
// ============================================

#[test]
fn test_missing_rank_is_reported() {
    let err = classifier()
        .classify("ghost", &json!({"basic_info": {"name": "Ghost"}}))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DataIncomplete);
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn test_batch_keeps_order_and_isolates_failures() {
    let items = vec![
        ("bitcoin".to_string(), bitcoin_like()),
        ("ghost".to_string(), json!({})),
        ("obscure".to_string(), obscure_token(900, 5.0e6, 5.0e4, "", -30.0)),
    ];
    let outcomes = classifier().classify_batch(&items);

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].identifier(), "bitcoin");
    assert!(outcomes[1].is_error());
    assert_eq!(outcomes[2].identifier(), "obscure");
    assert!(outcomes[2].result().is_some());

    let json = serde_json::to_value(&outcomes).unwrap();
    assert_eq!(json[1]["status"], "error");
    assert_eq!(json[1]["code"], "CLASSIFY_DATA_INCOMPLETE");
}

// ============================================
// Registry persistence
// ============================================

#[test]
fn test_registry_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scam_indicators.json");
    std::fs::write(
        &path,
        r#"{
            "known_scam_coins": {},
            "scam_type_definitions": {"rug_pull": {"description": "Developers abandon the project"}},
            "red_flag_patterns": {},
            "market_cap_thresholds": {}
        }"#,
    )
    .unwrap();

    let registry = JsonFileScamRegistry::open(&path).unwrap();
    assert!(registry.is_empty());
    registry
        .upsert(
            "squid-game",
            ScamRecord {
                name: Some("Squid Game".to_string()),
                symbol: Some("SQUID".to_string()),
                scam_type: Some("rug_pull".to_string()),
                score: Some(2.0),
                ..Default::default()
            },
        )
        .unwrap();

    let reopened = JsonFileScamRegistry::open(&path).unwrap();
    assert_eq!(reopened.len(), 1);
    assert!(reopened.lookup("Squid Game").is_some());
    assert!(reopened.lookup("squid").is_some());
    assert!(reopened.scam_type_info("rug_pull").is_some());

    let result = classifier_with(Arc::new(reopened))
        .check_known_scam("SQUID")
        .unwrap();
    assert_eq!(result.final_score, 2.0);
    assert_eq!(result.letter_grade, LetterGrade::F);
}

#[test]
fn test_malformed_registry_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = JsonFileScamRegistry::open(&path).unwrap_err();
    assert_eq!(err.code, ErrorCode::RegistryLoadFailed);
}

// ============================================
// Service
// ============================================

#[tokio::test]
async fn test_service_over_offline_provider() {
    let provider = OfflineProvider::new();
    provider.insert("bitcoin", bitcoin_like());
    let service = ClassificationService::new(
        classifier(),
        Arc::new(provider),
        Arc::new(TelemetryCollector::new()),
    );

    let ids = vec!["bitcoin".to_string(), "missing".to_string()];
    let outcomes = service.classify_many(&ids, 2).await;
    match &outcomes[1] {
        BatchOutcome::Error { code, .. } => assert_eq!(code, "CLASSIFY_NOT_FOUND"),
        other => panic!("expected error, got {:?}", other),
    }
    assert_eq!(
        outcomes[0].result().map(|r| r.category),
        Some(ProjectCategory::Layer1)
    );

    let stats = service.telemetry().get_stats();
    assert_eq!(stats.total_classified, 1);
    assert_eq!(stats.errors, 1);
}
