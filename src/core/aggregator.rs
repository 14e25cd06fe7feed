//! Score Aggregator
//!
//! Axis weighting, fraud penalty, tier/grade/category mapping and the
//! strengths/weaknesses summary. All weights come from `ScoringConfig`.

use crate::core::normalizer::NormalizedFacts;
use crate::models::{
    AxisScores, LetterGrade, MetricSets, ProjectCategory, RiskTier, ScamSignal, ScoringConfig,
};
use crate::utils::constants::{INFRA_CATEGORY_KEYWORDS, LAYER1_CATEGORY_KEYWORDS};

/// Final score ranges per tier (after the critical short-circuit)
pub static RISK_TIERS: [(f64, RiskTier); 5] = [
    (85.0, RiskTier::VeryLow),
    (70.0, RiskTier::Low),
    (55.0, RiskTier::Moderate),
    (40.0, RiskTier::High),
    (25.0, RiskTier::VeryHigh),
];

pub static LETTER_GRADES: [(f64, LetterGrade); 12] = [
    (93.0, LetterGrade::APlus),
    (85.0, LetterGrade::A),
    (80.0, LetterGrade::AMinus),
    (75.0, LetterGrade::BPlus),
    (70.0, LetterGrade::B),
    (65.0, LetterGrade::BMinus),
    (60.0, LetterGrade::CPlus),
    (55.0, LetterGrade::C),
    (50.0, LetterGrade::CMinus),
    (45.0, LetterGrade::DPlus),
    (40.0, LetterGrade::D),
    (35.0, LetterGrade::DMinus),
];

/// Infra-labelled projects count as own-chain only above these marks
pub const INFRA_MAX_RANK: u32 = 100;
pub const INFRA_MIN_SCORE: f64 = 55.0;
/// Minimum final score of a quality token
pub const QUALITY_MIN_SCORE: f64 = 50.0;

/// One summary rule over a sub-metric
pub struct Highlight {
    pub metric: fn(&MetricSets) -> f64,
    pub strong_at: f64,
    pub weak_below: f64,
    pub strength: &'static str,
    pub weakness: &'static str,
}

/// Evaluated in order; list order is preserved in the output
pub static HIGHLIGHTS: [Highlight; 11] = [
    Highlight {
        metric: |m| m.technical.code_availability,
        strong_at: 8.0,
        weak_below: 5.0,
        strength: "Open source code",
        weakness: "Limited code availability",
    },
    Highlight {
        metric: |m| m.technical.architecture_quality,
        strong_at: 8.0,
        weak_below: 5.0,
        strength: "Strong development activity",
        weakness: "Weak development activity",
    },
    Highlight {
        metric: |m| m.technical.decentralization,
        strong_at: 8.0,
        weak_below: 5.0,
        strength: "High degree of decentralization",
        weakness: "Questionable decentralization",
    },
    Highlight {
        metric: |m| m.technical.security,
        strong_at: 8.5,
        weak_below: 5.0,
        strength: "Excellent security track record",
        weakness: "Insufficient security track record",
    },
    Highlight {
        metric: |m| m.economic.liquidity_depth,
        strong_at: 8.5,
        weak_below: 5.0,
        strength: "Excellent liquidity",
        weakness: "Low liquidity",
    },
    Highlight {
        metric: |m| m.economic.tokenomics_sustainability,
        strong_at: 8.0,
        weak_below: 5.0,
        strength: "Sustainable tokenomics",
        weakness: "Questionable tokenomics",
    },
    Highlight {
        metric: |m| m.economic.ownership_concentration,
        strong_at: 8.0,
        weak_below: 5.0,
        strength: "Healthy ownership distribution",
        weakness: "High ownership concentration",
    },
    Highlight {
        metric: |m| m.economic.manipulation_indicators,
        strong_at: 8.0,
        weak_below: 4.0,
        strength: "Low volatility",
        weakness: "High volatility - possible manipulation",
    },
    Highlight {
        metric: |m| m.social.community_engagement,
        strong_at: 8.0,
        weak_below: 5.0,
        strength: "Large and active community",
        weakness: "Small community",
    },
    Highlight {
        metric: |m| m.social.team_transparency,
        strong_at: 8.0,
        weak_below: 5.0,
        strength: "Transparent team",
        weakness: "Opaque team",
    },
    Highlight {
        metric: |m| m.social.documentation_quality,
        strong_at: 8.0,
        weak_below: 5.0,
        strength: "Extensive documentation",
        weakness: "Insufficient documentation",
    },
];

pub const FRAUD_HIGH: &str = "High scam probability";
pub const FRAUD_SOME: &str = "Some scam indicators";
pub const FRAUD_LOW: &str = "Low scam probability";
pub const FRAUD_HIGH_ABOVE: f64 = 0.5;
pub const FRAUD_SOME_ABOVE: f64 = 0.3;
pub const FRAUD_LOW_BELOW: f64 = 0.1;

/// Aggregator bound to one scoring configuration
#[derive(Debug, Clone)]
pub struct Aggregator {
    config: ScoringConfig,
}

impl Aggregator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn axis_scores(&self, metrics: &MetricSets) -> AxisScores {
        AxisScores {
            technical: self.config.technical_score(&metrics.technical),
            economic: self.config.economic_score(&metrics.economic),
            social: self.config.social_score(&metrics.social),
        }
    }

    /// Weighted composite before any penalty, in [0, 100]
    pub fn composite(&self, axes: &AxisScores) -> f64 {
        let w = &self.config.axis_weights;
        axes.technical * w.technical + axes.economic * w.economic + axes.social * w.social
    }

    /// raw × (1 − factor × probability) when probability > 0
    pub fn apply_penalty(&self, raw: f64, probability: f64) -> f64 {
        if probability > 0.0 {
            raw * (1.0 - self.config.fraud_penalty_factor * probability)
        } else {
            raw
        }
    }

    pub fn risk_tier(&self, final_score: f64, signal: &ScamSignal) -> RiskTier {
        if signal.is_known_scam || signal.probability > self.config.critical_probability {
            return RiskTier::Critical;
        }
        RISK_TIERS
            .iter()
            .find(|(min, _)| final_score >= *min)
            .map(|(_, tier)| *tier)
            .unwrap_or(RiskTier::Critical)
    }

    pub fn letter_grade(final_score: f64) -> LetterGrade {
        LETTER_GRADES
            .iter()
            .find(|(min, _)| final_score >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(LetterGrade::F)
    }

    pub fn category(facts: &NormalizedFacts, final_score: f64) -> ProjectCategory {
        if facts.has_category(&LAYER1_CATEGORY_KEYWORDS) {
            return ProjectCategory::Layer1;
        }
        if facts.has_category(&INFRA_CATEGORY_KEYWORDS)
            && facts.rank_resolved
            && facts.rank <= INFRA_MAX_RANK
            && final_score >= INFRA_MIN_SCORE
        {
            return ProjectCategory::Layer1;
        }
        if final_score >= QUALITY_MIN_SCORE {
            ProjectCategory::QualityToken
        } else {
            ProjectCategory::Problematic
        }
    }

    /// Strengths and weaknesses, each truncated to `max_highlights`
    pub fn highlights(
        &self,
        metrics: &MetricSets,
        signal: &ScamSignal,
    ) -> (Vec<String>, Vec<String>) {
        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();

        for rule in HIGHLIGHTS.iter() {
            let value = (rule.metric)(metrics);
            if value >= rule.strong_at {
                strengths.push(rule.strength.to_string());
            } else if value < rule.weak_below {
                weaknesses.push(rule.weakness.to_string());
            }
        }

        let p = signal.probability;
        if p > FRAUD_HIGH_ABOVE {
            weaknesses.push(FRAUD_HIGH.to_string());
        } else if p > FRAUD_SOME_ABOVE {
            weaknesses.push(FRAUD_SOME.to_string());
        } else if p < FRAUD_LOW_BELOW {
            strengths.push(FRAUD_LOW.to_string());
        }

        strengths.truncate(self.config.max_highlights);
        weaknesses.truncate(self.config.max_highlights);
        (strengths, weaknesses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::normalize;
    use crate::models::{EconomicMetrics, SocialMetrics, TechnicalMetrics};
    use chrono::Utc;
    use serde_json::json;

    fn uniform(score: f64) -> MetricSets {
        MetricSets {
            technical: TechnicalMetrics {
                code_availability: score,
                architecture_quality: score,
                decentralization: score,
                security: score,
                audit_status: score,
                contract_risk: score,
            },
            economic: EconomicMetrics {
                distribution_fairness: score,
                inflation_mechanism: score,
                vesting_schedule: score,
                ownership_concentration: score,
                liquidity_depth: score,
                manipulation_indicators: score,
                tokenomics_sustainability: score,
            },
            social: SocialMetrics {
                team_transparency: score,
                team_experience: score,
                documentation_quality: score,
                community_engagement: score,
                marketing_approach: score,
                network_presence: score,
                community_health: score,
            },
        }
    }

    fn aggregator() -> Aggregator {
        Aggregator::new(ScoringConfig::default())
    }

    #[test]
    fn test_uniform_metrics_composite() {
        let agg = aggregator();
        let axes = agg.axis_scores(&uniform(7.0));
        assert!((axes.technical - 70.0).abs() < 1e-9);
        assert!((agg.composite(&axes) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_penalty() {
        let agg = aggregator();
        assert_eq!(agg.apply_penalty(80.0, 0.0), 80.0);
        assert!((agg.apply_penalty(80.0, 0.5) - 60.0).abs() < 1e-9);
        assert!((agg.apply_penalty(80.0, 1.0) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_tier_bands() {
        let agg = aggregator();
        let clean = ScamSignal::default();
        assert_eq!(agg.risk_tier(85.0, &clean), RiskTier::VeryLow);
        assert_eq!(agg.risk_tier(84.99, &clean), RiskTier::Low);
        assert_eq!(agg.risk_tier(55.0, &clean), RiskTier::Moderate);
        assert_eq!(agg.risk_tier(40.0, &clean), RiskTier::High);
        assert_eq!(agg.risk_tier(25.0, &clean), RiskTier::VeryHigh);
        assert_eq!(agg.risk_tier(24.9, &clean), RiskTier::Critical);
    }

    #[test]
    fn test_high_probability_forces_critical() {
        let agg = aggregator();
        let signal = ScamSignal {
            probability: 0.85,
            ..Default::default()
        };
        assert_eq!(agg.risk_tier(95.0, &signal), RiskTier::Critical);

        let signal = ScamSignal {
            probability: 0.8,
            ..Default::default()
        };
        assert_eq!(agg.risk_tier(95.0, &signal), RiskTier::VeryLow);
    }

    #[test]
    fn test_letter_grades() {
        assert_eq!(Aggregator::letter_grade(100.0), LetterGrade::APlus);
        assert_eq!(Aggregator::letter_grade(93.0), LetterGrade::APlus);
        assert_eq!(Aggregator::letter_grade(92.9), LetterGrade::A);
        assert_eq!(Aggregator::letter_grade(50.0), LetterGrade::CMinus);
        assert_eq!(Aggregator::letter_grade(35.0), LetterGrade::DMinus);
        assert_eq!(Aggregator::letter_grade(34.9), LetterGrade::F);
    }

    #[test]
    fn test_category_rules() {
        let l1 = normalize(
            &json!({"market_data": {"market_cap_rank": 900},
                    "basic_info": {"categories": ["Smart Contract Platform"]}}),
            Utc::now(),
        );
        assert_eq!(Aggregator::category(&l1, 10.0), ProjectCategory::Layer1);

        let infra = normalize(
            &json!({"market_data": {"market_cap_rank": 60},
                    "basic_info": {"categories": ["Infrastructure"]}}),
            Utc::now(),
        );
        assert_eq!(Aggregator::category(&infra, 60.0), ProjectCategory::Layer1);
        assert_eq!(Aggregator::category(&infra, 52.0), ProjectCategory::QualityToken);
        assert_eq!(Aggregator::category(&infra, 49.0), ProjectCategory::Problematic);
    }

    #[test]
    fn test_highlights_order_and_fraud_wording() {
        let agg = aggregator();
        let (strengths, weaknesses) = agg.highlights(&uniform(9.0), &ScamSignal::default());
        assert_eq!(strengths.len(), 7);
        assert_eq!(strengths[0], "Open source code");
        assert!(weaknesses.is_empty());

        let risky = ScamSignal {
            probability: 0.55,
            ..Default::default()
        };
        let (strengths, weaknesses) = agg.highlights(&uniform(3.0), &risky);
        assert!(strengths.is_empty());
        assert_eq!(weaknesses.len(), 7);

        let (_, weaknesses) = agg.highlights(&uniform(6.0), &risky);
        assert_eq!(weaknesses, vec![FRAUD_HIGH.to_string()]);

        let some = ScamSignal {
            probability: 0.35,
            ..Default::default()
        };
        let (strengths, weaknesses) = agg.highlights(&uniform(6.0), &some);
        assert!(strengths.is_empty());
        assert_eq!(weaknesses, vec![FRAUD_SOME.to_string()]);

        let mid = ScamSignal {
            probability: 0.2,
            ..Default::default()
        };
        let (strengths, weaknesses) = agg.highlights(&uniform(6.0), &mid);
        assert!(strengths.is_empty() && weaknesses.is_empty());
    }
}
