//! Technical Analyzer
//!
//! Scores code availability, development activity, decentralization,
//! security, audits and contract exposure. Rank and age stand in for
//! maturity wherever the provider has no direct data.

use crate::core::bands::{Band, BandTable, RankAge};
use crate::core::normalizer::{DeveloperStats, NormalizedFacts};
use crate::models::TechnicalMetrics;

pub const CODE_PUBLIC_REPO: f64 = 8.5;
pub const CODE_EXPLORER_ONLY: f64 = 6.0;
pub const CODE_NONE: f64 = 4.0;

/// Contract risk for projects with no smart-contract exposure
pub const CONTRACT_NOT_APPLICABLE: f64 = 8.0;

pub static ARCHITECTURE_FROM_REPO: BandTable<DeveloperStats> = BandTable {
    name: "architecture_quality.repo",
    bands: &[
        Band { when: |d| d.stars > 50_000.0 && d.forks > 20_000.0, score: 9.5 },
        Band { when: |d| d.stars > 30_000.0 && d.forks > 10_000.0, score: 9.0 },
        Band { when: |d| d.stars > 15_000.0 && d.forks > 5_000.0, score: 8.5 },
        Band { when: |d| d.stars > 5_000.0, score: 8.0 },
        Band { when: |d| d.stars > 1_000.0, score: 7.5 },
        Band { when: |d| d.stars > 500.0 || d.commits_4w > 50.0, score: 7.0 },
        Band { when: |d| d.stars > 100.0 || d.commits_4w > 20.0, score: 6.0 },
        Band { when: |d| d.stars > 0.0 || d.commits_4w > 0.0, score: 5.0 },
    ],
    otherwise: 0.0,
};

/// Used when the repository table has no match
pub static ARCHITECTURE_FROM_MATURITY: BandTable<RankAge> = BandTable {
    name: "architecture_quality.maturity",
    bands: &[
        Band { when: |m| m.rank <= 10 && m.age_years > 5.0, score: 9.0 },
        Band { when: |m| m.rank <= 20 && m.age_years > 4.0, score: 8.5 },
        Band { when: |m| m.rank <= 30 && m.age_years > 3.0, score: 8.0 },
        Band { when: |m| m.rank <= 50 && m.age_years > 2.0, score: 7.5 },
        Band { when: |m| m.rank <= 100 && m.age_years > 1.0, score: 7.0 },
        Band { when: |m| m.rank <= 200, score: 6.5 },
        Band { when: |m| m.rank <= 500, score: 5.5 },
    ],
    otherwise: 4.0,
};

pub static DECENTRALIZATION: BandTable<RankAge> = BandTable {
    name: "decentralization",
    bands: &[
        Band { when: |m| m.age_years > 10.0 && m.rank <= 5, score: 9.5 },
        Band { when: |m| m.age_years > 6.0 && m.rank <= 15, score: 9.0 },
        Band { when: |m| m.age_years > 4.0 && m.rank <= 30, score: 8.5 },
        Band { when: |m| m.age_years > 3.0 && m.rank <= 50, score: 8.0 },
        Band { when: |m| m.age_years > 2.0 && m.rank <= 100, score: 7.5 },
        Band { when: |m| m.age_years > 2.0, score: 7.0 },
        Band { when: |m| m.age_years > 1.0, score: 6.5 },
        Band { when: |m| m.rank <= 100, score: 6.0 },
    ],
    otherwise: 5.0,
};

pub static SECURITY: BandTable<u32> = BandTable {
    name: "security",
    bands: &[
        Band { when: |r| *r <= 5, score: 9.5 },
        Band { when: |r| *r <= 10, score: 9.0 },
        Band { when: |r| *r <= 20, score: 8.5 },
        Band { when: |r| *r <= 50, score: 8.0 },
        Band { when: |r| *r <= 100, score: 7.5 },
        Band { when: |r| *r <= 200, score: 7.0 },
        Band { when: |r| *r <= 500, score: 6.0 },
        Band { when: |r| *r <= 1000, score: 5.0 },
    ],
    otherwise: 4.0,
};

pub static AUDIT_STATUS: BandTable<RankAge> = BandTable {
    name: "audit_status",
    bands: &[
        Band { when: |m| m.rank <= 10 && m.age_years > 5.0, score: 9.5 },
        Band { when: |m| m.rank <= 20 && m.age_years > 3.0, score: 9.0 },
        Band { when: |m| m.rank <= 50 && m.age_years > 2.0, score: 8.0 },
        Band { when: |m| m.rank <= 100 && m.age_years > 1.0, score: 7.5 },
        Band { when: |m| m.rank <= 200, score: 7.0 },
        Band { when: |m| m.rank <= 500, score: 6.0 },
    ],
    otherwise: 5.0,
};

/// Only consulted for tokens
pub static CONTRACT_RISK: BandTable<RankAge> = BandTable {
    name: "contract_risk",
    bands: &[
        Band { when: |m| m.rank <= 50 && m.age_years > 3.0, score: 8.0 },
        Band { when: |m| m.rank <= 100 && m.age_years > 2.0, score: 7.5 },
        Band { when: |m| m.rank <= 200 && m.age_years > 1.0, score: 7.0 },
    ],
    otherwise: 6.0,
};

pub fn code_availability(facts: &NormalizedFacts) -> f64 {
    if facts.links.has_public_repo {
        CODE_PUBLIC_REPO
    } else if facts.links.has_explorer {
        CODE_EXPLORER_ONLY
    } else {
        CODE_NONE
    }
}

pub fn architecture_quality(facts: &NormalizedFacts) -> f64 {
    ARCHITECTURE_FROM_REPO
        .first_match(&facts.developer)
        .unwrap_or_else(|| ARCHITECTURE_FROM_MATURITY.score(&facts.rank_age()))
}

pub fn contract_risk(facts: &NormalizedFacts) -> f64 {
    if facts.is_token {
        CONTRACT_RISK.score(&facts.rank_age())
    } else {
        CONTRACT_NOT_APPLICABLE
    }
}

/// Compute the technical metric set
pub fn analyze(facts: &NormalizedFacts) -> TechnicalMetrics {
    let maturity = facts.rank_age();
    TechnicalMetrics {
        code_availability: code_availability(facts),
        architecture_quality: architecture_quality(facts),
        decentralization: DECENTRALIZATION.score(&maturity),
        security: SECURITY.score(&facts.rank),
        audit_status: AUDIT_STATUS.score(&maturity),
        contract_risk: contract_risk(facts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::normalize;
    use chrono::Utc;
    use serde_json::json;

    fn facts(payload: serde_json::Value) -> NormalizedFacts {
        normalize(&payload, Utc::now())
    }

    #[test]
    fn test_code_availability_ladder() {
        let repo = facts(json!({"basic_info": {"links": {
            "repos_url": {"github": ["https://github.com/bitcoin/bitcoin"]}
        }}}));
        assert_eq!(code_availability(&repo), 8.5);

        let explorer = facts(json!({"basic_info": {"links": {
            "repos_url": {"github": []},
            "blockchain_site": ["https://etherscan.io/token/x"]
        }}}));
        assert_eq!(code_availability(&explorer), 6.0);

        assert_eq!(code_availability(&facts(json!({}))), 4.0);
    }

    #[test]
    fn test_architecture_prefers_repo_stats() {
        let f = facts(json!({
            "market_data": {"market_cap_rank": 900},
            "basic_info": {"developer_data": {"stars": 72000, "forks": 36000}}
        }));
        assert_eq!(architecture_quality(&f), 9.5);

        let f = facts(json!({
            "market_data": {"market_cap_rank": 900},
            "basic_info": {"developer_data": {"stars": 0, "commit_count_4_weeks": 30}}
        }));
        assert_eq!(architecture_quality(&f), 6.0);
    }

    #[test]
    fn test_architecture_falls_back_to_maturity() {
        let f = facts(json!({"market_data": {"market_cap_rank": 8}}));
        // rank 8 infers age 8y
        assert_eq!(architecture_quality(&f), 9.0);

        let f = facts(json!({"market_data": {"market_cap_rank": 800}}));
        assert_eq!(architecture_quality(&f), 4.0);
    }

    #[test]
    fn test_security_bands() {
        assert_eq!(SECURITY.score(&1), 9.5);
        assert_eq!(SECURITY.score(&50), 8.0);
        assert_eq!(SECURITY.score(&1000), 5.0);
        assert_eq!(SECURITY.score(&1001), 4.0);
    }

    #[test]
    fn test_decentralization_bands() {
        let m = |rank, age_years| RankAge { rank, age_years };
        assert_eq!(DECENTRALIZATION.score(&m(1, 15.0)), 9.5);
        assert_eq!(DECENTRALIZATION.score(&m(1, 8.0)), 9.0);
        assert_eq!(DECENTRALIZATION.score(&m(900, 2.5)), 7.0);
        assert_eq!(DECENTRALIZATION.score(&m(90, 0.5)), 6.0);
        assert_eq!(DECENTRALIZATION.score(&m(900, 0.5)), 5.0);
    }

    #[test]
    fn test_contract_risk_non_token_is_flat() {
        let coin = facts(json!({
            "market_data": {"market_cap_rank": 5000},
            "basic_info": {"categories": ["Layer 1 (L1)"]}
        }));
        assert_eq!(contract_risk(&coin), CONTRACT_NOT_APPLICABLE);

        let token = facts(json!({
            "market_data": {"market_cap_rank": 5000},
            "basic_info": {"categories": ["BEP-20"]}
        }));
        assert_eq!(contract_risk(&token), 6.0);
    }

    #[test]
    fn test_all_tables_within_bounds() {
        let tables: [&dyn Fn() -> Vec<f64>; 5] = [
            &|| ARCHITECTURE_FROM_MATURITY.scores().collect(),
            &|| DECENTRALIZATION.scores().collect(),
            &|| SECURITY.scores().collect(),
            &|| AUDIT_STATUS.scores().collect(),
            &|| CONTRACT_RISK.scores().collect(),
        ];
        for table in tables {
            assert!(table().iter().all(|s| (0.0..=10.0).contains(s)));
        }
        assert!(ARCHITECTURE_FROM_REPO
            .scores()
            .all(|s| (0.0..=10.0).contains(&s)));
    }
}
