//! Economic Analyzer
//!
//! Tokenomics and market behaviour: distribution, supply, vesting,
//! drawdown, liquidity and volatility.

use crate::core::bands::{Band, BandTable, RankAge};
use crate::core::normalizer::NormalizedFacts;
use crate::models::EconomicMetrics;

/// Inflation score for supplies without a cap
pub const UNCAPPED_SUPPLY: f64 = 6.5;

/// Volume / market cap in percent
pub static DISTRIBUTION_FROM_TURNOVER: BandTable<f64> = BandTable {
    name: "distribution_fairness.turnover",
    bands: &[
        Band { when: |pct| *pct > 15.0, score: 9.5 },
        Band { when: |pct| *pct > 8.0, score: 9.0 },
        Band { when: |pct| *pct > 4.0, score: 8.5 },
        Band { when: |pct| *pct > 2.0, score: 8.0 },
        Band { when: |pct| *pct > 1.0, score: 7.5 },
        Band { when: |pct| *pct > 0.5, score: 7.0 },
        Band { when: |pct| *pct > 0.1, score: 6.0 },
    ],
    otherwise: 5.0,
};

pub static DISTRIBUTION_FLOOR: BandTable<RankAge> = BandTable {
    name: "distribution_fairness.floor",
    bands: &[
        Band { when: |m| m.rank <= 10 && m.age_years > 5.0, score: 9.0 },
        Band { when: |m| m.rank <= 30 && m.age_years > 3.0, score: 8.5 },
        Band { when: |m| m.rank <= 50, score: 8.0 },
        Band { when: |m| m.rank <= 100, score: 7.5 },
    ],
    otherwise: 0.0,
};

/// Circulating / max supply
pub static INFLATION: BandTable<f64> = BandTable {
    name: "inflation_mechanism",
    bands: &[
        Band { when: |ratio| *ratio > 0.9, score: 9.0 },
        Band { when: |ratio| *ratio > 0.75, score: 8.0 },
        Band { when: |ratio| *ratio > 0.5, score: 7.0 },
        Band { when: |ratio| *ratio > 0.3, score: 6.0 },
    ],
    otherwise: 5.0,
};

/// Age in years
pub static VESTING: BandTable<f64> = BandTable {
    name: "vesting_schedule",
    bands: &[
        Band { when: |age| *age > 10.0, score: 9.5 },
        Band { when: |age| *age > 7.0, score: 9.0 },
        Band { when: |age| *age > 5.0, score: 8.5 },
        Band { when: |age| *age > 3.0, score: 8.0 },
        Band { when: |age| *age > 2.0, score: 7.5 },
        Band { when: |age| *age > 1.0, score: 7.0 },
    ],
    otherwise: 6.0,
};

/// Change from ATH in percent (negative = drawdown)
pub static OWNERSHIP_FROM_DRAWDOWN: BandTable<f64> = BandTable {
    name: "ownership_concentration.drawdown",
    bands: &[
        Band { when: |ath| *ath > -20.0, score: 9.0 },
        Band { when: |ath| *ath > -40.0, score: 8.5 },
        Band { when: |ath| *ath > -60.0, score: 8.0 },
        Band { when: |ath| *ath > -75.0, score: 7.5 },
        Band { when: |ath| *ath > -85.0, score: 7.0 },
        Band { when: |ath| *ath > -92.0, score: 6.0 },
    ],
    otherwise: 5.0,
};

pub static OWNERSHIP_FLOOR: BandTable<RankAge> = BandTable {
    name: "ownership_concentration.floor",
    bands: &[
        Band { when: |m| m.rank <= 10 && m.age_years > 5.0, score: 8.5 },
        Band { when: |m| m.rank <= 30 && m.age_years > 3.0, score: 8.0 },
        Band { when: |m| m.rank <= 50, score: 7.5 },
        Band { when: |m| m.rank <= 100, score: 7.0 },
    ],
    otherwise: 0.0,
};

/// 24h volume in USD
pub static LIQUIDITY: BandTable<f64> = BandTable {
    name: "liquidity_depth",
    bands: &[
        Band { when: |v| *v > 2_000_000_000.0, score: 9.5 },
        Band { when: |v| *v > 1_000_000_000.0, score: 9.0 },
        Band { when: |v| *v > 500_000_000.0, score: 8.5 },
        Band { when: |v| *v > 200_000_000.0, score: 8.0 },
        Band { when: |v| *v > 100_000_000.0, score: 7.5 },
        Band { when: |v| *v > 50_000_000.0, score: 7.0 },
        Band { when: |v| *v > 10_000_000.0, score: 6.5 },
        Band { when: |v| *v > 1_000_000.0, score: 6.0 },
        Band { when: |v| *v > 100_000.0, score: 5.0 },
    ],
    otherwise: 4.0,
};

/// Mean absolute 7d/30d price change in percent
pub static MANIPULATION: BandTable<f64> = BandTable {
    name: "manipulation_indicators",
    bands: &[
        Band { when: |vol| *vol < 5.0, score: 9.0 },
        Band { when: |vol| *vol < 10.0, score: 8.5 },
        Band { when: |vol| *vol < 20.0, score: 8.0 },
        Band { when: |vol| *vol < 35.0, score: 7.0 },
        Band { when: |vol| *vol < 50.0, score: 6.0 },
    ],
    otherwise: 5.0,
};

pub static SUSTAINABILITY: BandTable<RankAge> = BandTable {
    name: "tokenomics_sustainability",
    bands: &[
        Band { when: |m| m.rank <= 10 && m.age_years > 5.0, score: 9.5 },
        Band { when: |m| m.rank <= 30 && m.age_years > 3.0, score: 9.0 },
        Band { when: |m| m.rank <= 50 && m.age_years > 2.0, score: 8.5 },
        Band { when: |m| m.rank <= 100, score: 8.0 },
        Band { when: |m| m.rank <= 200, score: 7.5 },
    ],
    otherwise: 7.0,
};

pub fn distribution_fairness(facts: &NormalizedFacts) -> f64 {
    let base = DISTRIBUTION_FROM_TURNOVER.score(&facts.volume_to_cap_pct());
    DISTRIBUTION_FLOOR.floor(base, &facts.rank_age())
}

pub fn inflation_mechanism(facts: &NormalizedFacts) -> f64 {
    match facts.max_supply {
        Some(max) if max > 0.0 && facts.circulating_supply != 0.0 => {
            INFLATION.score(&(facts.circulating_supply / max))
        }
        _ => UNCAPPED_SUPPLY,
    }
}

pub fn ownership_concentration(facts: &NormalizedFacts) -> f64 {
    let base = OWNERSHIP_FROM_DRAWDOWN.score(&facts.ath_change_pct);
    OWNERSHIP_FLOOR.floor(base, &facts.rank_age())
}

pub fn volatility(facts: &NormalizedFacts) -> f64 {
    (facts.price_change_7d.abs() + facts.price_change_30d.abs()) / 2.0
}

/// Compute the economic metric set
pub fn analyze(facts: &NormalizedFacts) -> EconomicMetrics {
    EconomicMetrics {
        distribution_fairness: distribution_fairness(facts),
        inflation_mechanism: inflation_mechanism(facts),
        vesting_schedule: VESTING.score(&facts.age_years),
        ownership_concentration: ownership_concentration(facts),
        liquidity_depth: LIQUIDITY.score(&facts.volume_24h),
        manipulation_indicators: MANIPULATION.score(&volatility(facts)),
        tokenomics_sustainability: SUSTAINABILITY.score(&facts.rank_age()),
    }
}
