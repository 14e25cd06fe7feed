//! Social Analyzer
//!
//! Team, documentation, community and sentiment. Providers often omit
//! community data for large projects, so several metrics fall back to
//! rank bands when their primary table has no match.

use crate::core::bands::{Band, BandTable, RankAge};
use crate::core::normalizer::{CommunityStats, NormalizedFacts};
use crate::models::SocialMetrics;

/// Published channels (homepage, whitepaper, chat, forum)
pub static TRANSPARENCY: BandTable<u32> = BandTable {
    name: "team_transparency",
    bands: &[
        Band { when: |n| *n >= 4, score: 9.0 },
        Band { when: |n| *n >= 3, score: 8.5 },
        Band { when: |n| *n >= 2, score: 7.5 },
        Band { when: |n| *n >= 1, score: 6.0 },
    ],
    otherwise: 4.0,
};

pub static TRANSPARENCY_FLOOR: BandTable<RankAge> = BandTable {
    name: "team_transparency.floor",
    bands: &[Band { when: |m| m.rank <= 30 && m.age_years > 3.0, score: 8.5 }],
    otherwise: 0.0,
};

pub static TEAM_EXPERIENCE: BandTable<RankAge> = BandTable {
    name: "team_experience",
    bands: &[
        Band { when: |m| m.rank <= 10 && m.age_years > 5.0, score: 9.5 },
        Band { when: |m| m.rank <= 20 && m.age_years > 4.0, score: 9.0 },
        Band { when: |m| m.rank <= 30 && m.age_years > 3.0, score: 8.5 },
        Band { when: |m| m.rank <= 50 && m.age_years > 2.0, score: 8.0 },
        Band { when: |m| m.rank <= 100, score: 7.5 },
        Band { when: |m| m.rank <= 200, score: 7.0 },
    ],
    otherwise: 6.0,
};

/// Whitepaper presence and description length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Documentation {
    pub has_whitepaper: bool,
    pub description_chars: usize,
}

pub static DOCUMENTATION: BandTable<Documentation> = BandTable {
    name: "documentation_quality",
    bands: &[
        Band { when: |d| d.has_whitepaper && d.description_chars > 1000, score: 9.0 },
        Band { when: |d| d.has_whitepaper && d.description_chars > 500, score: 8.5 },
        Band { when: |d| d.description_chars > 1000, score: 8.0 },
        Band { when: |d| d.description_chars > 500, score: 7.5 },
        Band { when: |d| d.description_chars > 200, score: 7.0 },
        Band { when: |d| d.description_chars > 0, score: 6.0 },
    ],
    otherwise: 5.0,
};

/// Summed followers across twitter, reddit and telegram
pub static ENGAGEMENT: BandTable<f64> = BandTable {
    name: "community_engagement",
    bands: &[
        Band { when: |t| *t > 5_000_000.0, score: 9.5 },
        Band { when: |t| *t > 2_000_000.0, score: 9.0 },
        Band { when: |t| *t > 1_000_000.0, score: 8.5 },
        Band { when: |t| *t > 500_000.0, score: 8.0 },
        Band { when: |t| *t > 100_000.0, score: 7.5 },
        Band { when: |t| *t > 50_000.0, score: 7.0 },
        Band { when: |t| *t > 10_000.0, score: 6.0 },
    ],
    otherwise: 0.0,
};

pub static ENGAGEMENT_BY_RANK: BandTable<u32> = BandTable {
    name: "community_engagement.rank",
    bands: &[
        Band { when: |r| *r <= 10, score: 9.0 },
        Band { when: |r| *r <= 30, score: 8.5 },
        Band { when: |r| *r <= 50, score: 8.0 },
        Band { when: |r| *r <= 100, score: 7.5 },
    ],
    otherwise: 6.5,
};

/// Upvote percentage
pub static MARKETING: BandTable<f64> = BandTable {
    name: "marketing_approach",
    bands: &[
        Band { when: |s| *s > 80.0, score: 9.0 },
        Band { when: |s| *s > 65.0, score: 8.0 },
        Band { when: |s| *s > 50.0, score: 7.0 },
        Band { when: |s| *s > 40.0, score: 6.0 },
    ],
    otherwise: 5.0,
};

pub static NETWORK_PRESENCE: BandTable<CommunityStats> = BandTable {
    name: "network_presence",
    bands: &[
        Band {
            when: |c| c.twitter_followers > 1_000_000.0 && c.reddit_subscribers > 100_000.0,
            score: 9.5,
        },
        Band {
            when: |c| c.twitter_followers > 500_000.0 || c.reddit_subscribers > 100_000.0,
            score: 9.0,
        },
        Band {
            when: |c| c.twitter_followers > 200_000.0 || c.reddit_subscribers > 50_000.0,
            score: 8.5,
        },
        Band {
            when: |c| c.twitter_followers > 100_000.0 || c.reddit_subscribers > 20_000.0,
            score: 8.0,
        },
        Band {
            when: |c| c.twitter_followers > 50_000.0 || c.reddit_subscribers > 10_000.0,
            score: 7.5,
        },
        Band {
            when: |c| c.twitter_followers > 10_000.0 || c.reddit_subscribers > 5_000.0,
            score: 7.0,
        },
    ],
    otherwise: 0.0,
};

pub static NETWORK_PRESENCE_BY_RANK: BandTable<u32> = BandTable {
    name: "network_presence.rank",
    bands: &[
        Band { when: |r| *r <= 30, score: 8.0 },
        Band { when: |r| *r <= 100, score: 7.5 },
    ],
    otherwise: 6.5,
};

/// Reddit accounts active in the last 48h
pub static COMMUNITY_HEALTH: BandTable<f64> = BandTable {
    name: "community_health",
    bands: &[
        Band { when: |a| *a > 10_000.0, score: 9.0 },
        Band { when: |a| *a > 5_000.0, score: 8.5 },
        Band { when: |a| *a > 2_000.0, score: 8.0 },
        Band { when: |a| *a > 1_000.0, score: 7.5 },
        Band { when: |a| *a > 500.0, score: 7.0 },
        Band { when: |a| *a > 100.0, score: 6.5 },
    ],
    otherwise: 0.0,
};

pub static COMMUNITY_HEALTH_BY_RANK: BandTable<u32> = BandTable {
    name: "community_health.rank",
    bands: &[
        Band { when: |r| *r <= 20, score: 8.5 },
        Band { when: |r| *r <= 50, score: 8.0 },
        Band { when: |r| *r <= 100, score: 7.5 },
    ],
    otherwise: 7.0,
};

pub fn team_transparency(facts: &NormalizedFacts) -> f64 {
    let base = TRANSPARENCY.score(&facts.links.channel_count());
    TRANSPARENCY_FLOOR.floor(base, &facts.rank_age())
}

pub fn documentation_quality(facts: &NormalizedFacts) -> f64 {
    DOCUMENTATION.score(&Documentation {
        has_whitepaper: facts.links.has_whitepaper,
        description_chars: facts.description.chars().count(),
    })
}

pub fn community_engagement(facts: &NormalizedFacts) -> f64 {
    ENGAGEMENT
        .first_match(&facts.community.total_followers())
        .unwrap_or_else(|| ENGAGEMENT_BY_RANK.score(&facts.rank))
}

pub fn network_presence(facts: &NormalizedFacts) -> f64 {
    NETWORK_PRESENCE
        .first_match(&facts.community)
        .unwrap_or_else(|| NETWORK_PRESENCE_BY_RANK.score(&facts.rank))
}

pub fn community_health(facts: &NormalizedFacts) -> f64 {
    COMMUNITY_HEALTH
        .first_match(&facts.community.reddit_active_48h)
        .unwrap_or_else(|| COMMUNITY_HEALTH_BY_RANK.score(&facts.rank))
}

/// Compute the social metric set
pub fn analyze(facts: &NormalizedFacts) -> SocialMetrics {
    SocialMetrics {
        team_transparency: team_transparency(facts),
        team_experience: TEAM_EXPERIENCE.score(&facts.rank_age()),
        documentation_quality: documentation_quality(facts),
        community_engagement: community_engagement(facts),
        marketing_approach: MARKETING.score(&facts.sentiment_up_pct),
        network_presence: network_presence(facts),
        community_health: community_health(facts),
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
    fn test_transparency_counts_channels() {
        let f = facts(json!({
            "market_data": {"market_cap_rank": 900},
            "basic_info": {"links": {
                "homepage": ["https://example.org"],
                "whitepaper": "https://example.org/wp.pdf",
                "chat_url": ["https://t.me/example"]
            }}
        }));
        assert_eq!(team_transparency(&f), 8.5);

        let bare = facts(json!({"market_data": {"market_cap_rank": 900}}));
        assert_eq!(team_transparency(&bare), 4.0);
    }

    #[test]
    fn test_transparency_floor_for_established() {
        // rank 20 infers age 6y
        let f = facts(json!({"market_data": {"market_cap_rank": 20}}));
        assert_eq!(team_transparency(&f), 8.5);
    }

    #[test]
    fn test_documentation_bands() {
        let doc = |has_whitepaper, description_chars| Documentation {
            has_whitepaper,
            description_chars,
        };
        assert_eq!(DOCUMENTATION.score(&doc(true, 1500)), 9.0);
        assert_eq!(DOCUMENTATION.score(&doc(true, 600)), 8.5);
        assert_eq!(DOCUMENTATION.score(&doc(false, 1500)), 8.0);
        assert_eq!(DOCUMENTATION.score(&doc(true, 100)), 6.0);
        assert_eq!(DOCUMENTATION.score(&doc(false, 0)), 5.0);
    }

    #[test]
    fn test_engagement_falls_back_to_rank() {
        let f = facts(json!({"market_data": {"market_cap_rank": 3}}));
        assert_eq!(community_engagement(&f), 9.0);

        let f = facts(json!({
            "market_data": {"market_cap_rank": 3},
            "basic_info": {"community_data": {
                "twitter_followers": 30_000, "reddit_subscribers": 15_000, "telegram_channel_user_count": 10_000
            }}
        }));
        assert_eq!(community_engagement(&f), 7.0);
    }

    #[test]
    fn test_network_presence() {
        let f = facts(json!({
            "market_data": {"market_cap_rank": 500},
            "basic_info": {"community_data": {"twitter_followers": 6_000_000, "reddit_subscribers": 4_000_000}}
        }));
        assert_eq!(network_presence(&f), 9.5);

        let f = facts(json!({"market_data": {"market_cap_rank": 500}}));
        assert_eq!(network_presence(&f), 6.5);
    }

    #[test]
    fn test_community_health_fallback() {
        let f = facts(json!({"market_data": {"market_cap_rank": 45}}));
        assert_eq!(community_health(&f), 8.0);

        let f = facts(json!({
            "market_data": {"market_cap_rank": 45},
            "basic_info": {"community_data": {"reddit_accounts_active_48h": 12_000}}
        }));
        assert_eq!(community_health(&f), 9.0);
    }

    #[test]
    fn test_marketing_default_sentiment() {
        // missing sentiment defaults to 50, which is not > 50
        let f = facts(json!({}));
        assert_eq!(analyze(&f).marketing_approach, 6.0);
    }
}
