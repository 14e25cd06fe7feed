//! Field Normalizer
//!
//! Turns a raw provider payload into typed `NormalizedFacts`.
//! Each fact has a declared fallback chain of JSON pointers; the first
//! present value wins, otherwise the fact's default applies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

use crate::core::bands::{RankAge, AGE_FROM_RANK};
use crate::models::RawProjectPayload;
use crate::utils::constants::{
    DAYS_PER_YEAR, DEFAULT_ATH_CHANGE_PCT, DEFAULT_RANK, DEFAULT_SENTIMENT_PCT,
    TOKEN_CATEGORY_KEYWORDS,
};

// ============================================
// Fallback chains
// ============================================

/// Ordered source locations for one numeric fact
pub struct FieldChain {
    pub fact: &'static str,
    pub pointers: &'static [&'static str],
    /// Treat 0 like a missing value and keep looking
    pub zero_is_absent: bool,
}

impl FieldChain {
    /// First usable number along the chain
    pub fn resolve(&self, payload: &Value) -> Option<f64> {
        self.pointers
            .iter()
            .filter_map(|ptr| payload.pointer(ptr).and_then(as_number))
            .find(|v| v.is_finite() && !(self.zero_is_absent && *v == 0.0))
    }
}

pub static RANK: FieldChain = FieldChain {
    fact: "rank",
    pointers: &[
        "/market_data/market_cap_rank",
        "/basic_info/market_data/market_cap_rank",
    ],
    zero_is_absent: true,
};

pub static MARKET_CAP: FieldChain = FieldChain {
    fact: "market_cap",
    pointers: &[
        "/market_data/market_cap",
        "/basic_info/market_data/market_cap/usd",
    ],
    zero_is_absent: true,
};

pub static VOLUME_24H: FieldChain = FieldChain {
    fact: "volume_24h",
    pointers: &[
        "/market_data/total_volume",
        "/basic_info/market_data/total_volume/usd",
    ],
    zero_is_absent: true,
};

pub static MAX_SUPPLY: FieldChain = FieldChain {
    fact: "max_supply",
    pointers: &[
        "/basic_info/market_data/max_supply",
        "/market_data/max_supply",
    ],
    zero_is_absent: true,
};

pub static CIRCULATING_SUPPLY: FieldChain = FieldChain {
    fact: "circulating_supply",
    pointers: &[
        "/basic_info/market_data/circulating_supply",
        "/market_data/circulating_supply",
    ],
    zero_is_absent: true,
};

/// A price sitting exactly at its ATH reports 0, which is meaningful
pub static ATH_CHANGE_PCT: FieldChain = FieldChain {
    fact: "ath_change_pct",
    pointers: &[
        "/basic_info/market_data/ath_change_percentage/usd",
        "/market_data/ath_change_percentage",
    ],
    zero_is_absent: false,
};

pub static PRICE_CHANGE_7D: FieldChain = FieldChain {
    fact: "price_change_7d",
    pointers: &[
        "/market_data/price_change_percentage_7d_in_currency",
        "/basic_info/market_data/price_change_percentage_7d",
    ],
    zero_is_absent: true,
};

pub static PRICE_CHANGE_30D: FieldChain = FieldChain {
    fact: "price_change_30d",
    pointers: &[
        "/market_data/price_change_percentage_30d_in_currency",
        "/basic_info/market_data/price_change_percentage_30d",
    ],
    zero_is_absent: true,
};

pub static SENTIMENT_UP_PCT: FieldChain = FieldChain {
    fact: "sentiment_up_pct",
    pointers: &["/basic_info/sentiment_votes_up_percentage"],
    zero_is_absent: true,
};

pub static GITHUB_STARS: FieldChain = FieldChain {
    fact: "stars",
    pointers: &["/basic_info/developer_data/stars"],
    zero_is_absent: true,
};

pub static GITHUB_FORKS: FieldChain = FieldChain {
    fact: "forks",
    pointers: &["/basic_info/developer_data/forks"],
    zero_is_absent: true,
};

pub static COMMITS_4W: FieldChain = FieldChain {
    fact: "commit_count_4_weeks",
    pointers: &["/basic_info/developer_data/commit_count_4_weeks"],
    zero_is_absent: true,
};

pub static TWITTER_FOLLOWERS: FieldChain = FieldChain {
    fact: "twitter_followers",
    pointers: &["/basic_info/community_data/twitter_followers"],
    zero_is_absent: true,
};

pub static REDDIT_SUBSCRIBERS: FieldChain = FieldChain {
    fact: "reddit_subscribers",
    pointers: &["/basic_info/community_data/reddit_subscribers"],
    zero_is_absent: true,
};

pub static TELEGRAM_USERS: FieldChain = FieldChain {
    fact: "telegram_channel_user_count",
    pointers: &["/basic_info/community_data/telegram_channel_user_count"],
    zero_is_absent: true,
};

pub static REDDIT_ACTIVE_48H: FieldChain = FieldChain {
    fact: "reddit_accounts_active_48h",
    pointers: &["/basic_info/community_data/reddit_accounts_active_48h"],
    zero_is_absent: true,
};

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

// ============================================
// Normalized facts
// ============================================

/// Channels and links the project publishes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectLinks {
    pub has_homepage: bool,
    pub has_whitepaper: bool,
    pub has_chat: bool,
    pub has_forum: bool,
    pub has_public_repo: bool,
    pub has_explorer: bool,
}

impl ProjectLinks {
    /// Number of transparency channels (homepage, whitepaper, chat, forum)
    pub fn channel_count(&self) -> u32 {
        [
            self.has_homepage,
            self.has_whitepaper,
            self.has_chat,
            self.has_forum,
        ]
        .iter()
        .filter(|present| **present)
        .count() as u32
    }
}

/// Repository statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeveloperStats {
    pub stars: f64,
    pub forks: f64,
    pub commits_4w: f64,
}

/// Community counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityStats {
    pub twitter_followers: f64,
    pub reddit_subscribers: f64,
    pub telegram_users: f64,
    pub reddit_active_48h: f64,
}

impl CommunityStats {
    pub fn total_followers(&self) -> f64 {
        self.twitter_followers + self.reddit_subscribers + self.telegram_users
    }
}

/// Typed facts derived once per classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFacts {
    /// `DEFAULT_RANK` when unresolved, see `rank_resolved`
    pub rank: u32,
    pub rank_resolved: bool,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub age_years: f64,
    /// Age came from the rank table instead of a genesis date
    pub age_inferred: bool,
    pub max_supply: Option<f64>,
    pub circulating_supply: f64,
    /// Lowercased category labels
    pub categories: BTreeSet<String>,
    pub is_token: bool,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub coin_id: Option<String>,
    /// English description, original casing
    pub description: String,
    pub ath_change_pct: f64,
    pub price_change_7d: f64,
    pub price_change_30d: f64,
    pub sentiment_up_pct: f64,
    pub links: ProjectLinks,
    pub developer: DeveloperStats,
    pub community: CommunityStats,
}

impl NormalizedFacts {
    pub fn rank_age(&self) -> RankAge {
        RankAge {
            rank: self.rank,
            age_years: self.age_years,
        }
    }

    /// Volume as a percentage of market cap (0 when the cap is unknown)
    pub fn volume_to_cap_pct(&self) -> f64 {
        if self.market_cap > 0.0 {
            self.volume_24h / self.market_cap * 100.0
        } else {
            0.0
        }
    }

    pub fn has_category(&self, keywords: &[&str]) -> bool {
        self.categories
            .iter()
            .any(|cat| keywords.iter().any(|kw| cat.contains(kw)))
    }
}

// ============================================
// Normalizer
// ============================================

/// Rank of the payload, if any source provides one
pub fn resolve_rank(payload: &RawProjectPayload) -> Option<u32> {
    RANK.resolve(payload)
        .filter(|r| *r >= 1.0)
        .map(|r| r.min(u32::MAX as f64) as u32)
}

/// Shared rank-to-age inference used whenever the genesis date is unusable
pub fn infer_age_from_rank(rank: u32) -> f64 {
    AGE_FROM_RANK.score(&rank)
}

/// Years between `genesis` and `as_of`; None when unparseable or not in the past
pub fn age_from_genesis(genesis: &str, as_of: DateTime<Utc>) -> Option<f64> {
    let genesis = genesis.trim();
    if genesis.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(genesis, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(genesis)
                .ok()
                .map(|dt| dt.date_naive())
        })?;
    let days = (as_of.date_naive() - date).num_days();
    if days <= 0 {
        return None;
    }
    Some(days as f64 / DAYS_PER_YEAR)
}

/// Build `NormalizedFacts` from a raw payload
pub fn normalize(payload: &RawProjectPayload, as_of: DateTime<Utc>) -> NormalizedFacts {
    let basic = payload.get("basic_info").unwrap_or(&Value::Null);
    let links = basic.get("links").unwrap_or(&Value::Null);

    let rank = resolve_rank(payload);
    let rank_value = rank.unwrap_or(DEFAULT_RANK);

    let genesis_age = basic
        .get("genesis_date")
        .and_then(Value::as_str)
        .and_then(|g| age_from_genesis(g, as_of));
    let (age_years, age_inferred) = match genesis_age {
        Some(age) => (age, false),
        None => (infer_age_from_rank(rank_value), true),
    };

    let categories: BTreeSet<String> = basic
        .get("categories")
        .and_then(Value::as_array)
        .map(|cats| {
            cats.iter()
                .filter_map(Value::as_str)
                .map(|c| c.to_lowercase())
                .collect()
        })
        .unwrap_or_default();
    let is_token = categories
        .iter()
        .any(|cat| TOKEN_CATEGORY_KEYWORDS.iter().any(|kw| cat.contains(kw)));

    let description = match basic.get("description") {
        Some(Value::Object(map)) => map.get("en").and_then(Value::as_str).unwrap_or(""),
        Some(Value::String(text)) => text.as_str(),
        _ => "",
    }
    .to_string();

    let facts = NormalizedFacts {
        rank: rank_value,
        rank_resolved: rank.is_some(),
        market_cap: MARKET_CAP.resolve(payload).unwrap_or(0.0).max(0.0),
        volume_24h: VOLUME_24H.resolve(payload).unwrap_or(0.0).max(0.0),
        age_years,
        age_inferred,
        max_supply: MAX_SUPPLY.resolve(payload),
        circulating_supply: CIRCULATING_SUPPLY.resolve(payload).unwrap_or(0.0),
        categories,
        is_token,
        name: non_empty_str(basic.get("name")),
        symbol: non_empty_str(basic.get("symbol")),
        coin_id: non_empty_str(payload.get("coin_id")),
        description,
        ath_change_pct: ATH_CHANGE_PCT
            .resolve(payload)
            .unwrap_or(DEFAULT_ATH_CHANGE_PCT),
        price_change_7d: PRICE_CHANGE_7D.resolve(payload).unwrap_or(0.0),
        price_change_30d: PRICE_CHANGE_30D.resolve(payload).unwrap_or(0.0),
        sentiment_up_pct: SENTIMENT_UP_PCT
            .resolve(payload)
            .unwrap_or(DEFAULT_SENTIMENT_PCT),
        links: ProjectLinks {
            has_homepage: first_list_entry(links.get("homepage")),
            has_whitepaper: truthy(links.get("whitepaper")),
            has_chat: first_list_entry(links.get("chat_url")),
            has_forum: first_list_entry(links.get("official_forum_url")),
            has_public_repo: links
                .pointer("/repos_url/github")
                .and_then(Value::as_array)
                .is_some_and(|repos| !repos.is_empty()),
            has_explorer: links
                .get("blockchain_site")
                .and_then(Value::as_array)
                .is_some_and(|sites| sites.iter().any(|s| truthy(Some(s)))),
        },
        developer: DeveloperStats {
            stars: GITHUB_STARS.resolve(payload).unwrap_or(0.0),
            forks: GITHUB_FORKS.resolve(payload).unwrap_or(0.0),
            commits_4w: COMMITS_4W.resolve(payload).unwrap_or(0.0),
        },
        community: CommunityStats {
            twitter_followers: TWITTER_FOLLOWERS.resolve(payload).unwrap_or(0.0),
            reddit_subscribers: REDDIT_SUBSCRIBERS.resolve(payload).unwrap_or(0.0),
            telegram_users: TELEGRAM_USERS.resolve(payload).unwrap_or(0.0),
            reddit_active_48h: REDDIT_ACTIVE_48H.resolve(payload).unwrap_or(0.0),
        },
    };

    debug!(
        rank = facts.rank,
        rank_resolved = facts.rank_resolved,
        age_years = facts.age_years,
        age_inferred = facts.age_inferred,
        "facts normalized"
    );
    facts
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// JSON truthiness: non-empty strings, arrays and objects, non-zero numbers
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

/// A link field stored either as a list (first entry counts) or a string
fn first_list_entry(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Array(items)) => truthy(items.first()),
        other => truthy(other),
    }
}
