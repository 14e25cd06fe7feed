//! Constants Module - Single Source of Truth
//!
//! Every constant, keyword list and default used across the application
//! is defined here. No hardcoded values in other modules.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "CoinClassifier";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = concat!("CoinClassifier/", env!("CARGO_PKG_VERSION"));

/// Version tag of the built-in scoring configuration
pub const SCORING_VERSION: &str = "2024.1";

// ============================================
// PROVIDER CONSTANTS
// ============================================

/// CoinGecko public API root
pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Header carrying the CoinGecko demo key
pub const COINGECKO_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Default timeout per provider request (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default payload cache TTL (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Gap between requests with an API key (ms)
pub const KEYED_PACING_MS: u64 = 500;
/// Attempts per request with an API key
pub const KEYED_MAX_ATTEMPTS: u32 = 5;
/// Public endpoint allows ~10 requests per minute (ms)
pub const PUBLIC_PACING_MS: u64 = 6_000;
/// Attempts per request without an API key
pub const PUBLIC_MAX_ATTEMPTS: u32 = 3;

/// First wait after an HTTP 429 (ms)
pub const RATE_LIMIT_BASE_WAIT_MS: u64 = 65_000;
/// Added to the 429 wait on every further attempt (ms)
pub const RATE_LIMIT_STEP_MS: u64 = 30_000;
/// Wait after a transport or HTTP error (ms)
pub const ERROR_RETRY_WAIT_MS: u64 = 10_000;
/// Jitter applied to every wait (fraction)
pub const RETRY_JITTER: f64 = 0.2;

// ============================================
// REGISTRY CONSTANTS
// ============================================

/// Default location of the scam registry document
pub const DEFAULT_REGISTRY_PATH: &str = "scam_indicators.json";

/// Risk multiplier when the market cap is unknown or no thresholds exist
pub const DEFAULT_RISK_MULTIPLIER: f64 = 1.2;

// ============================================
// NORMALIZER DEFAULTS
// ============================================

/// Rank used when no rank can be resolved
pub const DEFAULT_RANK: u32 = 9999;

/// Upvote share assumed when the provider has none
pub const DEFAULT_SENTIMENT_PCT: f64 = 50.0;

/// Drawdown assumed when the provider reports no ATH change
pub const DEFAULT_ATH_CHANGE_PCT: f64 = -50.0;

/// Days per year for age computation
pub const DAYS_PER_YEAR: f64 = 365.0;

// ============================================
// CATEGORY KEYWORDS
// ============================================

/// Category fragments that mark a token (smart contract exposure)
pub const TOKEN_CATEGORY_KEYWORDS: [&str; 3] = ["token", "erc", "bep"];

/// Category fragments that mark a project with its own chain
pub const LAYER1_CATEGORY_KEYWORDS: [&str; 7] = [
    "layer 1",
    "layer 0",
    "layer-1",
    "layer-0",
    "smart contract platform",
    "proof of stake",
    "proof of work",
];

/// Infrastructure-like category fragments
pub const INFRA_CATEGORY_KEYWORDS: [&str; 4] =
    ["blockchain", "protocol", "infrastructure", "ecosystem"];

// ============================================
// SCAM HEURISTICS
// ============================================

/// Hype tokens looked up in the project name (+5 each)
pub const HYPE_NAME_TOKENS: [&str; 13] = [
    "safe", "moon", "elon", "doge", "shiba", "inu", "baby", "mini", "floki", "100x", "1000x",
    "rocket", "gem",
];

/// Phrases looked up in the description (+10 each)
pub const RED_FLAG_PHRASES: [&str; 10] = [
    "guaranteed return",
    "risk free",
    "100x",
    "1000x",
    "next bitcoin",
    "get rich",
    "passive income",
    "dont miss",
    "don't miss",
    "limited time",
];

/// Description fragments that point to a Ponzi structure
pub const PONZI_PHRASES: [&str; 2] = ["passive income", "guaranteed"];

pub const HYPE_TOKEN_POINTS: u32 = 5;
pub const RED_FLAG_PHRASE_POINTS: u32 = 10;

/// Market rules only apply beyond these ranks
pub const MICRO_CAP_RANK: u32 = 200;
pub const LOW_RANK: u32 = 100;

pub const MICRO_CAP_USD: f64 = 1_000_000.0;
pub const SMALL_CAP_USD: f64 = 10_000_000.0;
pub const MICRO_CAP_POINTS: u32 = 15;
pub const SMALL_CAP_POINTS: u32 = 8;

pub const ATH_COLLAPSE_PCT: f64 = -99.0;
pub const ATH_CRASH_PCT: f64 = -95.0;
pub const ATH_COLLAPSE_POINTS: u32 = 25;
pub const ATH_CRASH_POINTS: u32 = 15;

pub const DEAD_VOLUME_USD: f64 = 1_000.0;
pub const THIN_VOLUME_USD: f64 = 10_000.0;
pub const DEAD_VOLUME_POINTS: u32 = 20;
pub const THIN_VOLUME_POINTS: u32 = 10;

// ============================================
// REPORTING
// ============================================

/// Number of cells in a text score bar
pub const SCORE_BAR_WIDTH: usize = 20;

/// Warning attached to every known-scam report
pub const KNOWN_SCAM_WARNING: &str = "WARNING: This project is a confirmed scam. Avoid!";

// ============================================
// API
// ============================================

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Max identifiers per batch request
pub const MAX_BATCH_SIZE: usize = 100;
/// Max concurrent classifications per batch
pub const MAX_BATCH_CONCURRENCY: usize = 20;
/// Concurrency used when the request names none
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Requests per minute per client
pub const RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Directory for telemetry exports
pub const TELEMETRY_DIR: &str = "telemetry";

// ============================================
// HELPER FUNCTIONS
// ============================================

/// Registry key form: lowercase, spaces and underscores become '-'
pub fn normalize_key(identifier: &str) -> String {
    identifier.trim().to_lowercase().replace([' ', '_'], "-")
}

/// Provider id form: lowercase, spaces become '-'
pub fn to_coin_id(identifier: &str) -> String {
    identifier.trim().to_lowercase().replace(' ', "-")
}
