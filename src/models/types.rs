//! Type definitions for the project classifier
//! All core data structures produced by one classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque nested payload as delivered by the market data provider.
/// Read-only to the engine; any field may be missing.
pub type RawProjectPayload = serde_json::Value;

/// Risk tier of a classified project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "Very Low Risk")]
    VeryLow,
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Very High Risk")]
    VeryHigh,
    #[serde(rename = "Critical Risk - Likely Scam")]
    Critical,
}

impl RiskTier {
    pub const ALL: [RiskTier; 6] = [
        RiskTier::VeryLow,
        RiskTier::Low,
        RiskTier::Moderate,
        RiskTier::High,
        RiskTier::VeryHigh,
        RiskTier::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::VeryLow => "Very Low Risk",
            RiskTier::Low => "Low Risk",
            RiskTier::Moderate => "Moderate Risk",
            RiskTier::High => "High Risk",
            RiskTier::VeryHigh => "Very High Risk",
            RiskTier::Critical => "Critical Risk - Likely Scam",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskTier::VeryLow => "🟢",
            RiskTier::Low => "🟢",
            RiskTier::Moderate => "🟡",
            RiskTier::High => "🟠",
            RiskTier::VeryHigh => "🔴",
            RiskTier::Critical => "💀",
        }
    }
}

/// Project category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectCategory {
    /// Runs its own chain
    #[serde(rename = "Layer 1 - Own Blockchain")]
    Layer1,
    /// Legitimate project without its own chain
    #[serde(rename = "Quality Token - No Own Chain")]
    QualityToken,
    /// Scam or highly suspicious
    #[serde(rename = "Problematic/Scam Project")]
    Problematic,
    /// Never produced by the classifier; accepted when reading stored results
    #[serde(rename = "Uncategorized")]
    Uncategorized,
}

impl ProjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::Layer1 => "Layer 1 - Own Blockchain",
            ProjectCategory::QualityToken => "Quality Token - No Own Chain",
            ProjectCategory::Problematic => "Problematic/Scam Project",
            ProjectCategory::Uncategorized => "Uncategorized",
        }
    }
}

/// Known crypto scam patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScamType {
    #[serde(rename = "Ponzi Scheme")]
    PonziScheme,
    #[serde(rename = "Rug Pull")]
    RugPull,
    #[serde(rename = "Pump and Dump")]
    PumpAndDump,
    #[serde(rename = "Algorithmic Failure")]
    AlgorithmicFailure,
    #[serde(rename = "Suspected Ponzi")]
    SuspectedPonzi,
    #[serde(rename = "Exchange Token Risk")]
    ExchangeTokenRisk,
    #[serde(rename = "Honeypot")]
    Honeypot,
    #[serde(rename = "Unknown/Not Classified")]
    Unknown,
}

impl ScamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScamType::PonziScheme => "Ponzi Scheme",
            ScamType::RugPull => "Rug Pull",
            ScamType::PumpAndDump => "Pump and Dump",
            ScamType::AlgorithmicFailure => "Algorithmic Failure",
            ScamType::SuspectedPonzi => "Suspected Ponzi",
            ScamType::ExchangeTokenRisk => "Exchange Token Risk",
            ScamType::Honeypot => "Honeypot",
            ScamType::Unknown => "Unknown/Not Classified",
        }
    }

    /// Parse a registry type label such as `rug_pull`, `Rug Pull` or `PUMP-AND-DUMP`.
    /// Unrecognised labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let normalized = label
            .trim()
            .to_lowercase()
            .replace(['_', '-'], " ");
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

        match normalized.as_str() {
            "ponzi" | "ponzi scheme" => ScamType::PonziScheme,
            "rug pull" | "rugpull" => ScamType::RugPull,
            "pump and dump" | "pump dump" | "pump & dump" => ScamType::PumpAndDump,
            "algorithmic failure" | "algorithmic" => ScamType::AlgorithmicFailure,
            "suspected ponzi" => ScamType::SuspectedPonzi,
            "exchange token risk" | "exchange token" | "exchange risk" => {
                ScamType::ExchangeTokenRisk
            }
            "honeypot" | "honey pot" => ScamType::Honeypot,
            _ => ScamType::Unknown,
        }
    }
}

/// Letter grade A+ .. F
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D-")]
    DMinus,
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 13] = [
        LetterGrade::APlus,
        LetterGrade::A,
        LetterGrade::AMinus,
        LetterGrade::BPlus,
        LetterGrade::B,
        LetterGrade::BMinus,
        LetterGrade::CPlus,
        LetterGrade::C,
        LetterGrade::CMinus,
        LetterGrade::DPlus,
        LetterGrade::D,
        LetterGrade::DMinus,
        LetterGrade::F,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::F => "F",
        }
    }

    /// Case-insensitive parse of a grade label ("a+", "B-", ...)
    pub fn parse(label: &str) -> Option<Self> {
        let wanted = label.trim().to_uppercase();
        Self::ALL.into_iter().find(|g| g.as_str() == wanted)
    }
}

// ============================================
// Metric sets (one per axis, every score in [0, 10])
// ============================================

/// Technical axis sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalMetrics {
    pub code_availability: f64,
    pub architecture_quality: f64,
    pub decentralization: f64,
    pub security: f64,
    pub audit_status: f64,
    pub contract_risk: f64,
}

impl TechnicalMetrics {
    pub const NAMES: [&'static str; 6] = [
        "code_availability",
        "architecture_quality",
        "decentralization",
        "security",
        "audit_status",
        "contract_risk",
    ];

    /// Scores in the order of `NAMES`
    pub fn values(&self) -> [f64; 6] {
        [
            self.code_availability,
            self.architecture_quality,
            self.decentralization,
            self.security,
            self.audit_status,
            self.contract_risk,
        ]
    }
}

/// Economic axis sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicMetrics {
    pub distribution_fairness: f64,
    pub inflation_mechanism: f64,
    pub vesting_schedule: f64,
    pub ownership_concentration: f64,
    pub liquidity_depth: f64,
    pub manipulation_indicators: f64,
    pub tokenomics_sustainability: f64,
}

impl EconomicMetrics {
    pub const NAMES: [&'static str; 7] = [
        "distribution_fairness",
        "inflation_mechanism",
        "vesting_schedule",
        "ownership_concentration",
        "liquidity_depth",
        "manipulation_indicators",
        "tokenomics_sustainability",
    ];

    pub fn values(&self) -> [f64; 7] {
        [
            self.distribution_fairness,
            self.inflation_mechanism,
            self.vesting_schedule,
            self.ownership_concentration,
            self.liquidity_depth,
            self.manipulation_indicators,
            self.tokenomics_sustainability,
        ]
    }
}

/// Social axis sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocialMetrics {
    pub team_transparency: f64,
    pub team_experience: f64,
    pub documentation_quality: f64,
    pub community_engagement: f64,
    pub marketing_approach: f64,
    pub network_presence: f64,
    pub community_health: f64,
}

impl SocialMetrics {
    pub const NAMES: [&'static str; 7] = [
        "team_transparency",
        "team_experience",
        "documentation_quality",
        "community_engagement",
        "marketing_approach",
        "network_presence",
        "community_health",
    ];

    pub fn values(&self) -> [f64; 7] {
        [
            self.team_transparency,
            self.team_experience,
            self.documentation_quality,
            self.community_engagement,
            self.marketing_approach,
            self.network_presence,
            self.community_health,
        ]
    }
}

/// The three metric sets of one classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSets {
    pub technical: TechnicalMetrics,
    pub economic: EconomicMetrics,
    pub social: SocialMetrics,
}

/// Axis scores in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScores {
    pub technical: f64,
    pub economic: f64,
    pub social: f64,
}

// ============================================
// Scam registry record & scam signal
// ============================================

/// One entry of the known-scam registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScamRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scam_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse_date: Option<String>,
    /// Free-form: registries store both numbers and strings like "$40B"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_losses: Option<serde_json::Value>,
}

/// Fraud assessment of one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScamSignal {
    pub is_known_scam: bool,
    pub scam_type: ScamType,
    /// Fraud probability in [0, 1]
    pub probability: f64,
    pub red_flags: Vec<String>,
    pub warnings: Vec<String>,
    pub known_record: Option<ScamRecord>,
}

impl Default for ScamSignal {
    fn default() -> Self {
        Self {
            is_known_scam: false,
            scam_type: ScamType::Unknown,
            probability: 0.0,
            red_flags: Vec::new(),
            warnings: Vec::new(),
            known_record: None,
        }
    }
}

impl ScamSignal {
    /// Signal for a registry hit: probability 1.0, flags copied from the record
    pub fn known(record: ScamRecord) -> Self {
        let scam_type = record
            .scam_type
            .as_deref()
            .map(ScamType::from_label)
            .unwrap_or(ScamType::Unknown);
        Self {
            is_known_scam: true,
            scam_type,
            probability: 1.0,
            red_flags: record.red_flags.clone(),
            warnings: Vec::new(),
            known_record: Some(record),
        }
    }
}

// ============================================
// Classification result
// ============================================

/// Full outcome of one classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub identifier: String,
    pub name: String,
    pub symbol: String,
    /// 0-100, fraud penalty applied
    pub final_score: f64,
    pub letter_grade: LetterGrade,
    pub risk_tier: RiskTier,
    pub category: ProjectCategory,
    /// Absent for known-scam reports
    pub axis_scores: Option<AxisScores>,
    pub metric_sets: Option<MetricSets>,
    pub is_known_scam: bool,
    pub scam_type: ScamType,
    pub fraud_probability: f64,
    /// `fraud_probability` as a percentage, one decimal
    pub fraud_probability_pct: f64,
    pub red_flags: Vec<String>,
    pub warnings: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scam_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_losses: Option<serde_json::Value>,
    pub scoring_version: String,
    pub timestamp: DateTime<Utc>,
}

/// Round a probability in [0, 1] to a one-decimal percentage
pub fn probability_pct(probability: f64) -> f64 {
    (probability * 1000.0).round() / 10.0
}

/// Batch item: either a result or an error record; per-item failures never
/// abort the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchOutcome {
    Success(Box<ClassificationResult>),
    Error {
        identifier: String,
        code: String,
        message: String,
    },
}

impl BatchOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            BatchOutcome::Success(result) => &result.identifier,
            BatchOutcome::Error { identifier, .. } => identifier,
        }
    }

    pub fn result(&self) -> Option<&ClassificationResult> {
        match self {
            BatchOutcome::Success(result) => Some(result),
            BatchOutcome::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, BatchOutcome::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_uncategorized_result_reads_back() {
        let category: ProjectCategory = serde_json::from_str("\"Uncategorized\"").unwrap();
        assert_eq!(category, ProjectCategory::Uncategorized);
        assert_eq!(category.as_str(), "Uncategorized");
    }

    #[test]
    fn test_scam_type_labels() {
        assert_eq!(ScamType::from_label("rug_pull"), ScamType::RugPull);
        assert_eq!(ScamType::from_label("Rug Pull"), ScamType::RugPull);
        assert_eq!(ScamType::from_label("PUMP-AND-DUMP"), ScamType::PumpAndDump);
        assert_eq!(ScamType::from_label("ponzi_scheme"), ScamType::PonziScheme);
        assert_eq!(ScamType::from_label("algorithmic_failure"), ScamType::AlgorithmicFailure);
        assert_eq!(ScamType::from_label("something else"), ScamType::Unknown);
        assert_eq!(ScamType::from_label(""), ScamType::Unknown);
    }

    #[test]
    fn test_grade_parse() {
        assert_eq!(LetterGrade::parse("a+"), Some(LetterGrade::APlus));
        assert_eq!(LetterGrade::parse(" F "), Some(LetterGrade::F));
        assert_eq!(LetterGrade::parse("Z"), None);
    }

    #[test]
    fn test_enum_serialization_uses_display_names() {
        let json = serde_json::to_string(&RiskTier::Critical).unwrap();
        assert_eq!(json, "\"Critical Risk - Likely Scam\"");
        let json = serde_json::to_string(&LetterGrade::BMinus).unwrap();
        assert_eq!(json, "\"B-\"");
    }

    #[test]
    fn test_known_signal_copies_flags() {
        let record = ScamRecord {
            scam_type: Some("rug_pull".to_string()),
            red_flags: vec!["Anonymous team".to_string()],
            ..Default::default()
        };
        let signal = ScamSignal::known(record);
        assert!(signal.is_known_scam);
        assert_eq!(signal.probability, 1.0);
        assert_eq!(signal.scam_type, ScamType::RugPull);
        assert_eq!(signal.red_flags, vec!["Anonymous team".to_string()]);
    }

    #[test]
    fn test_probability_pct() {
        assert_eq!(probability_pct(0.7), 70.0);
        assert_eq!(probability_pct(0.123), 12.3);
    }
}
