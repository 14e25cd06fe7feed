//! Report rendering
//!
//! Text, Markdown and JSON views of classification results. Scores are
//! rounded to two decimals here and nowhere else.

use clap::ValueEnum;
use std::fmt::Write;

use crate::models::{AppResult, AxisScores, BatchOutcome, ClassificationResult, MetricSets};
use crate::models::{EconomicMetrics, SocialMetrics, TechnicalMetrics};
use crate::utils::constants::SCORE_BAR_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Round to two decimals for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Copy of a result with presentation rounding applied
pub fn rounded(result: &ClassificationResult) -> ClassificationResult {
    let mut out = result.clone();
    out.final_score = round2(out.final_score);
    out.axis_scores = out.axis_scores.map(|a| AxisScores {
        technical: round2(a.technical),
        economic: round2(a.economic),
        social: round2(a.social),
    });
    out
}

/// `█` for each filled cell of a 0-100 score
pub fn score_bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * SCORE_BAR_WIDTH as f64).round() as usize;
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(SCORE_BAR_WIDTH - filled));
    bar
}

pub fn render(result: &ClassificationResult, format: ReportFormat) -> AppResult<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&rounded(result))?),
        ReportFormat::Markdown => Ok(render_markdown(result)),
        ReportFormat::Text => Ok(render_text(result)),
    }
}

pub fn render_batch(outcomes: &[BatchOutcome], format: ReportFormat) -> AppResult<String> {
    match format {
        ReportFormat::Json => {
            let rounded: Vec<BatchOutcome> = outcomes
                .iter()
                .map(|o| match o {
                    BatchOutcome::Success(r) => BatchOutcome::Success(Box::new(rounded(r))),
                    other => other.clone(),
                })
                .collect();
            Ok(serde_json::to_string_pretty(&rounded)?)
        }
        ReportFormat::Markdown => Ok(batch_markdown(outcomes)),
        ReportFormat::Text => Ok(batch_text(outcomes)),
    }
}

// ============================================
// Text
// ============================================

fn render_text(r: &ClassificationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  {} ({})", r.name, r.symbol);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "  Final Score:  {:>6.2}/100  [{}]",
        r.final_score,
        score_bar(r.final_score)
    );
    let _ = writeln!(out, "  Grade:        {}", r.letter_grade.as_str());
    let _ = writeln!(out, "  Risk:         {} {}", r.risk_tier.emoji(), r.risk_tier.as_str());
    let _ = writeln!(out, "  Category:     {}", r.category.as_str());
    let _ = writeln!(
        out,
        "  Fraud:        {:.1}% ({})",
        r.fraud_probability_pct,
        r.scam_type.as_str()
    );

    if let Some(axes) = &r.axis_scores {
        let _ = writeln!(out, "{}", THIN_RULE);
        for (label, score) in [
            ("Technical", axes.technical),
            ("Economic", axes.economic),
            ("Social", axes.social),
        ] {
            let _ = writeln!(out, "  {:<12}  {:>6.2}  [{}]", label, score, score_bar(score));
        }
    }

    if let Some(metrics) = &r.metric_sets {
        let _ = writeln!(out, "{}", THIN_RULE);
        for (axis, rows) in metric_rows(metrics) {
            let _ = writeln!(out, "  {}", axis);
            for (name, value) in rows {
                let _ = writeln!(out, "    {:<28} {:>5.1}/10", name, value);
            }
        }
    }

    if r.is_known_scam {
        let _ = writeln!(out, "{}", THIN_RULE);
        if let Some(description) = &r.scam_description {
            let _ = writeln!(out, "  Description:  {}", description);
        }
        if let Some(date) = &r.collapse_date {
            let _ = writeln!(out, "  Collapsed:    {}", date);
        }
        if let Some(losses) = &r.estimated_losses {
            let _ = writeln!(out, "  Losses:       {}", display_value(losses));
        }
    }

    text_list(&mut out, "⚠️  Warnings", &r.warnings);
    text_list(&mut out, "🚩 Red Flags", &r.red_flags);
    text_list(&mut out, "✅ Strengths", &r.strengths);
    text_list(&mut out, "❌ Weaknesses", &r.weaknesses);

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "  scoring {} | {}",
        r.scoring_version,
        r.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out
}

fn text_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}", THIN_RULE);
    let _ = writeln!(out, "  {}", title);
    for item in items {
        let _ = writeln!(out, "    • {}", item);
    }
}

fn batch_text(outcomes: &[BatchOutcome]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "  {:<22} {:<8} {:>7} {:<5} {:>7}  {}",
        "Name", "Symbol", "Score", "Grade", "Fraud", "Risk"
    );
    let _ = writeln!(out, "{}", THIN_RULE);
    for outcome in outcomes {
        match outcome {
            BatchOutcome::Success(r) => {
                let _ = writeln!(
                    out,
                    "  {:<22} {:<8} {:>7.2} {:<5} {:>6.1}%  {}",
                    truncate(&r.name, 22),
                    truncate(&r.symbol, 8),
                    r.final_score,
                    r.letter_grade.as_str(),
                    r.fraud_probability_pct,
                    r.risk_tier.as_str()
                );
            }
            BatchOutcome::Error { identifier, code, .. } => {
                let _ = writeln!(
                    out,
                    "  {:<22} {:<8} {:>7} {:<5} {:>7}  {}",
                    truncate(identifier, 22),
                    "-",
                    "ERROR",
                    "-",
                    "-",
                    code
                );
            }
        }
    }
    let _ = writeln!(out, "{}", RULE);
    out
}

// ============================================
// Markdown
// ============================================

fn render_markdown(r: &ClassificationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} ({})\n", r.name, r.symbol);
    let _ = writeln!(out, "| Field | Value |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Final Score | {:.2}/100 |", r.final_score);
    let _ = writeln!(out, "| Grade | {} |", r.letter_grade.as_str());
    let _ = writeln!(out, "| Risk | {} |", r.risk_tier.as_str());
    let _ = writeln!(out, "| Category | {} |", r.category.as_str());
    let _ = writeln!(out, "| Fraud Probability | {:.1}% |", r.fraud_probability_pct);
    let _ = writeln!(out, "| Scam Type | {} |", r.scam_type.as_str());
    if let Some(description) = &r.scam_description {
        let _ = writeln!(out, "| Description | {} |", description);
    }
    if let Some(date) = &r.collapse_date {
        let _ = writeln!(out, "| Collapse Date | {} |", date);
    }
    if let Some(losses) = &r.estimated_losses {
        let _ = writeln!(out, "| Estimated Losses | {} |", display_value(losses));
    }

    if let Some(axes) = &r.axis_scores {
        let _ = writeln!(out, "\n## Axis Scores\n");
        let _ = writeln!(out, "| Axis | Score |");
        let _ = writeln!(out, "|---|---|");
        let _ = writeln!(out, "| Technical | {:.2} |", axes.technical);
        let _ = writeln!(out, "| Economic | {:.2} |", axes.economic);
        let _ = writeln!(out, "| Social | {:.2} |", axes.social);
    }

    if let Some(metrics) = &r.metric_sets {
        for (axis, rows) in metric_rows(metrics) {
            let _ = writeln!(out, "\n### {} Metrics\n", axis);
            let _ = writeln!(out, "| Metric | Score |");
            let _ = writeln!(out, "|---|---|");
            for (name, value) in rows {
                let _ = writeln!(out, "| {} | {:.1} |", name, value);
            }
        }
    }

    md_list(&mut out, "Warnings", &r.warnings);
    md_list(&mut out, "Red Flags", &r.red_flags);
    md_list(&mut out, "Strengths", &r.strengths);
    md_list(&mut out, "Weaknesses", &r.weaknesses);

    let _ = writeln!(
        out,
        "\n_Scoring {} at {}_",
        r.scoring_version,
        r.timestamp.to_rfc3339()
    );
    out
}

fn md_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n## {}\n", title);
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
}

fn batch_markdown(outcomes: &[BatchOutcome]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "| Name | Symbol | Score | Grade | Risk | Category | Fraud |");
    let _ = writeln!(out, "|---|---|---|---|---|---|---|");
    for outcome in outcomes {
        match outcome {
            BatchOutcome::Success(r) => {
                let _ = writeln!(
                    out,
                    "| {} | {} | {:.2} | {} | {} | {} | {:.1}% |",
                    r.name,
                    r.symbol,
                    r.final_score,
                    r.letter_grade.as_str(),
                    r.risk_tier.as_str(),
                    r.category.as_str(),
                    r.fraud_probability_pct
                );
            }
            BatchOutcome::Error {
                identifier,
                code,
                message,
            } => {
                let _ = writeln!(
                    out,
                    "| {} | - | ERROR | - | {} | {} | - |",
                    identifier, code, message
                );
            }
        }
    }
    out
}

// ============================================
// Scam type definitions
// ============================================

/// Registry definition of a known scam's type, appended below the report.
/// JSON output stays a bare result, so it gets no appendix.
pub fn scam_type_section(
    label: &str,
    definition: &serde_json::Value,
    format: ReportFormat,
) -> Option<String> {
    let fields: Vec<(String, String)> = match definition {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), display_value(v)))
            .collect(),
        other => vec![("definition".to_string(), display_value(other))],
    };

    let mut out = String::new();
    match format {
        ReportFormat::Json => return None,
        ReportFormat::Text => {
            let _ = writeln!(out, "📖 Scam type '{}':", label);
            for (key, value) in &fields {
                let _ = writeln!(out, "   {}: {}", key, value);
            }
        }
        ReportFormat::Markdown => {
            let _ = writeln!(out, "## Scam Type: {}\n", label);
            for (key, value) in &fields {
                let _ = writeln!(out, "- **{}**: {}", key, value);
            }
        }
    }
    Some(out)
}

// ============================================
// Helpers
// ============================================

fn metric_rows(m: &MetricSets) -> Vec<(&'static str, Vec<(&'static str, f64)>)> {
    vec![
        ("Technical", named(TechnicalMetrics::NAMES.iter(), &m.technical.values())),
        ("Economic", named(EconomicMetrics::NAMES.iter(), &m.economic.values())),
        ("Social", named(SocialMetrics::NAMES.iter(), &m.social.values())),
    ]
}

fn named<'a>(
    names: impl Iterator<Item = &'a &'static str>,
    values: &[f64],
) -> Vec<(&'static str, f64)> {
    names.copied().zip(values.iter().copied()).collect()
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
