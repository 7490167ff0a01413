//! The eight analysis agents and their shared schema types.
//!
//! Each agent wraps one capability behind a single `analyze` operation
//! returning a fixed-schema report. Agents own their oracle/metadata calls
//! and their failure handling: every failure path degrades to a
//! schema-complete report rather than an error, so downstream consumers
//! never branch on whether an agent actually ran.

mod citations;
mod funding;
mod journals;
mod methodology;
mod plagiarism;
mod results;
mod suite;
mod visualization;
mod writing;

pub use citations::*;
pub use funding::*;
pub use journals::*;
pub use methodology::*;
pub use plagiarism::*;
pub use results::*;
pub use suite::*;
pub use visualization::*;
pub use writing::*;

use serde::{Deserialize, Serialize};

// ============================================================================
// Shared Utilities
// ============================================================================

/// Truncate a string to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ============================================================================
// Agent identifiers
// ============================================================================

/// The eight analysis agents, in reference pipeline order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Key-findings extraction from the results section.
    Results,
    /// Writing quality coaching across sections.
    Writing,
    /// Methodology critique.
    Methodology,
    /// Figure and chart critique.
    Visualization,
    /// Related-literature search and citation context.
    Citations,
    /// Plagiarism and integrity check.
    Plagiarism,
    /// Journal submission recommendations.
    Journals,
    /// Funding source recommendations.
    Funding,
}

impl AgentKind {
    /// All agents in reference pipeline order.
    pub const ALL: [AgentKind; 8] = [
        AgentKind::Results,
        AgentKind::Writing,
        AgentKind::Methodology,
        AgentKind::Visualization,
        AgentKind::Citations,
        AgentKind::Plagiarism,
        AgentKind::Journals,
        AgentKind::Funding,
    ];

    /// Get the agent name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Results => "results",
            AgentKind::Writing => "writing",
            AgentKind::Methodology => "methodology",
            AgentKind::Visualization => "visualization",
            AgentKind::Citations => "citations",
            AgentKind::Plagiarism => "plagiarism",
            AgentKind::Journals => "journals",
            AgentKind::Funding => "funding",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "results" => Ok(AgentKind::Results),
            "writing" => Ok(AgentKind::Writing),
            "methodology" => Ok(AgentKind::Methodology),
            "visualization" => Ok(AgentKind::Visualization),
            "citations" => Ok(AgentKind::Citations),
            "plagiarism" => Ok(AgentKind::Plagiarism),
            "journals" => Ok(AgentKind::Journals),
            "funding" => Ok(AgentKind::Funding),
            _ => Err(format!("Unknown agent: {}", s)),
        }
    }
}

// ============================================================================
// Shared score and categorical types
// ============================================================================

/// A numeric quality score that may be not-applicable.
///
/// Replaces the loose "number or the string `\"N/A\"`" union of the wire
/// format with a tagged variant; the textual `"N/A"` survives only at the
/// serialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Score {
    /// A known numeric value.
    Known(f64),
    /// Not applicable / not assessed.
    #[default]
    NotApplicable,
}

impl Score {
    /// The numeric value, if known
    pub fn known(&self) -> Option<f64> {
        match self {
            Score::Known(v) => Some(*v),
            Score::NotApplicable => None,
        }
    }

    /// Whether this score is the not-applicable sentinel
    pub fn is_na(&self) -> bool {
        matches!(self, Score::NotApplicable)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Score::Known(v) => write!(f, "{}", v),
            Score::NotApplicable => write!(f, "N/A"),
        }
    }
}

impl From<f64> for Score {
    fn from(v: f64) -> Self {
        Score::Known(v)
    }
}

impl Serialize for Score {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Known(v) => serializer.serialize_f64(*v),
            Score::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Score::Known)
                .ok_or_else(|| serde::de::Error::custom("score out of f64 range")),
            serde_json::Value::String(_) | serde_json::Value::Null => Ok(Score::NotApplicable),
            other => Err(serde::de::Error::custom(format!(
                "expected number or \"N/A\", got {}",
                other
            ))),
        }
    }
}

/// Strength-of-evidence rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum EvidenceStrength {
    Weak,
    Moderate,
    Strong,
    #[default]
    Unknown,
}

impl EvidenceStrength {
    /// Wire-format name
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceStrength::Weak => "weak",
            EvidenceStrength::Moderate => "moderate",
            EvidenceStrength::Strong => "strong",
            EvidenceStrength::Unknown => "unknown",
        }
    }

    /// Whether this is an assessed (non-sentinel) value
    pub fn is_known(&self) -> bool {
        !matches!(self, EvidenceStrength::Unknown)
    }
}

impl std::fmt::Display for EvidenceStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Risk rating used by the plagiarism agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl RiskLevel {
    /// Wire-format name
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence rating used by the recommendation agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl ConfidenceLevel {
    /// Wire-format name
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Agent report union
// ============================================================================

/// The structured result of one agent slot: executed, skipped, or placeholder.
///
/// Serializes as the inner report alone, so a skipped report is structurally
/// indistinguishable from an executed one except for its flag and content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
#[allow(missing_docs)]
pub enum AgentReport {
    Results(ResultsReport),
    Writing(WritingReport),
    Methodology(MethodologyReport),
    Visualization(VisualizationReport),
    Citations(CitationReport),
    Plagiarism(PlagiarismReport),
    Journals(JournalReport),
    Funding(FundingReport),
}

impl AgentReport {
    /// Which agent this report belongs to
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentReport::Results(_) => AgentKind::Results,
            AgentReport::Writing(_) => AgentKind::Writing,
            AgentReport::Methodology(_) => AgentKind::Methodology,
            AgentReport::Visualization(_) => AgentKind::Visualization,
            AgentReport::Citations(_) => AgentKind::Citations,
            AgentReport::Plagiarism(_) => AgentKind::Plagiarism,
            AgentReport::Journals(_) => AgentKind::Journals,
            AgentReport::Funding(_) => AgentKind::Funding,
        }
    }

    /// Schema-complete placeholder for an agent that was not selected.
    ///
    /// Total over [`AgentKind`]: list fields empty, scores `"N/A"`,
    /// categorical fields `unknown`, and the skip flag set.
    pub fn skipped(kind: AgentKind) -> AgentReport {
        match kind {
            AgentKind::Results => AgentReport::Results(ResultsReport::skipped()),
            AgentKind::Writing => AgentReport::Writing(WritingReport::skipped()),
            AgentKind::Methodology => AgentReport::Methodology(MethodologyReport::skipped()),
            AgentKind::Visualization => {
                AgentReport::Visualization(VisualizationReport::skipped())
            }
            AgentKind::Citations => AgentReport::Citations(CitationReport::skipped()),
            AgentKind::Plagiarism => AgentReport::Plagiarism(PlagiarismReport::skipped()),
            AgentKind::Journals => AgentReport::Journals(JournalReport::skipped()),
            AgentKind::Funding => AgentReport::Funding(FundingReport::skipped()),
        }
    }

    /// Whether this report carries the not-executed flag
    pub fn is_skipped(&self) -> bool {
        match self {
            AgentReport::Results(r) => r.skipped,
            AgentReport::Writing(r) => r.skipped,
            AgentReport::Methodology(r) => r.skipped,
            AgentReport::Visualization(r) => r.skipped,
            AgentReport::Citations(r) => r.skipped,
            AgentReport::Plagiarism(r) => r.skipped,
            AgentReport::Journals(r) => r.skipped,
            AgentReport::Funding(r) => r.skipped,
        }
    }
}

/// Note embedded in placeholder reports for agents the caller did not select.
pub const NOT_SELECTED_NOTE: &str = "Agent not selected";
