use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{truncate_chars, RiskLevel, Score, NOT_SELECTED_NOTE};
use crate::ingest::PaperType;
use crate::oracle::{Message, OracleClient};
use crate::prompts::{PLAGIARISM_PROMPT, PLAGIARISM_REVIEW_PROMPT};

/// Character cap sent to the oracle
const ANALYSIS_TEXT_CAP: usize = 50_000;

/// Plagiarism and academic-integrity analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlagiarismReport {
    #[serde(rename = "_skipped")]
    pub skipped: bool,
    pub plagiarism_risk_score: Score,
    pub risk_level: RiskLevel,
    pub missing_citations: Vec<MissingCitation>,
    pub suspicious_sections: Vec<SuspiciousSection>,
    pub writing_quality_flags: Vec<WritingFlag>,
    pub overall_assessment: String,
    pub recommendations: Vec<String>,
}

/// A claim that appears to need a citation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissingCitation {
    pub text: String,
    pub reason: String,
    pub severity: RiskLevel,
}

/// A text excerpt with integrity concerns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspiciousSection {
    pub text: String,
    pub issue: String,
    pub recommendation: String,
}

/// A style inconsistency flag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WritingFlag {
    pub issue: String,
    pub location: String,
}

impl PlagiarismReport {
    /// Placeholder for an unselected agent
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            overall_assessment: NOT_SELECTED_NOTE.to_string(),
            ..Default::default()
        }
    }

    /// Degraded result after an unrecoverable oracle failure
    pub fn degraded(note: &str) -> Self {
        Self {
            overall_assessment: note.to_string(),
            ..Default::default()
        }
    }
}

/// Agent 4: detects potential plagiarism and missing citations
#[derive(Clone)]
pub struct PlagiarismDetector {
    oracle: OracleClient,
}

impl PlagiarismDetector {
    /// Create a new plagiarism detector
    pub fn new(oracle: OracleClient) -> Self {
        Self { oracle }
    }

    /// Analyze the full paper text for integrity issues.
    ///
    /// Review and meta-analysis papers get relaxed criteria: paraphrasing
    /// existing research is expected there, not suspicious.
    pub async fn analyze(&self, paper_text: &str, paper_type: PaperType) -> PlagiarismReport {
        info!("Plagiarism detector analyzing");

        let system_prompt = if paper_type.is_review() {
            info!("Using review-adjusted analysis criteria");
            PLAGIARISM_REVIEW_PROMPT
        } else {
            PLAGIARISM_PROMPT
        };

        let analysis_text = truncate_chars(paper_text, ANALYSIS_TEXT_CAP);
        let messages = vec![
            Message::system(system_prompt),
            Message::user(format!("Analyze this text:\n\n{}", analysis_text)),
        ];

        let value = match self.oracle.complete_json(messages, 0.3).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Plagiarism analysis call failed");
                return PlagiarismReport::degraded("Plagiarism analysis unavailable");
            }
        };

        match serde_json::from_value::<PlagiarismReport>(value) {
            Ok(report) => {
                info!(
                    risk_score = %report.plagiarism_risk_score,
                    risk_level = %report.risk_level,
                    missing_citations = report.missing_citations.len(),
                    suspicious = report.suspicious_sections.len(),
                    "Plagiarism analysis complete"
                );
                report
            }
            Err(e) => {
                warn!(error = %e, "Plagiarism payload did not match schema");
                PlagiarismReport::degraded("Plagiarism analysis returned an unexpected payload")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_report_shape() {
        let report = PlagiarismReport::skipped();
        assert!(report.skipped);
        assert!(report.plagiarism_risk_score.is_na());
        assert_eq!(report.risk_level, RiskLevel::Unknown);
        assert!(report.missing_citations.is_empty());
        assert_eq!(report.overall_assessment, NOT_SELECTED_NOTE);
    }

    #[test]
    fn test_report_parses_oracle_payload() {
        let report: PlagiarismReport = serde_json::from_value(serde_json::json!({
            "plagiarism_risk_score": 25,
            "risk_level": "low",
            "missing_citations": [
                {"text": "40-60% reduction", "reason": "statistical claim without source", "severity": "medium"}
            ],
            "overall_assessment": "Generally clean.",
            "recommendations": ["Add citation for prevalence claim"]
        }))
        .unwrap();

        assert_eq!(report.plagiarism_risk_score, Score::Known(25.0));
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.missing_citations[0].severity, RiskLevel::Medium);
    }
}
