use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{EvidenceStrength, NOT_SELECTED_NOTE};
use crate::oracle::{Message, OracleClient};
use crate::prompts::RESULTS_SYNTHESIS_PROMPT;

/// Key-findings synthesis of the results section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsReport {
    #[serde(rename = "_skipped")]
    pub skipped: bool,
    pub primary_outcome: PrimaryOutcome,
    pub key_findings: Vec<KeyFinding>,
    pub effect_sizes: Vec<EffectSize>,
    pub secondary_outcomes: Vec<SecondaryOutcome>,
    pub main_conclusion: String,
    pub strength_of_evidence: EvidenceStrength,
    pub limitations_noted: Vec<String>,
}

/// The main outcome measured by the paper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryOutcome {
    pub measure: String,
    pub result: String,
    pub statistically_significant: bool,
    pub p_value: String,
}

/// One extracted finding with its statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyFinding {
    pub finding: String,
    pub statistic: String,
    pub p_value: String,
    pub confidence_interval: Option<String>,
}

/// One extracted or computed effect size
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSize {
    pub metric: String,
    pub value: Option<f64>,
    pub interpretation: String,
    pub clinical_significance: String,
}

/// A secondary outcome or subgroup finding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryOutcome {
    pub outcome: String,
    pub result: String,
}

impl PrimaryOutcome {
    fn not_applicable() -> Self {
        Self {
            measure: "N/A".to_string(),
            result: "N/A".to_string(),
            statistically_significant: false,
            p_value: "N/A".to_string(),
        }
    }
}

impl ResultsReport {
    /// Placeholder for an unselected agent
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            primary_outcome: PrimaryOutcome::not_applicable(),
            main_conclusion: NOT_SELECTED_NOTE.to_string(),
            ..Default::default()
        }
    }

    /// Placeholder when neither results nor discussion text exists
    pub fn results_not_found() -> Self {
        Self {
            primary_outcome: PrimaryOutcome {
                measure: "Not found".to_string(),
                result: "N/A".to_string(),
                statistically_significant: false,
                p_value: "N/A".to_string(),
            },
            main_conclusion: "Results section not found".to_string(),
            limitations_noted: vec!["Results section not found".to_string()],
            ..Default::default()
        }
    }

    /// Degraded result after an unrecoverable oracle failure
    pub fn degraded(note: &str) -> Self {
        Self {
            primary_outcome: PrimaryOutcome::not_applicable(),
            main_conclusion: note.to_string(),
            limitations_noted: vec![note.to_string()],
            ..Default::default()
        }
    }
}

/// Agent 2: extracts and synthesizes key findings
#[derive(Clone)]
pub struct ResultsSynthesizer {
    oracle: OracleClient,
}

impl ResultsSynthesizer {
    /// Create a new results synthesizer
    pub fn new(oracle: OracleClient) -> Self {
        Self { oracle }
    }

    /// Synthesize key findings from results (or fallback discussion) text
    pub async fn analyze(&self, results_text: &str) -> ResultsReport {
        info!("Results synthesizer analyzing");

        let messages = vec![
            Message::system(RESULTS_SYNTHESIS_PROMPT),
            Message::user(format!("Extract key findings:\n\n{}", results_text)),
        ];

        let value = match self.oracle.complete_json(messages, 0.3).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Results synthesis call failed");
                return ResultsReport::degraded("Results synthesis unavailable");
            }
        };

        match serde_json::from_value::<ResultsReport>(value) {
            Ok(report) => {
                info!(
                    findings = report.key_findings.len(),
                    evidence = %report.strength_of_evidence,
                    "Results synthesis complete"
                );
                report
            }
            Err(e) => {
                warn!(error = %e, "Results payload did not match schema");
                ResultsReport::degraded("Results synthesis returned an unexpected payload")
            }
        }
    }
}
