use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Score, NOT_SELECTED_NOTE};
use crate::oracle::{Message, OracleClient};
use crate::prompts::METHODOLOGY_PROMPT;

/// Methodology quality critique
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodologyReport {
    #[serde(rename = "_skipped")]
    pub skipped: bool,
    pub sample_size: SampleSize,
    pub study_design: StudyDesign,
    pub statistical_methods: StatisticalMethods,
    pub biases: BiasAssessment,
    pub reproducibility: Reproducibility,
    pub overall_quality: Score,
    pub critical_issues: Vec<String>,
    pub strengths: Vec<String>,
}

/// Sample-size assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSize {
    pub n: Score,
    pub adequate: bool,
    pub power_calculation: String,
    pub comment: String,
}

/// Study-design assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyDesign {
    #[serde(rename = "type")]
    pub design_type: String,
    pub quality_score: Score,
    pub appropriateness: String,
}

/// Statistical-methods assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticalMethods {
    pub methods_used: Vec<String>,
    pub appropriate: bool,
    pub issues: Vec<String>,
}

/// Bias identification and handling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasAssessment {
    pub identified: Vec<String>,
    pub addressed: bool,
    pub comment: String,
}

/// Reproducibility assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reproducibility {
    pub score: Score,
    pub comment: String,
}

impl MethodologyReport {
    /// Placeholder for an unselected agent
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            sample_size: SampleSize {
                n: Score::NotApplicable,
                adequate: true,
                power_calculation: "N/A".to_string(),
                comment: NOT_SELECTED_NOTE.to_string(),
            },
            study_design: StudyDesign {
                design_type: "N/A".to_string(),
                quality_score: Score::NotApplicable,
                appropriateness: "N/A".to_string(),
            },
            statistical_methods: StatisticalMethods {
                methods_used: Vec::new(),
                appropriate: true,
                issues: Vec::new(),
            },
            biases: BiasAssessment {
                identified: Vec::new(),
                addressed: true,
                comment: "N/A".to_string(),
            },
            reproducibility: Reproducibility {
                score: Score::NotApplicable,
                comment: "N/A".to_string(),
            },
            overall_quality: Score::NotApplicable,
            critical_issues: Vec::new(),
            strengths: Vec::new(),
        }
    }

    /// Fixed placeholder for review / meta-analysis papers, which have no
    /// original methodology to critique
    pub fn review_paper() -> Self {
        Self {
            skipped: false,
            sample_size: SampleSize {
                n: Score::NotApplicable,
                adequate: true,
                power_calculation: "N/A (review paper)".to_string(),
                comment: "Review paper - no own data collection".to_string(),
            },
            study_design: StudyDesign {
                design_type: "literature review".to_string(),
                quality_score: Score::NotApplicable,
                appropriateness: "N/A (review paper)".to_string(),
            },
            statistical_methods: StatisticalMethods {
                methods_used: Vec::new(),
                appropriate: true,
                issues: Vec::new(),
            },
            biases: BiasAssessment {
                identified: Vec::new(),
                addressed: true,
                comment: "N/A (review paper)".to_string(),
            },
            reproducibility: Reproducibility {
                score: Score::NotApplicable,
                comment: "N/A (review paper)".to_string(),
            },
            overall_quality: Score::NotApplicable,
            critical_issues: Vec::new(),
            strengths: Vec::new(),
        }
    }

    /// Placeholder when the paper has no methods section
    pub fn methods_not_found() -> Self {
        Self {
            skipped: false,
            sample_size: SampleSize {
                n: Score::Known(0.0),
                adequate: false,
                power_calculation: "not found".to_string(),
                comment: "Methods section not found".to_string(),
            },
            study_design: StudyDesign {
                design_type: "unknown".to_string(),
                quality_score: Score::Known(0.0),
                appropriateness: "N/A".to_string(),
            },
            statistical_methods: StatisticalMethods {
                methods_used: Vec::new(),
                appropriate: false,
                issues: vec!["Methods section not found".to_string()],
            },
            biases: BiasAssessment {
                identified: Vec::new(),
                addressed: false,
                comment: "Cannot assess".to_string(),
            },
            reproducibility: Reproducibility {
                score: Score::Known(0.0),
                comment: "Methods section not found".to_string(),
            },
            overall_quality: Score::Known(0.0),
            critical_issues: vec!["Methods section not found in paper".to_string()],
            strengths: Vec::new(),
        }
    }

    /// Degraded result after an unrecoverable oracle failure
    pub fn degraded(note: &str) -> Self {
        Self {
            critical_issues: vec![note.to_string()],
            biases: BiasAssessment {
                comment: "Cannot assess".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Agent 1: critiques research methodology
#[derive(Clone)]
pub struct MethodologyCritic {
    oracle: OracleClient,
}

impl MethodologyCritic {
    /// Create a new methodology critic
    pub fn new(oracle: OracleClient) -> Self {
        Self { oracle }
    }

    /// Critique the methods section with abstract and results as extra context
    pub async fn analyze(
        &self,
        methods_text: &str,
        abstract_text: &str,
        results_text: &str,
    ) -> MethodologyReport {
        info!("Methodology critic analyzing");

        let mut user_content = format!("## Methods Section\n\n{}", methods_text);
        if !abstract_text.trim().is_empty() {
            user_content.push_str(&format!(
                "\n\n## Abstract (additional context)\n\n{}",
                abstract_text
            ));
        }
        if !results_text.trim().is_empty() {
            user_content.push_str(&format!(
                "\n\n## Results Section (additional context)\n\n{}",
                results_text
            ));
        }

        let messages = vec![
            Message::system(METHODOLOGY_PROMPT),
            Message::user(user_content),
        ];

        let value = match self.oracle.complete_json(messages, 0.3).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Methodology critique call failed");
                return MethodologyReport::degraded("Methodology critique unavailable");
            }
        };

        match serde_json::from_value::<MethodologyReport>(value) {
            Ok(report) => {
                info!(
                    quality = %report.overall_quality,
                    sample_n = %report.sample_size.n,
                    reproducibility = %report.reproducibility.score,
                    "Methodology critique complete"
                );
                report
            }
            Err(e) => {
                warn!(error = %e, "Methodology payload did not match schema");
                MethodologyReport::degraded("Methodology critique returned an unexpected payload")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_flagged_review_and_missing_are_not() {
        assert!(MethodologyReport::skipped().skipped);
        assert!(!MethodologyReport::review_paper().skipped);
        assert!(!MethodologyReport::methods_not_found().skipped);
    }

    #[test]
    fn test_review_placeholder_is_fixed() {
        let a = MethodologyReport::review_paper();
        let b = MethodologyReport::review_paper();
        assert_eq!(a, b);
        assert!(a.overall_quality.is_na());
        assert_eq!(a.study_design.design_type, "literature review");
        assert!(a.critical_issues.is_empty());
    }

    #[test]
    fn test_methods_not_found_carries_critical_issue() {
        let report = MethodologyReport::methods_not_found();
        assert_eq!(
            report.critical_issues,
            vec!["Methods section not found in paper".to_string()]
        );
        assert_eq!(report.overall_quality, Score::Known(0.0));
        assert!(!report.sample_size.adequate);
    }

    #[test]
    fn test_report_parses_oracle_payload_with_na_quality() {
        let report: MethodologyReport = serde_json::from_value(serde_json::json!({
            "sample_size": {"n": 150, "adequate": true, "power_calculation": "mentioned", "comment": "well powered"},
            "study_design": {"type": "RCT", "quality_score": 5, "appropriateness": "appropriate"},
            "overall_quality": "N/A"
        }))
        .unwrap();

        assert_eq!(report.sample_size.n, Score::Known(150.0));
        assert_eq!(report.study_design.design_type, "RCT");
        assert!(report.overall_quality.is_na());
    }
}
