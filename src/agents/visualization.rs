use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Score, NOT_SELECTED_NOTE};
use crate::ingest::{extract_figures, FigureImage};
use crate::oracle::{Message, OracleClient};
use crate::prompts::{FIGURE_ANALYSIS_PROMPT, VISUALIZATION_SYNTHESIS_PROMPT};

static FIGURE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfig(?:ure|\.)?\s*(\d{1,3})").expect("static figure regex"));

/// Data-visualization critique of the paper's figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationReport {
    #[serde(rename = "_skipped")]
    pub skipped: bool,
    pub figures_analyzed: u32,
    pub overall_quality: Score,
    pub overall_assessment: String,
    pub figures: Vec<FigureAnalysis>,
    pub common_patterns: Vec<String>,
    pub best_practice_violations: Vec<String>,
    pub strengths: Vec<String>,
    pub recommendations: Vec<String>,
    pub visualization_strategy: String,
    pub caption_analysis: CaptionAnalysis,
}

/// Critique of one figure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureAnalysis {
    pub figure_number: u32,
    pub page: u32,
    pub chart_type_detected: String,
    pub chart_type_appropriate: Option<bool>,
    pub color_assessment: AspectScore,
    pub axis_assessment: AspectScore,
    pub data_ink_ratio: AspectScore,
    pub legend_assessment: AspectScore,
    pub caption_quality: AspectScore,
    pub overall_figure_score: Score,
    pub priority: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// Score plus notes for one visual aspect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AspectScore {
    pub score: Score,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Figure-reference consistency between text and extracted figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionAnalysis {
    pub references_found: u32,
    pub reference_quality: String,
    pub orphan_figures: Vec<u32>,
    pub dangling_references: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Synthesis {
    overall_quality: Score,
    overall_assessment: String,
    common_patterns: Vec<String>,
    best_practice_violations: Vec<String>,
    strengths: Vec<String>,
    recommendations: Vec<String>,
    visualization_strategy: String,
}

impl FigureAnalysis {
    fn failed(figure_number: u32, page: u32, note: &str) -> Self {
        let aspect = || AspectScore {
            score: Score::NotApplicable,
            issues: vec![note.to_string()],
            suggestions: Vec::new(),
        };
        Self {
            figure_number,
            page,
            chart_type_detected: "unknown".to_string(),
            chart_type_appropriate: None,
            color_assessment: aspect(),
            axis_assessment: aspect(),
            data_ink_ratio: aspect(),
            legend_assessment: aspect(),
            caption_quality: aspect(),
            overall_figure_score: Score::NotApplicable,
            priority: "minor".to_string(),
            strengths: Vec::new(),
            improvements: Vec::new(),
        }
    }
}

impl VisualizationReport {
    /// Placeholder for an unselected agent
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            overall_assessment: NOT_SELECTED_NOTE.to_string(),
            ..Default::default()
        }
    }

    /// Report for a paper with no extractable figures
    pub fn no_figures(caption_analysis: CaptionAnalysis) -> Self {
        Self {
            overall_assessment: "No figures or charts found in this PDF.".to_string(),
            recommendations: vec![
                "Consider adding visualizations to improve data communication".to_string(),
            ],
            visualization_strategy: "No figures detected. Adding clear, well-designed charts \
                could strengthen the paper's impact."
                .to_string(),
            caption_analysis,
            ..Default::default()
        }
    }
}

/// Agent 7: critiques data visualizations
#[derive(Clone)]
pub struct VisualizationCritic {
    oracle: OracleClient,
}

impl VisualizationCritic {
    /// Create a new visualization critic
    pub fn new(oracle: OracleClient) -> Self {
        Self { oracle }
    }

    /// Analyze the figures of the paper at `pdf_path`
    pub async fn analyze(
        &self,
        pdf_path: &Path,
        full_text: &str,
        results_text: &str,
    ) -> VisualizationReport {
        info!("Visualization critic analyzing figures");

        let figures = extract_figures(pdf_path);
        let caption_analysis = analyze_captions(full_text, results_text, figures.len() as u32);

        if figures.is_empty() {
            debug!("No figures found in document");
            return VisualizationReport::no_figures(caption_analysis);
        }

        let mut analyses = Vec::with_capacity(figures.len());
        for (index, figure) in figures.iter().enumerate() {
            let number = index as u32 + 1;
            debug!(figure = number, page = figure.page, "Analyzing figure");
            analyses.push(self.analyze_figure(figure, number).await);
        }

        let synthesis = self.synthesize(&analyses).await;
        let figures_analyzed = analyses.len() as u32;

        info!(
            figures = figures_analyzed,
            quality = %synthesis.overall_quality,
            "Visualization critique complete"
        );

        VisualizationReport {
            skipped: false,
            figures_analyzed,
            overall_quality: synthesis.overall_quality,
            overall_assessment: synthesis.overall_assessment,
            figures: analyses,
            common_patterns: synthesis.common_patterns,
            best_practice_violations: synthesis.best_practice_violations,
            strengths: synthesis.strengths,
            recommendations: synthesis.recommendations,
            visualization_strategy: synthesis.visualization_strategy,
            caption_analysis,
        }
    }

    async fn analyze_figure(&self, figure: &FigureImage, number: u32) -> FigureAnalysis {
        let messages = vec![
            Message::system(FIGURE_ANALYSIS_PROMPT),
            Message::user_with_image(
                format!("Analyze figure {} (page {}).", number, figure.page),
                &figure.media_type,
                &figure.data,
            ),
        ];

        let value = match self.oracle.complete_json_vision(messages, 0.3).await {
            Ok(value) => value,
            Err(e) => {
                warn!(figure = number, error = %e, "Figure analysis failed");
                return FigureAnalysis::failed(number, figure.page, "Analysis failed");
            }
        };

        match serde_json::from_value::<FigureAnalysis>(value) {
            Ok(mut analysis) => {
                analysis.figure_number = number;
                analysis.page = figure.page;
                analysis
            }
            Err(e) => {
                warn!(figure = number, error = %e, "Figure payload did not match schema");
                FigureAnalysis::failed(number, figure.page, "Analysis returned an unexpected payload")
            }
        }
    }

    async fn synthesize(&self, analyses: &[FigureAnalysis]) -> Synthesis {
        let known_scores: Vec<f64> = analyses
            .iter()
            .filter_map(|a| a.overall_figure_score.known())
            .collect();
        let fallback_quality = if known_scores.is_empty() {
            Score::NotApplicable
        } else {
            let avg = known_scores.iter().sum::<f64>() / known_scores.len() as f64;
            Score::Known((avg * 10.0).round() / 10.0)
        };

        let summary: Vec<serde_json::Value> = analyses
            .iter()
            .map(|a| {
                serde_json::json!({
                    "figure_number": a.figure_number,
                    "page": a.page,
                    "chart_type": a.chart_type_detected,
                    "score": a.overall_figure_score,
                    "priority": a.priority,
                    "strengths": a.strengths,
                    "improvements": a.improvements,
                })
            })
            .collect();

        let prompt = format!(
            "Synthesize these per-figure assessments into an overall evaluation.\n\n{}",
            serde_json::to_string_pretty(&summary).unwrap_or_default()
        );

        let messages = vec![
            Message::system(VISUALIZATION_SYNTHESIS_PROMPT),
            Message::user(prompt),
        ];

        match self.oracle.complete_json(messages, 0.3).await {
            Ok(value) => match serde_json::from_value::<Synthesis>(value) {
                Ok(synthesis) => synthesis,
                Err(e) => {
                    warn!(error = %e, "Visualization synthesis payload did not match schema");
                    Synthesis::fallback(fallback_quality, analyses.len())
                }
            },
            Err(e) => {
                warn!(error = %e, "Visualization synthesis failed");
                Synthesis::fallback(fallback_quality, analyses.len())
            }
        }
    }
}

impl Synthesis {
    fn fallback(quality: Score, figure_count: usize) -> Self {
        Self {
            overall_quality: quality,
            overall_assessment: format!(
                "Analyzed {} figures. Could not generate holistic assessment.",
                figure_count
            ),
            visualization_strategy: "Review individual figure feedback for specific improvements."
                .to_string(),
            ..Default::default()
        }
    }
}

/// Check figure references in the text against the extracted figure count.
pub fn analyze_captions(full_text: &str, results_text: &str, figure_count: u32) -> CaptionAnalysis {
    let referenced: BTreeSet<u32> = FIGURE_REF
        .captures_iter(full_text)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse().ok()))
        .collect();

    let dangling_references: Vec<String> = FIGURE_REF
        .captures_iter(results_text)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
        .collect::<BTreeSet<u32>>()
        .into_iter()
        .filter(|n| *n > figure_count)
        .map(|n| format!("Figure {} is referenced but was not found in the document", n))
        .collect();

    let orphan_figures: Vec<u32> = (1..=figure_count)
        .filter(|n| !referenced.contains(n))
        .collect();

    let reference_quality = if figure_count == 0 && referenced.is_empty() {
        "N/A".to_string()
    } else if orphan_figures.is_empty() && dangling_references.is_empty() {
        "good".to_string()
    } else {
        "inconsistent".to_string()
    };

    CaptionAnalysis {
        references_found: referenced.len() as u32,
        reference_quality,
        orphan_figures,
        dangling_references,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_report_shape() {
        let report = VisualizationReport::skipped();
        assert!(report.skipped);
        assert_eq!(report.figures_analyzed, 0);
        assert!(report.overall_quality.is_na());
        assert!(report.figures.is_empty());
    }

    #[test]
    fn test_no_figures_report_keeps_caption_analysis() {
        let captions = analyze_captions("See Figure 2 for details.", "", 0);
        let report = VisualizationReport::no_figures(captions);
        assert!(!report.skipped);
        assert_eq!(report.caption_analysis.references_found, 1);
        assert!(!report.recommendations.is_empty());
    }

    #[test]
    fn test_caption_analysis_consistent() {
        let text = "As shown in Figure 1 and Fig. 2, the effect is large.";
        let analysis = analyze_captions(text, text, 2);
        assert_eq!(analysis.references_found, 2);
        assert!(analysis.orphan_figures.is_empty());
        assert!(analysis.dangling_references.is_empty());
        assert_eq!(analysis.reference_quality, "good");
    }

    #[test]
    fn test_caption_analysis_dangling_reference() {
        let analysis = analyze_captions("Figure 3 shows growth.", "Figure 3 shows growth.", 1);
        assert_eq!(analysis.dangling_references.len(), 1);
        assert!(analysis.dangling_references[0].contains("Figure 3"));
        assert_eq!(analysis.reference_quality, "inconsistent");
    }

    #[test]
    fn test_caption_analysis_orphan_figures() {
        let analysis = analyze_captions("No figure references here.", "", 2);
        assert_eq!(analysis.orphan_figures, vec![1, 2]);
        assert_eq!(analysis.references_found, 0);
    }

    #[test]
    fn test_failed_figure_analysis_shape() {
        let analysis = FigureAnalysis::failed(3, 7, "Analysis failed");
        assert_eq!(analysis.figure_number, 3);
        assert_eq!(analysis.page, 7);
        assert!(analysis.overall_figure_score.is_na());
        assert_eq!(analysis.color_assessment.issues, vec!["Analysis failed"]);
    }
}
