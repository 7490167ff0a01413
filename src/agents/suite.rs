use std::path::Path;

use async_trait::async_trait;

use super::{
    CitationHunter, CitationReport, EvidenceStrength, FundingAdvisor, FundingReport,
    JournalRecommender, JournalReport, MethodologyCritic, MethodologyReport, PlagiarismDetector,
    PlagiarismReport, ResultsReport, ResultsSynthesizer, VisualizationCritic,
    VisualizationReport, WritingCoach, WritingReport,
};
use crate::error::AppResult;
use crate::ingest::{PaperType, SectionBundle};
use crate::metadata::{OpenAlexClient, ScholarClient};
use crate::oracle::OracleClient;

/// The orchestrator's seam onto the eight analysis agents.
///
/// Agents degrade internally: a returned `Err` means the failure escaped the
/// agent's own handling and is treated as fatal for the whole run.
#[async_trait]
pub trait AnalysisSuite: Send + Sync {
    /// Synthesize key findings from results (or fallback discussion) text
    async fn synthesize_results(&self, results_text: &str) -> AppResult<ResultsReport>;

    /// Assess writing quality across sections
    async fn assess_writing(
        &self,
        sections: &SectionBundle,
        paper_type: PaperType,
    ) -> AppResult<WritingReport>;

    /// Critique the methodology
    async fn critique_methodology(
        &self,
        methods_text: &str,
        abstract_text: &str,
        results_text: &str,
    ) -> AppResult<MethodologyReport>;

    /// Critique the paper's figures
    async fn critique_visuals(
        &self,
        document: &Path,
        full_text: &str,
        results_text: &str,
    ) -> AppResult<VisualizationReport>;

    /// Search related literature and analyze citation context
    async fn hunt_citations(
        &self,
        title: &str,
        abstract_text: &str,
    ) -> AppResult<CitationReport>;

    /// Check for plagiarism and integrity issues
    async fn detect_plagiarism(
        &self,
        full_text: &str,
        paper_type: PaperType,
    ) -> AppResult<PlagiarismReport>;

    /// Recommend journals, with optional upstream-quality hints
    async fn recommend_journals(
        &self,
        title: &str,
        abstract_text: &str,
        paper_type: PaperType,
        methods_quality: Option<f64>,
        evidence_strength: Option<EvidenceStrength>,
    ) -> AppResult<JournalReport>;

    /// Recommend funding sources
    async fn recommend_funding(
        &self,
        title: &str,
        abstract_text: &str,
        paper_type: PaperType,
    ) -> AppResult<FundingReport>;
}

/// The production agent suite, one handler per capability.
///
/// All agents share the injected oracle and metadata clients.
#[derive(Clone)]
pub struct AgentSuite {
    results: ResultsSynthesizer,
    writing: WritingCoach,
    methodology: MethodologyCritic,
    visualization: VisualizationCritic,
    citations: CitationHunter,
    plagiarism: PlagiarismDetector,
    journals: JournalRecommender,
    funding: FundingAdvisor,
}

impl AgentSuite {
    /// Create the suite from shared clients
    pub fn new(oracle: OracleClient, openalex: OpenAlexClient, scholar: ScholarClient) -> Self {
        Self {
            results: ResultsSynthesizer::new(oracle.clone()),
            writing: WritingCoach::new(oracle.clone()),
            methodology: MethodologyCritic::new(oracle.clone()),
            visualization: VisualizationCritic::new(oracle.clone()),
            citations: CitationHunter::new(oracle.clone(), scholar),
            plagiarism: PlagiarismDetector::new(oracle.clone()),
            journals: JournalRecommender::new(oracle.clone(), openalex.clone()),
            funding: FundingAdvisor::new(oracle, openalex),
        }
    }
}

#[async_trait]
impl AnalysisSuite for AgentSuite {
    async fn synthesize_results(&self, results_text: &str) -> AppResult<ResultsReport> {
        Ok(self.results.analyze(results_text).await)
    }

    async fn assess_writing(
        &self,
        sections: &SectionBundle,
        paper_type: PaperType,
    ) -> AppResult<WritingReport> {
        Ok(self.writing.analyze(sections, paper_type).await)
    }

    async fn critique_methodology(
        &self,
        methods_text: &str,
        abstract_text: &str,
        results_text: &str,
    ) -> AppResult<MethodologyReport> {
        Ok(self
            .methodology
            .analyze(methods_text, abstract_text, results_text)
            .await)
    }

    async fn critique_visuals(
        &self,
        document: &Path,
        full_text: &str,
        results_text: &str,
    ) -> AppResult<VisualizationReport> {
        Ok(self
            .visualization
            .analyze(document, full_text, results_text)
            .await)
    }

    async fn hunt_citations(
        &self,
        title: &str,
        abstract_text: &str,
    ) -> AppResult<CitationReport> {
        Ok(self.citations.analyze(title, abstract_text).await)
    }

    async fn detect_plagiarism(
        &self,
        full_text: &str,
        paper_type: PaperType,
    ) -> AppResult<PlagiarismReport> {
        Ok(self.plagiarism.analyze(full_text, paper_type).await)
    }

    async fn recommend_journals(
        &self,
        title: &str,
        abstract_text: &str,
        paper_type: PaperType,
        methods_quality: Option<f64>,
        evidence_strength: Option<EvidenceStrength>,
    ) -> AppResult<JournalReport> {
        Ok(self
            .journals
            .analyze(
                title,
                abstract_text,
                paper_type.as_str(),
                methods_quality,
                evidence_strength,
            )
            .await)
    }

    async fn recommend_funding(
        &self,
        title: &str,
        abstract_text: &str,
        paper_type: PaperType,
    ) -> AppResult<FundingReport> {
        Ok(self
            .funding
            .analyze(title, abstract_text, paper_type.as_str())
            .await)
    }
}
