use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::agents::{
    AgentKind, AgentReport, CitationReport, FundingReport, JournalReport, MethodologyReport,
    PlagiarismReport, ResultsReport, VisualizationReport, WritingReport,
};
use crate::ingest::{PaperType, SectionBundle};

/// All eight agent slots.
///
/// Slots are non-optional: a bundle always holds a schema-complete report
/// for every agent, executed or placeholder, so downstream consumers never
/// see a missing slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBundle {
    pub results: ResultsReport,
    pub writing: WritingReport,
    pub methodology: MethodologyReport,
    pub visualization: VisualizationReport,
    pub citations: CitationReport,
    pub plagiarism: PlagiarismReport,
    pub journals: JournalReport,
    pub funding: FundingReport,
}

impl ReportBundle {
    /// A bundle with every slot holding its skip placeholder
    pub fn all_skipped() -> Self {
        Self {
            results: ResultsReport::skipped(),
            writing: WritingReport::skipped(),
            methodology: MethodologyReport::skipped(),
            visualization: VisualizationReport::skipped(),
            citations: CitationReport::skipped(),
            plagiarism: PlagiarismReport::skipped(),
            journals: JournalReport::skipped(),
            funding: FundingReport::skipped(),
        }
    }

    /// Store a report in its slot
    pub fn insert(&mut self, report: AgentReport) {
        match report {
            AgentReport::Results(r) => self.results = r,
            AgentReport::Writing(r) => self.writing = r,
            AgentReport::Methodology(r) => self.methodology = r,
            AgentReport::Visualization(r) => self.visualization = r,
            AgentReport::Citations(r) => self.citations = r,
            AgentReport::Plagiarism(r) => self.plagiarism = r,
            AgentReport::Journals(r) => self.journals = r,
            AgentReport::Funding(r) => self.funding = r,
        }
    }

    /// Clone one slot out as an [`AgentReport`]
    pub fn get(&self, kind: AgentKind) -> AgentReport {
        match kind {
            AgentKind::Results => AgentReport::Results(self.results.clone()),
            AgentKind::Writing => AgentReport::Writing(self.writing.clone()),
            AgentKind::Methodology => AgentReport::Methodology(self.methodology.clone()),
            AgentKind::Visualization => AgentReport::Visualization(self.visualization.clone()),
            AgentKind::Citations => AgentReport::Citations(self.citations.clone()),
            AgentKind::Plagiarism => AgentReport::Plagiarism(self.plagiarism.clone()),
            AgentKind::Journals => AgentReport::Journals(self.journals.clone()),
            AgentKind::Funding => AgentReport::Funding(self.funding.clone()),
        }
    }
}

impl Default for ReportBundle {
    fn default() -> Self {
        Self::all_skipped()
    }
}

/// The complete record of one document's analysis.
///
/// Mutable only while its run executes; immutable once handed to the
/// terminal event. Discarded after the report is produced unless the caller
/// persists it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunState {
    /// Unique ID of this run.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// The analyzed document.
    pub document: PathBuf,
    /// Classified paper type.
    pub paper_type: PaperType,
    /// Extracted sections.
    pub sections: SectionBundle,
    /// Agents the caller selected.
    pub selection: BTreeSet<AgentKind>,
    /// All eight agent slots.
    pub reports: ReportBundle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_skipped_flags_every_slot() {
        let bundle = ReportBundle::all_skipped();
        for kind in AgentKind::ALL {
            assert!(bundle.get(kind).is_skipped(), "{} should be skipped", kind);
        }
    }

    #[test]
    fn test_insert_replaces_only_its_slot() {
        let mut bundle = ReportBundle::all_skipped();
        let mut report = ResultsReport::skipped();
        report.skipped = false;
        report.main_conclusion = "Executed".to_string();
        bundle.insert(AgentReport::Results(report));

        assert!(!bundle.get(AgentKind::Results).is_skipped());
        for kind in AgentKind::ALL.into_iter().filter(|k| *k != AgentKind::Results) {
            assert!(bundle.get(kind).is_skipped());
        }
    }

    #[test]
    fn test_get_round_trips_through_agent_report() {
        let bundle = ReportBundle::all_skipped();
        for kind in AgentKind::ALL {
            assert_eq!(bundle.get(kind).kind(), kind);
        }
    }
}
