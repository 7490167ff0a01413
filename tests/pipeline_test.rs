//! Orchestrator integration tests.
//!
//! Drive the pipeline against hand-written collaborator doubles: a stub
//! document source and a recording agent suite. Covers ordering, selection
//! and applicability skips, cross-agent hints, abort semantics, and the
//! completeness invariant.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use paper_analyzer::agents::{
    AgentKind, AgentReport, AnalysisSuite, CitationReport, EvidenceStrength, FundingReport,
    JournalReport, MethodologyReport, PlagiarismReport, ResultsReport, Score,
    VisualizationReport, WritingReport,
};
use paper_analyzer::config::PipelineConfig;
use paper_analyzer::error::{AppError, AppResult, IngestResult};
use paper_analyzer::ingest::{DocumentSource, PaperType, SectionBundle};
use paper_analyzer::pipeline::{AnalysisEvent, Orchestrator, Stage, StageOutcome};

// --- doubles -----------------------------------------------------------

struct StubSource {
    text: String,
    sections: SectionBundle,
    paper_type: PaperType,
}

impl StubSource {
    fn new(sections: SectionBundle, paper_type: PaperType) -> Self {
        Self {
            text: "full document text".to_string(),
            sections,
            paper_type,
        }
    }
}

#[async_trait]
impl DocumentSource for StubSource {
    fn extract_text(&self, _path: &Path) -> IngestResult<String> {
        Ok(self.text.clone())
    }

    async fn extract_sections(&self, _full_text: &str) -> (SectionBundle, PaperType) {
        (self.sections.clone(), self.paper_type)
    }
}

#[derive(Default)]
struct RecordingSuite {
    calls: Mutex<Vec<AgentKind>>,
    results_inputs: Mutex<Vec<String>>,
    journal_hints: Mutex<Vec<(Option<f64>, Option<EvidenceStrength>)>>,
    fail_agent: Option<AgentKind>,
    methods_quality: Option<f64>,
    evidence: EvidenceStrength,
}

impl RecordingSuite {
    fn record(&self, kind: AgentKind) -> AppResult<()> {
        self.calls.lock().unwrap().push(kind);
        if self.fail_agent == Some(kind) {
            return Err(AppError::Internal {
                message: format!("{} exploded", kind),
            });
        }
        Ok(())
    }

    fn calls(&self) -> Vec<AgentKind> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisSuite for RecordingSuite {
    async fn synthesize_results(&self, results_text: &str) -> AppResult<ResultsReport> {
        self.record(AgentKind::Results)?;
        self.results_inputs
            .lock()
            .unwrap()
            .push(results_text.to_string());
        Ok(ResultsReport {
            main_conclusion: "executed".to_string(),
            strength_of_evidence: self.evidence,
            ..Default::default()
        })
    }

    async fn assess_writing(
        &self,
        _sections: &SectionBundle,
        _paper_type: PaperType,
    ) -> AppResult<WritingReport> {
        self.record(AgentKind::Writing)?;
        Ok(WritingReport {
            overall_assessment: "executed".to_string(),
            ..Default::default()
        })
    }

    async fn critique_methodology(
        &self,
        _methods_text: &str,
        _abstract_text: &str,
        _results_text: &str,
    ) -> AppResult<MethodologyReport> {
        self.record(AgentKind::Methodology)?;
        let mut report = MethodologyReport::default();
        report.overall_quality = self
            .methods_quality
            .map(Score::Known)
            .unwrap_or(Score::NotApplicable);
        Ok(report)
    }

    async fn critique_visuals(
        &self,
        _document: &Path,
        _full_text: &str,
        _results_text: &str,
    ) -> AppResult<VisualizationReport> {
        self.record(AgentKind::Visualization)?;
        Ok(VisualizationReport {
            overall_assessment: "executed".to_string(),
            ..Default::default()
        })
    }

    async fn hunt_citations(
        &self,
        _title: &str,
        _abstract_text: &str,
    ) -> AppResult<CitationReport> {
        self.record(AgentKind::Citations)?;
        Ok(CitationReport {
            citation_context: "executed".to_string(),
            ..Default::default()
        })
    }

    async fn detect_plagiarism(
        &self,
        _full_text: &str,
        _paper_type: PaperType,
    ) -> AppResult<PlagiarismReport> {
        self.record(AgentKind::Plagiarism)?;
        Ok(PlagiarismReport {
            overall_assessment: "executed".to_string(),
            ..Default::default()
        })
    }

    async fn recommend_journals(
        &self,
        _title: &str,
        _abstract_text: &str,
        _paper_type: PaperType,
        methods_quality: Option<f64>,
        evidence_strength: Option<EvidenceStrength>,
    ) -> AppResult<JournalReport> {
        self.record(AgentKind::Journals)?;
        self.journal_hints
            .lock()
            .unwrap()
            .push((methods_quality, evidence_strength));
        Ok(JournalReport {
            publication_strategy: "executed".to_string(),
            ..Default::default()
        })
    }

    async fn recommend_funding(
        &self,
        _title: &str,
        _abstract_text: &str,
        _paper_type: PaperType,
    ) -> AppResult<FundingReport> {
        self.record(AgentKind::Funding)?;
        Ok(FundingReport {
            funding_strategy: "executed".to_string(),
            ..Default::default()
        })
    }
}

// --- helpers -----------------------------------------------------------

fn full_sections() -> SectionBundle {
    SectionBundle {
        title: "A Study of Things".to_string(),
        abstract_text: "We studied things carefully.".to_string(),
        introduction: "Things matter.".to_string(),
        methods: "We recruited 150 participants.".to_string(),
        results: "Things improved significantly.".to_string(),
        discussion: "This aligns with prior work.".to_string(),
        conclusion: "Things work.".to_string(),
    }
}

fn all_agents() -> BTreeSet<AgentKind> {
    AgentKind::ALL.into_iter().collect()
}

fn temp_document() -> (tempfile::NamedTempFile, PathBuf) {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let path = file.path().to_path_buf();
    (file, path)
}

fn build(
    sections: SectionBundle,
    paper_type: PaperType,
    suite: RecordingSuite,
) -> (Orchestrator, Arc<RecordingSuite>) {
    let suite = Arc::new(suite);
    let orchestrator = Orchestrator::new(
        Arc::new(StubSource::new(sections, paper_type)),
        Arc::clone(&suite) as Arc<dyn AnalysisSuite>,
        &PipelineConfig::default(),
    );
    (orchestrator, suite)
}

async fn collect(orchestrator: &Orchestrator, document: PathBuf, selection: BTreeSet<AgentKind>) -> Vec<AnalysisEvent> {
    let mut rx = orchestrator.run(document, selection).expect("run starts");
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn terminal_state(events: &[AnalysisEvent]) -> Option<&paper_analyzer::RunState> {
    events.iter().find_map(|e| match e {
        AnalysisEvent::RunCompleted { state, .. } => Some(state.as_ref()),
        _ => None,
    })
}

// --- input validation --------------------------------------------------

#[tokio::test]
async fn empty_selection_is_an_input_error_before_any_event() {
    let (_file, path) = temp_document();
    let (orchestrator, suite) = build(full_sections(), PaperType::OriginalResearch, RecordingSuite::default());

    let result = orchestrator.run(path, BTreeSet::new());
    assert!(matches!(result, Err(AppError::Input { .. })));
    assert!(suite.calls().is_empty());
}

#[tokio::test]
async fn unreadable_document_is_an_input_error() {
    let (orchestrator, _suite) = build(full_sections(), PaperType::OriginalResearch, RecordingSuite::default());

    let result = orchestrator.run(PathBuf::from("/nonexistent/paper.pdf"), all_agents());
    assert!(matches!(result, Err(AppError::Input { .. })));
}

// --- completeness ------------------------------------------------------

#[tokio::test]
async fn full_run_yields_one_terminal_event_with_all_slots_populated() {
    let (_file, path) = temp_document();
    let (orchestrator, _suite) = build(full_sections(), PaperType::OriginalResearch, RecordingSuite::default());

    let events = collect(&orchestrator, path, all_agents()).await;

    let terminals: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(terminals.len(), 1);
    assert!(matches!(terminals[0], AnalysisEvent::RunCompleted { .. }));

    let state = terminal_state(&events).expect("completed state");
    for kind in AgentKind::ALL {
        assert!(
            !state.reports.get(kind).is_skipped(),
            "{} should be executed-shaped",
            kind
        );
    }
}

#[tokio::test]
async fn every_stage_emits_started_then_completed() {
    let (_file, path) = temp_document();
    let (orchestrator, _suite) = build(full_sections(), PaperType::OriginalResearch, RecordingSuite::default());

    let events = collect(&orchestrator, path, all_agents()).await;

    // 2 ingestion stages + 8 agents, each started+completed, plus the
    // assemble-report start and the terminal event.
    assert_eq!(events.len(), 2 * 10 + 2);

    for kind in AgentKind::ALL {
        let started = events.iter().position(|e| {
            matches!(e, AnalysisEvent::StageStarted { stage: Stage::Agent(k) } if *k == kind)
        });
        let completed = events.iter().position(|e| {
            matches!(e, AnalysisEvent::StageCompleted { stage: Stage::Agent(k), .. } if *k == kind)
        });
        assert!(started.unwrap() < completed.unwrap(), "{} order", kind);
    }
}

// --- dependency ordering ----------------------------------------------

#[tokio::test]
async fn methodology_runs_after_results_and_writing_and_before_journals() {
    let (_file, path) = temp_document();
    let (orchestrator, suite) = build(full_sections(), PaperType::OriginalResearch, RecordingSuite::default());

    let _ = collect(&orchestrator, path, all_agents()).await;

    let calls = suite.calls();
    let position = |kind: AgentKind| calls.iter().position(|k| *k == kind).unwrap();

    assert!(position(AgentKind::Results) < position(AgentKind::Methodology));
    assert!(position(AgentKind::Writing) < position(AgentKind::Methodology));
    assert!(position(AgentKind::Methodology) < position(AgentKind::Journals));
    assert!(position(AgentKind::Results) < position(AgentKind::Journals));
}

// --- selection skips ---------------------------------------------------

#[tokio::test]
async fn unselected_slots_equal_fresh_factory_placeholders() {
    let (_file, path) = temp_document();
    let (orchestrator, suite) = build(full_sections(), PaperType::OriginalResearch, RecordingSuite::default());

    let selection: BTreeSet<AgentKind> = [AgentKind::Results, AgentKind::Methodology]
        .into_iter()
        .collect();
    let events = collect(&orchestrator, path, selection.clone()).await;
    let state = terminal_state(&events).expect("completed state");

    for kind in AgentKind::ALL {
        let report = state.reports.get(kind);
        if selection.contains(&kind) {
            assert!(!report.is_skipped(), "{} was selected", kind);
        } else {
            assert_eq!(report, AgentReport::skipped(kind), "{} placeholder", kind);
        }
    }

    // Only the selected agents were invoked
    assert_eq!(
        suite.calls(),
        vec![AgentKind::Results, AgentKind::Methodology]
    );
}

// --- applicability rules -----------------------------------------------

#[tokio::test]
async fn review_paper_replaces_methodology_with_fixed_placeholder() {
    let (_file, path) = temp_document();
    let (orchestrator, suite) = build(full_sections(), PaperType::Review, RecordingSuite::default());

    let events = collect(&orchestrator, path, all_agents()).await;
    let state = terminal_state(&events).expect("completed state");

    assert_eq!(state.reports.methodology, MethodologyReport::review_paper());
    assert!(!suite.calls().contains(&AgentKind::Methodology));
}

#[tokio::test]
async fn review_placeholder_wins_even_when_methodology_unselected() {
    let (_file, path) = temp_document();
    let (orchestrator, _suite) = build(full_sections(), PaperType::MetaAnalysis, RecordingSuite::default());

    let selection: BTreeSet<AgentKind> = [AgentKind::Results].into_iter().collect();
    let events = collect(&orchestrator, path, selection).await;
    let state = terminal_state(&events).expect("completed state");

    assert_eq!(state.reports.methodology, MethodologyReport::review_paper());
}

#[tokio::test]
async fn missing_methods_section_yields_critical_issue_placeholder() {
    let (_file, path) = temp_document();
    let mut sections = full_sections();
    sections.methods = String::new();
    let (orchestrator, suite) = build(sections, PaperType::OriginalResearch, RecordingSuite::default());

    let events = collect(&orchestrator, path, all_agents()).await;
    let state = terminal_state(&events).expect("completed state");

    assert_eq!(
        state.reports.methodology,
        MethodologyReport::methods_not_found()
    );
    assert!(!state.reports.methodology.critical_issues.is_empty());
    assert!(!suite.calls().contains(&AgentKind::Methodology));
}

#[tokio::test]
async fn results_synthesis_falls_back_to_discussion_text() {
    let (_file, path) = temp_document();
    let mut sections = full_sections();
    sections.results = String::new();
    sections.discussion = "discussion stands in for results".to_string();
    let (orchestrator, suite) = build(sections, PaperType::OriginalResearch, RecordingSuite::default());

    let _ = collect(&orchestrator, path, all_agents()).await;

    let inputs = suite.results_inputs.lock().unwrap().clone();
    assert_eq!(inputs, vec!["discussion stands in for results".to_string()]);
}

#[tokio::test]
async fn results_without_any_text_gets_empty_placeholder() {
    let (_file, path) = temp_document();
    let mut sections = full_sections();
    sections.results = String::new();
    sections.discussion = String::new();
    let (orchestrator, suite) = build(sections, PaperType::OriginalResearch, RecordingSuite::default());

    let events = collect(&orchestrator, path, all_agents()).await;
    let state = terminal_state(&events).expect("completed state");

    assert_eq!(state.reports.results, ResultsReport::results_not_found());
    assert!(!suite.calls().contains(&AgentKind::Results));
}

// --- cross-agent hints -------------------------------------------------

#[tokio::test]
async fn journal_hints_are_absent_when_upstream_slots_are_placeholders() {
    let (_file, path) = temp_document();
    // Review paper: methodology becomes the review placeholder (quality N/A)
    // and the stub results report leaves evidence unknown.
    let suite = RecordingSuite {
        evidence: EvidenceStrength::Unknown,
        ..Default::default()
    };
    let (orchestrator, suite) = build(full_sections(), PaperType::Review, suite);

    let _ = collect(&orchestrator, path, all_agents()).await;

    let hints = suite.journal_hints.lock().unwrap().clone();
    assert_eq!(hints, vec![(None, None)]);
}

#[tokio::test]
async fn journal_hints_carry_upstream_quality_and_evidence() {
    let (_file, path) = temp_document();
    let suite = RecordingSuite {
        methods_quality: Some(4.0),
        evidence: EvidenceStrength::Strong,
        ..Default::default()
    };
    let (orchestrator, suite) = build(full_sections(), PaperType::OriginalResearch, suite);

    let _ = collect(&orchestrator, path, all_agents()).await;

    let hints = suite.journal_hints.lock().unwrap().clone();
    assert_eq!(hints, vec![(Some(4.0), Some(EvidenceStrength::Strong))]);
}

// --- abort semantics ---------------------------------------------------

#[tokio::test]
async fn escaping_agent_error_aborts_run_without_terminal_complete() {
    let (_file, path) = temp_document();
    let suite = RecordingSuite {
        fail_agent: Some(AgentKind::Citations),
        ..Default::default()
    };
    let (orchestrator, suite) = build(full_sections(), PaperType::OriginalResearch, suite);

    let events = collect(&orchestrator, path, all_agents()).await;

    assert!(events
        .iter()
        .all(|e| !matches!(e, AnalysisEvent::RunCompleted { .. })));
    let last = events.last().expect("events emitted");
    assert!(matches!(
        last,
        AnalysisEvent::RunFailed {
            stage: Stage::Agent(AgentKind::Citations),
            ..
        }
    ));

    // No stage after the failing one was dispatched
    assert!(!suite.calls().contains(&AgentKind::Plagiarism));
    assert!(!events.iter().any(|e| matches!(
        e,
        AnalysisEvent::StageStarted { stage: Stage::Agent(AgentKind::Plagiarism) }
    )));
}

#[tokio::test]
async fn exceeded_deadline_fails_at_a_stage_boundary() {
    let (_file, path) = temp_document();
    let suite = Arc::new(RecordingSuite::default());
    let orchestrator = Orchestrator::new(
        Arc::new(StubSource::new(full_sections(), PaperType::OriginalResearch)),
        Arc::clone(&suite) as Arc<dyn AnalysisSuite>,
        &PipelineConfig {
            run_deadline_ms: Some(0),
        },
    );

    let events = collect(&orchestrator, path, all_agents()).await;

    assert!(events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::RunFailed { .. })));
    assert!(events
        .iter()
        .all(|e| !matches!(e, AnalysisEvent::RunCompleted { .. })));
}

// --- event payloads ----------------------------------------------------

#[tokio::test]
async fn stage_completed_events_carry_the_finished_reports() {
    let (_file, path) = temp_document();
    let (orchestrator, _suite) = build(full_sections(), PaperType::OriginalResearch, RecordingSuite::default());

    let selection: BTreeSet<AgentKind> = [AgentKind::Plagiarism].into_iter().collect();
    let events = collect(&orchestrator, path, selection).await;

    let mut seen = Vec::new();
    for event in &events {
        if let AnalysisEvent::StageCompleted {
            stage: Stage::Agent(kind),
            outcome: StageOutcome::AgentFinished { report },
        } = event
        {
            assert_eq!(report.kind(), *kind);
            seen.push((*kind, report.is_skipped()));
        }
    }

    // All eight agent stages completed; only plagiarism executed
    assert_eq!(seen.len(), 8);
    for (kind, skipped) in seen {
        assert_eq!(skipped, kind != AgentKind::Plagiarism);
    }
}
