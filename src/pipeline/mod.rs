//! The analysis orchestrator.
//!
//! Drives the fixed pipeline - text extraction, section classification,
//! then the eight agent stages in dependency order - for one document,
//! streaming an [`AnalysisEvent`] per stage boundary through a bounded
//! channel. The caller pulls events; dropping the receiver abandons the
//! run cooperatively at the next stage boundary.
//!
//! Dependency order is fixed: Results and Writing run before Methodology,
//! and Methodology and Results run before Journals, because the journal
//! recommender consumes methodology-quality and evidence-strength hints.

mod events;
mod run_state;

pub use events::*;
pub use run_state::*;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agents::{
    AgentKind, AgentReport, AnalysisSuite, MethodologyReport, ResultsReport,
};
use crate::config::PipelineConfig;
use crate::error::{AppError, AppResult};
use crate::ingest::{DocumentSource, PaperType, Section, SectionBundle};
use crate::report;

/// Event channel capacity. One slot keeps the pipeline at most one stage
/// ahead of the consumer, preserving pull-driven progress.
const EVENT_BUFFER: usize = 1;

/// Title substitute when the document has none
const UNKNOWN_TITLE: &str = "Unknown Title";

/// Orchestrates one analysis run per call over injected collaborators.
pub struct Orchestrator {
    ingestor: Arc<dyn DocumentSource>,
    suite: Arc<dyn AnalysisSuite>,
    run_deadline: Option<Duration>,
}

impl Orchestrator {
    /// Create an orchestrator from its collaborators
    pub fn new(
        ingestor: Arc<dyn DocumentSource>,
        suite: Arc<dyn AnalysisSuite>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            ingestor,
            suite,
            run_deadline: config.run_deadline_ms.map(Duration::from_millis),
        }
    }

    /// Start one analysis run.
    ///
    /// Input errors (empty selection, unreadable document) are returned
    /// before any event is produced. On success, the returned receiver
    /// yields the finite event sequence ending in exactly one terminal
    /// event.
    pub fn run(
        &self,
        document: PathBuf,
        selection: BTreeSet<AgentKind>,
    ) -> AppResult<mpsc::Receiver<AnalysisEvent>> {
        if selection.is_empty() {
            return Err(AppError::Input {
                message: "No agents selected; select at least one".to_string(),
            });
        }

        let metadata = std::fs::metadata(&document).map_err(|e| AppError::Input {
            message: format!("Cannot read document {}: {}", document.display(), e),
        })?;
        if !metadata.is_file() {
            return Err(AppError::Input {
                message: format!("{} is not a file", document.display()),
            });
        }

        info!(
            document = %document.display(),
            agents = selection.len(),
            "Starting analysis run"
        );

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let driver = RunDriver {
            ingestor: Arc::clone(&self.ingestor),
            suite: Arc::clone(&self.suite),
            document,
            selection,
            deadline: self.run_deadline,
            tx,
        };
        tokio::spawn(driver.drive());

        Ok(rx)
    }
}

struct RunDriver {
    ingestor: Arc<dyn DocumentSource>,
    suite: Arc<dyn AnalysisSuite>,
    document: PathBuf,
    selection: BTreeSet<AgentKind>,
    deadline: Option<Duration>,
    tx: mpsc::Sender<AnalysisEvent>,
}

impl RunDriver {
    async fn drive(self) {
        let started = Instant::now();
        let started_at = Utc::now();

        if !self.begin(Stage::ExtractText).await {
            return;
        }
        let full_text = match self.ingestor.extract_text(&self.document) {
            Ok(text) => text,
            Err(e) => {
                self.fail(Stage::ExtractText, e.to_string()).await;
                return;
            }
        };
        let completed = self
            .complete(
                Stage::ExtractText,
                StageOutcome::TextExtracted {
                    chars: full_text.len(),
                },
            )
            .await;
        if !completed {
            return;
        }

        if !self.begin(Stage::ExtractSections).await {
            return;
        }
        let (sections, paper_type) = self.ingestor.extract_sections(&full_text).await;
        let completed = self
            .complete(
                Stage::ExtractSections,
                StageOutcome::SectionsExtracted { paper_type },
            )
            .await;
        if !completed {
            return;
        }

        let mut reports = ReportBundle::all_skipped();
        for kind in AgentKind::ALL {
            if let Some(deadline) = self.deadline {
                if started.elapsed() > deadline {
                    self.fail(
                        Stage::Agent(kind),
                        format!("Run deadline of {}ms exceeded", deadline.as_millis()),
                    )
                    .await;
                    return;
                }
            }

            if !self.begin(Stage::Agent(kind)).await {
                return;
            }
            let report = match self
                .dispatch(kind, &full_text, &sections, paper_type, &reports)
                .await
            {
                Ok(report) => report,
                Err(e) => {
                    self.fail(Stage::Agent(kind), e.to_string()).await;
                    return;
                }
            };
            reports.insert(report.clone());
            let completed = self
                .complete(Stage::Agent(kind), StageOutcome::AgentFinished { report })
                .await;
            if !completed {
                return;
            }
        }

        if !self.begin(Stage::AssembleReport).await {
            return;
        }
        let state = RunState {
            run_id: Uuid::new_v4(),
            started_at,
            document: self.document.clone(),
            paper_type,
            sections,
            selection: self.selection.clone(),
            reports,
        };
        let report_text = report::render_report(&state);

        info!(
            run_id = %state.run_id,
            elapsed_ms = started.elapsed().as_millis(),
            "Analysis run complete"
        );

        let _ = self
            .tx
            .send(AnalysisEvent::RunCompleted {
                state: Box::new(state),
                report: report_text,
            })
            .await;
    }

    /// Resolve one agent slot: selection skip, applicability placeholder,
    /// or a live agent call
    async fn dispatch(
        &self,
        kind: AgentKind,
        full_text: &str,
        sections: &SectionBundle,
        paper_type: PaperType,
        reports: &ReportBundle,
    ) -> AppResult<AgentReport> {
        let selected = self.selection.contains(&kind);

        let report = match kind {
            AgentKind::Results => {
                if !selected {
                    AgentReport::skipped(kind)
                } else if sections.has(Section::Results) {
                    AgentReport::Results(self.suite.synthesize_results(&sections.results).await?)
                } else if sections.has(Section::Discussion) {
                    info!("No separate results section - using discussion for synthesis");
                    AgentReport::Results(
                        self.suite.synthesize_results(&sections.discussion).await?,
                    )
                } else {
                    warn!("No results or discussion section found");
                    AgentReport::Results(ResultsReport::results_not_found())
                }
            }
            AgentKind::Writing => {
                if !selected {
                    AgentReport::skipped(kind)
                } else {
                    AgentReport::Writing(self.suite.assess_writing(sections, paper_type).await?)
                }
            }
            AgentKind::Methodology => {
                // The review placeholder wins over a selection skip: a review
                // has no own methodology whether or not the agent was chosen.
                if paper_type.is_review() {
                    info!("Review/meta-analysis paper - no original methodology expected");
                    AgentReport::Methodology(MethodologyReport::review_paper())
                } else if !selected {
                    AgentReport::skipped(kind)
                } else if sections.has(Section::Methods) {
                    AgentReport::Methodology(
                        self.suite
                            .critique_methodology(
                                &sections.methods,
                                &sections.abstract_text,
                                &sections.results,
                            )
                            .await?,
                    )
                } else {
                    warn!("No methods section found");
                    AgentReport::Methodology(MethodologyReport::methods_not_found())
                }
            }
            AgentKind::Visualization => {
                if !selected {
                    AgentReport::skipped(kind)
                } else {
                    AgentReport::Visualization(
                        self.suite
                            .critique_visuals(&self.document, full_text, &sections.results)
                            .await?,
                    )
                }
            }
            AgentKind::Citations => {
                if !selected {
                    AgentReport::skipped(kind)
                } else {
                    AgentReport::Citations(
                        self.suite
                            .hunt_citations(title_of(sections), &sections.abstract_text)
                            .await?,
                    )
                }
            }
            AgentKind::Plagiarism => {
                if !selected {
                    AgentReport::skipped(kind)
                } else {
                    AgentReport::Plagiarism(
                        self.suite.detect_plagiarism(full_text, paper_type).await?,
                    )
                }
            }
            AgentKind::Journals => {
                if !selected {
                    AgentReport::skipped(kind)
                } else {
                    // Hints from earlier stages; absent when the upstream
                    // slot is a placeholder.
                    let methods_quality = reports.methodology.overall_quality.known();
                    let evidence = reports.results.strength_of_evidence;
                    let evidence_strength = evidence.is_known().then_some(evidence);
                    AgentReport::Journals(
                        self.suite
                            .recommend_journals(
                                title_of(sections),
                                &sections.abstract_text,
                                paper_type,
                                methods_quality,
                                evidence_strength,
                            )
                            .await?,
                    )
                }
            }
            AgentKind::Funding => {
                if !selected {
                    AgentReport::skipped(kind)
                } else {
                    AgentReport::Funding(
                        self.suite
                            .recommend_funding(
                                title_of(sections),
                                &sections.abstract_text,
                                paper_type,
                            )
                            .await?,
                    )
                }
            }
        };

        Ok(report)
    }

    /// Send a stage-started event; false means the receiver is gone and the
    /// run should be abandoned
    async fn begin(&self, stage: Stage) -> bool {
        self.tx
            .send(AnalysisEvent::StageStarted { stage })
            .await
            .is_ok()
    }

    async fn complete(&self, stage: Stage, outcome: StageOutcome) -> bool {
        self.tx
            .send(AnalysisEvent::StageCompleted { stage, outcome })
            .await
            .is_ok()
    }

    async fn fail(&self, stage: Stage, message: String) {
        warn!(stage = %stage, error = %message, "Analysis run aborted");
        let _ = self
            .tx
            .send(AnalysisEvent::RunFailed { stage, message })
            .await;
    }
}

fn title_of(sections: &SectionBundle) -> &str {
    if sections.title.trim().is_empty() {
        UNKNOWN_TITLE
    } else {
        &sections.title
    }
}
