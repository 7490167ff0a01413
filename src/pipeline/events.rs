use serde::Serialize;

use super::RunState;
use crate::agents::{AgentKind, AgentReport};
use crate::ingest::PaperType;

/// One pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// PDF text extraction.
    ExtractText,
    /// Section classification.
    ExtractSections,
    /// One analysis agent.
    Agent(AgentKind),
    /// Final report assembly.
    AssembleReport,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::ExtractText => write!(f, "extract_text"),
            Stage::ExtractSections => write!(f, "extract_sections"),
            Stage::Agent(kind) => write!(f, "agent:{}", kind),
            Stage::AssembleReport => write!(f, "assemble_report"),
        }
    }
}

/// Payload of a completed stage
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    /// Text extraction finished.
    TextExtracted {
        /// Characters extracted from the document.
        chars: usize,
    },
    /// Section classification finished.
    SectionsExtracted {
        /// The classified paper type.
        paper_type: PaperType,
    },
    /// An agent slot was resolved (executed, placeholder, or skipped).
    AgentFinished {
        /// The finished report.
        report: AgentReport,
    },
}

/// Progress event emitted by the orchestrator.
///
/// A run produces a finite sequence of these, terminated by exactly one
/// [`AnalysisEvent::RunCompleted`] or [`AnalysisEvent::RunFailed`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalysisEvent {
    /// A stage began executing.
    StageStarted {
        /// The stage that started.
        stage: Stage,
    },
    /// A stage finished.
    StageCompleted {
        /// The stage that finished.
        stage: Stage,
        /// What it produced.
        outcome: StageOutcome,
    },
    /// Terminal: the run finished and every slot is populated.
    RunCompleted {
        /// The completed run state.
        state: Box<RunState>,
        /// The rendered report text.
        report: String,
    },
    /// Terminal: the run aborted; no report was produced.
    RunFailed {
        /// The stage that failed.
        stage: Stage,
        /// Failure description.
        message: String,
    },
}

impl AnalysisEvent {
    /// Whether this event ends the run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AnalysisEvent::RunCompleted { .. } | AnalysisEvent::RunFailed { .. }
        )
    }
}
