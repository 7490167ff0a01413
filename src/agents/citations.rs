use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{EvidenceStrength, Score, NOT_SELECTED_NOTE};
use crate::metadata::{RelatedPaper, ScholarClient};
use crate::oracle::{Message, OracleClient};
use crate::prompts::CITATION_PROMPT;

/// Number of related papers requested from the search
const SEARCH_LIMIT: u32 = 10;

/// Number of related papers forwarded to the oracle
const CONTEXT_PAPERS: usize = 8;

/// Related-literature and citation-context analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationReport {
    #[serde(rename = "_skipped")]
    pub skipped: bool,
    pub supporting_papers: Vec<SupportingPaper>,
    pub conflicting_papers: Vec<ConflictingPaper>,
    pub research_gaps: Vec<String>,
    pub top_relevant: Vec<RelevantPaper>,
    pub literature_quality: EvidenceStrength,
    pub citation_context: String,
}

/// A paper supporting the findings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportingPaper {
    pub title: String,
    pub year: Option<i32>,
    pub relevance: String,
    pub key_finding: String,
}

/// A paper with contradictory findings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictingPaper {
    pub title: String,
    pub year: Option<i32>,
    pub conflict: String,
    pub possible_explanation: String,
}

/// A highly relevant related paper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevantPaper {
    pub title: String,
    pub year: Option<i32>,
    pub relevance_score: Score,
    pub why_relevant: String,
}

impl CitationReport {
    /// Placeholder for an unselected agent
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            citation_context: NOT_SELECTED_NOTE.to_string(),
            ..Default::default()
        }
    }

    /// Degraded result when no related literature could be retrieved
    pub fn no_literature() -> Self {
        Self {
            research_gaps: vec!["Unable to assess - no related papers found".to_string()],
            citation_context: "Could not retrieve related literature".to_string(),
            ..Default::default()
        }
    }

    /// Degraded result after an unrecoverable oracle failure
    pub fn degraded(note: &str) -> Self {
        Self {
            citation_context: note.to_string(),
            ..Default::default()
        }
    }
}

/// Agent 3: finds related papers and analyzes citation context
#[derive(Clone)]
pub struct CitationHunter {
    oracle: OracleClient,
    scholar: ScholarClient,
}

impl CitationHunter {
    /// Create a new citation hunter
    pub fn new(oracle: OracleClient, scholar: ScholarClient) -> Self {
        Self { oracle, scholar }
    }

    /// Search the literature and analyze how the paper relates to it
    pub async fn analyze(&self, title: &str, abstract_text: &str) -> CitationReport {
        info!("Citation hunter searching literature");

        let related = self.scholar.search_papers(title, SEARCH_LIMIT).await;
        if related.is_empty() {
            warn!("No related papers found");
            return CitationReport::no_literature();
        }

        info!(papers = related.len(), "Found related papers");

        let related_text = format_related(&related);
        let prompt = format!(
            "YOUR PAPER:\nTitle: {}\nAbstract: {}\n\n\
             RELATED PAPERS FROM LITERATURE:\n{}\n\n\
             Analyze the relationship between your paper and the related literature.",
            title, abstract_text, related_text
        );

        let messages = vec![Message::system(CITATION_PROMPT), Message::user(prompt)];

        let value = match self.oracle.complete_json(messages, 0.4).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Citation analysis call failed");
                return CitationReport::degraded("Citation analysis unavailable");
            }
        };

        match serde_json::from_value::<CitationReport>(value) {
            Ok(report) => {
                info!(
                    supporting = report.supporting_papers.len(),
                    conflicting = report.conflicting_papers.len(),
                    gaps = report.research_gaps.len(),
                    quality = %report.literature_quality,
                    "Citation analysis complete"
                );
                report
            }
            Err(e) => {
                warn!(error = %e, "Citation payload did not match schema");
                CitationReport::degraded("Citation analysis returned an unexpected payload")
            }
        }
    }
}

fn format_related(papers: &[RelatedPaper]) -> String {
    papers
        .iter()
        .take(CONTEXT_PAPERS)
        .map(|p| {
            let abstract_snippet = p
                .abstract_text
                .as_deref()
                .unwrap_or("Not available")
                .chars()
                .take(300)
                .collect::<String>();
            format!(
                "Title: {}\nYear: {}\nCitations: {}\nAbstract: {}...",
                p.title.as_deref().unwrap_or("Unknown"),
                p.year.map_or("N/A".to_string(), |y| y.to_string()),
                p.citation_count.unwrap_or(0),
                abstract_snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
