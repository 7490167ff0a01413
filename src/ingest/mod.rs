//! Document ingestion.
//!
//! Converts a PDF into raw text plus a classified [`SectionBundle`] and
//! [`PaperType`]. Text extraction can fail hard (unreadable document);
//! section classification never does - an oracle failure degrades to an
//! all-empty bundle with the default paper type so the pipeline always
//! continues.

mod pdf;

pub use pdf::*;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agents::truncate_chars;
use crate::error::IngestResult;
use crate::oracle::{Message, OracleClient};
use crate::prompts::SECTION_EXTRACTION_PROMPT;

/// Character cap sent to the section-classification oracle.
const SECTION_TEXT_CAP: usize = 60_000;

/// Paper classification governing applicability rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperType {
    /// Paper with its own methodology, experiments, and data collection.
    #[default]
    OriginalResearch,
    /// Literature review or survey.
    Review,
    /// Statistical synthesis of multiple studies.
    MetaAnalysis,
    /// Detailed analysis of a specific case.
    CaseStudy,
    /// Anything else.
    Other,
}

impl PaperType {
    /// Reviews and meta-analyses share relaxed applicability rules
    pub fn is_review(&self) -> bool {
        matches!(self, PaperType::Review | PaperType::MetaAnalysis)
    }

    /// Wire-format name
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperType::OriginalResearch => "original_research",
            PaperType::Review => "review",
            PaperType::MetaAnalysis => "meta_analysis",
            PaperType::CaseStudy => "case_study",
            PaperType::Other => "other",
        }
    }

    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            PaperType::OriginalResearch => "Original Research",
            PaperType::Review => "Review",
            PaperType::MetaAnalysis => "Meta Analysis",
            PaperType::CaseStudy => "Case Study",
            PaperType::Other => "Other",
        }
    }
}

impl std::fmt::Display for PaperType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaperType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "original_research" => Ok(PaperType::OriginalResearch),
            "review" => Ok(PaperType::Review),
            "meta_analysis" => Ok(PaperType::MetaAnalysis),
            "case_study" => Ok(PaperType::CaseStudy),
            "other" => Ok(PaperType::Other),
            _ => Err(format!("Unknown paper type: {}", s)),
        }
    }
}

/// One of the seven standard paper sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Section {
    Title,
    Abstract,
    Introduction,
    Methods,
    Results,
    Discussion,
    Conclusion,
}

impl Section {
    /// All sections in document order
    pub const ALL: [Section; 7] = [
        Section::Title,
        Section::Abstract,
        Section::Introduction,
        Section::Methods,
        Section::Results,
        Section::Discussion,
        Section::Conclusion,
    ];

    /// Wire-format name
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Title => "title",
            Section::Abstract => "abstract",
            Section::Introduction => "introduction",
            Section::Methods => "methods",
            Section::Results => "results",
            Section::Discussion => "discussion",
            Section::Conclusion => "conclusion",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The extracted text of each standard section.
///
/// Produced once per document, immutable afterwards, shared by reference
/// across every agent that consumes it. Missing sections are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionBundle {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub methods: String,
    #[serde(default)]
    pub results: String,
    #[serde(default)]
    pub discussion: String,
    #[serde(default)]
    pub conclusion: String,
}

impl SectionBundle {
    /// Text of one section
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::Title => &self.title,
            Section::Abstract => &self.abstract_text,
            Section::Introduction => &self.introduction,
            Section::Methods => &self.methods,
            Section::Results => &self.results,
            Section::Discussion => &self.discussion,
            Section::Conclusion => &self.conclusion,
        }
    }

    /// Whether a section has any non-whitespace content
    pub fn has(&self, section: Section) -> bool {
        !self.get(section).trim().is_empty()
    }
}

/// Source of document text and classified sections (test seam)
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Extract the full text of the document
    fn extract_text(&self, path: &Path) -> IngestResult<String>;

    /// Classify sections and paper type; never fails
    async fn extract_sections(&self, full_text: &str) -> (SectionBundle, PaperType);
}

/// PDF ingestor backed by lopdf and the section-classification oracle
#[derive(Clone)]
pub struct DocumentIngestor {
    oracle: OracleClient,
}

impl DocumentIngestor {
    /// Create a new ingestor
    pub fn new(oracle: OracleClient) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl DocumentSource for DocumentIngestor {
    fn extract_text(&self, path: &Path) -> IngestResult<String> {
        pdf::extract_text(path)
    }

    async fn extract_sections(&self, full_text: &str) -> (SectionBundle, PaperType) {
        let text_to_analyze = truncate_chars(full_text, SECTION_TEXT_CAP);
        let messages = vec![
            Message::system(SECTION_EXTRACTION_PROMPT),
            Message::user(format!(
                "Extract sections from this paper:\n\n{}",
                text_to_analyze
            )),
        ];

        let value = match self.oracle.complete_json(messages, 0.1).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Section extraction failed, returning empty sections");
                return (SectionBundle::default(), PaperType::default());
            }
        };

        let paper_type = value
            .get("paper_type")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let bundle: SectionBundle = serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "Section payload did not match schema, returning empty sections");
            SectionBundle::default()
        });

        for section in Section::ALL {
            let length = bundle.get(section).len();
            info!(section = %section, chars = length, "Section extracted");
        }

        (bundle, paper_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_type_round_trip() {
        for t in [
            PaperType::OriginalResearch,
            PaperType::Review,
            PaperType::MetaAnalysis,
            PaperType::CaseStudy,
            PaperType::Other,
        ] {
            assert_eq!(t.as_str().parse::<PaperType>().unwrap(), t);
        }
    }

    #[test]
    fn test_paper_type_is_review() {
        assert!(PaperType::Review.is_review());
        assert!(PaperType::MetaAnalysis.is_review());
        assert!(!PaperType::OriginalResearch.is_review());
        assert!(!PaperType::CaseStudy.is_review());
    }

    #[test]
    fn test_paper_type_unknown_string() {
        assert!("editorial".parse::<PaperType>().is_err());
    }

    #[test]
    fn test_section_bundle_get_and_has() {
        let bundle = SectionBundle {
            methods: "We recruited 150 participants.".to_string(),
            results: "   ".to_string(),
            ..Default::default()
        };
        assert!(bundle.has(Section::Methods));
        assert!(!bundle.has(Section::Results));
        assert!(!bundle.has(Section::Title));
        assert_eq!(bundle.get(Section::Methods), "We recruited 150 participants.");
    }

    #[test]
    fn test_section_bundle_deserializes_partial_payload() {
        let bundle: SectionBundle = serde_json::from_value(serde_json::json!({
            "title": "A Study",
            "abstract": "Background and aims.",
            "paper_type": "review"
        }))
        .unwrap();
        assert_eq!(bundle.title, "A Study");
        assert_eq!(bundle.abstract_text, "Background and aims.");
        assert!(bundle.methods.is_empty());
    }
}
