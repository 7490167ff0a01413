use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{truncate_chars, ConfidenceLevel, Score, NOT_SELECTED_NOTE};
use crate::ingest::{PaperType, Section, SectionBundle};
use crate::oracle::{Message, OracleClient};
use crate::prompts::{WRITING_SECTION_PROMPT, WRITING_SYNTHESIS_PROMPT};

/// Sections assessed for writing quality, with their standards
const SECTION_STANDARDS: &[(Section, &str)] = &[
    (
        Section::Abstract,
        "Should be self-contained: motivation, approach, key result, implication. No citations, no undefined abbreviations.",
    ),
    (
        Section::Introduction,
        "Should funnel from broad context to the specific gap and state the contribution explicitly.",
    ),
    (
        Section::Methods,
        "Should be precise and replicable: past tense, exact parameters, no vague quantifiers.",
    ),
    (
        Section::Results,
        "Should report findings neutrally with statistics, without interpretation that belongs in the discussion.",
    ),
    (
        Section::Discussion,
        "Should interpret findings against prior work, acknowledge limitations, and avoid overclaiming.",
    ),
    (
        Section::Conclusion,
        "Should summarize the contribution and implications without introducing new results.",
    ),
];

/// Minimum section length worth analyzing
const MIN_SECTION_CHARS: usize = 50;

/// Per-section text cap sent to the oracle
const SECTION_CHAR_CAP: usize = 8_000;

static SENTENCE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("static sentence regex"));
static PASSIVE_VOICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:is|are|was|were|been|being|be)\s+\w+(?:ed|en)\b")
        .expect("static passive-voice regex")
});

const HEDGE_WORDS: &[&str] = &[
    "may", "might", "could", "possibly", "perhaps", "likely", "suggests", "suggest", "appears",
    "appear", "seems", "seem", "indicates", "indicate",
];

const FILLER_PHRASES: &[&str] = &[
    "in order to",
    "it is important to note",
    "due to the fact that",
    "a number of",
    "in terms of",
    "it should be noted",
];

const TRANSITION_WORDS: &[&str] = &[
    "however",
    "therefore",
    "moreover",
    "furthermore",
    "consequently",
    "in addition",
    "in contrast",
    "nevertheless",
];

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "among", "because", "been", "before", "being", "between", "both",
    "could", "during", "each", "from", "have", "into", "more", "most", "other", "over", "such",
    "than", "that", "their", "there", "these", "this", "those", "through", "under", "using",
    "were", "which", "while", "with", "would",
];

/// Quantitative text statistics computed locally (no oracle call)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WritingMetrics {
    pub avg_sentence_length: f64,
    pub max_sentence_length: u32,
    pub avg_paragraph_length: f64,
    pub total_sentences: u32,
    pub total_words: u32,
    pub passive_voice_ratio: f64,
    pub hedge_word_count: u32,
    pub filler_word_count: u32,
    pub transition_word_count: u32,
    pub unique_word_ratio: f64,
    pub sentences_over_40_words: u32,
    pub top_repeated_words: Vec<(String, u32)>,
}

/// Writing assessment of one section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionWriting {
    pub clarity: Score,
    pub conciseness: Score,
    pub academic_tone: Score,
    pub structure: Score,
    pub precision: Score,
    pub section_specific: Score,
    pub overall_section_score: Score,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub problematic_sentences: Vec<ProblemSentence>,
}

/// A flagged sentence with a suggested rewrite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemSentence {
    pub sentence: String,
    pub issue: String,
    pub rewrite: String,
}

/// One prioritized improvement from the synthesis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Improvement {
    pub priority: u32,
    pub issue: String,
    pub detail: String,
}

/// Holistic writing-quality assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WritingReport {
    #[serde(rename = "_skipped")]
    pub skipped: bool,
    pub overall_writing_score: Score,
    pub overall_assessment: String,
    pub sections: BTreeMap<String, SectionWriting>,
    pub quantitative_metrics: WritingMetrics,
    pub cross_section_patterns: Vec<String>,
    pub top_improvements: Vec<Improvement>,
    pub style_guide_references: Vec<String>,
    pub readability_level: String,
    pub data_confidence: ConfidenceLevel,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Synthesis {
    overall_writing_score: Score,
    overall_assessment: String,
    cross_section_patterns: Vec<String>,
    top_improvements: Vec<Improvement>,
    style_guide_references: Vec<String>,
    readability_level: String,
    data_confidence: ConfidenceLevel,
}

impl SectionWriting {
    fn failed(note: &str) -> Self {
        Self {
            clarity: Score::Known(0.0),
            conciseness: Score::Known(0.0),
            academic_tone: Score::Known(0.0),
            structure: Score::Known(0.0),
            precision: Score::Known(0.0),
            section_specific: Score::Known(0.0),
            overall_section_score: Score::Known(0.0),
            weaknesses: vec![note.to_string()],
            ..Default::default()
        }
    }
}

impl WritingReport {
    /// Placeholder for an unselected agent
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            overall_assessment: NOT_SELECTED_NOTE.to_string(),
            readability_level: "N/A".to_string(),
            ..Default::default()
        }
    }

    /// Degraded result when no text is analyzable or the oracle is unavailable
    pub fn empty(note: &str) -> Self {
        Self {
            overall_assessment: note.to_string(),
            readability_level: "unknown".to_string(),
            data_confidence: ConfidenceLevel::Low,
            ..Default::default()
        }
    }
}

/// Compute quantitative writing metrics for a block of text.
pub fn compute_metrics(text: &str) -> WritingMetrics {
    let sentences: Vec<&str> = SENTENCE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|s| s.len() > 20)
        .collect();

    let words: Vec<&str> = text.split_whitespace().collect();
    let total_words = words.len() as u32;
    let total_sentences = sentences.len() as u32;

    if total_sentences == 0 || total_words == 0 {
        return WritingMetrics::default();
    }

    let sentence_lengths: Vec<u32> = sentences
        .iter()
        .map(|s| s.split_whitespace().count() as u32)
        .collect();
    let max_sentence_length = sentence_lengths.iter().copied().max().unwrap_or(0);
    let avg_sentence_length =
        sentence_lengths.iter().sum::<u32>() as f64 / total_sentences as f64;
    let sentences_over_40_words = sentence_lengths.iter().filter(|&&l| l > 40).count() as u32;

    let paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let avg_paragraph_length = if paragraphs.is_empty() {
        0.0
    } else {
        paragraphs
            .iter()
            .map(|p| p.split_whitespace().count())
            .sum::<usize>() as f64
            / paragraphs.len() as f64
    };

    let passive_count = PASSIVE_VOICE.find_iter(text).count() as f64;
    let passive_voice_ratio = passive_count / total_sentences as f64;

    let lower = text.to_lowercase();
    let lower_words: Vec<String> = lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect();

    let hedge_word_count = lower_words
        .iter()
        .filter(|w| HEDGE_WORDS.contains(&w.as_str()))
        .count() as u32;
    let transition_word_count = lower_words
        .iter()
        .filter(|w| TRANSITION_WORDS.contains(&w.as_str()))
        .count() as u32;
    let filler_word_count = FILLER_PHRASES
        .iter()
        .map(|p| lower.matches(p).count() as u32)
        .sum();

    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for word in &lower_words {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }
    let unique_word_ratio = counts.len() as f64 / lower_words.len() as f64;

    let mut repeated: Vec<(String, u32)> = counts
        .into_iter()
        .filter(|(w, _)| w.len() > 4 && !STOPWORDS.contains(w))
        .map(|(w, c)| (w.to_string(), c))
        .collect();
    repeated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    repeated.truncate(5);

    WritingMetrics {
        avg_sentence_length: (avg_sentence_length * 10.0).round() / 10.0,
        max_sentence_length,
        avg_paragraph_length: (avg_paragraph_length * 10.0).round() / 10.0,
        total_sentences,
        total_words,
        passive_voice_ratio: (passive_voice_ratio * 100.0).round() / 100.0,
        hedge_word_count,
        filler_word_count,
        transition_word_count,
        unique_word_ratio: (unique_word_ratio * 100.0).round() / 100.0,
        sentences_over_40_words,
        top_repeated_words: repeated,
    }
}

/// Agent 8: coaches writing quality across sections
#[derive(Clone)]
pub struct WritingCoach {
    oracle: OracleClient,
}

impl WritingCoach {
    /// Create a new writing coach
    pub fn new(oracle: OracleClient) -> Self {
        Self { oracle }
    }

    /// Assess writing quality across all analyzable sections
    pub async fn analyze(&self, sections: &SectionBundle, paper_type: PaperType) -> WritingReport {
        info!("Writing coach evaluating style");

        let analyzable: Vec<(Section, &str, &str)> = SECTION_STANDARDS
            .iter()
            .filter_map(|(section, standards)| {
                let text = sections.get(*section);
                (text.trim().len() > MIN_SECTION_CHARS).then_some((*section, text, *standards))
            })
            .collect();

        if analyzable.is_empty() {
            debug!("No analyzable sections found");
            return WritingReport::empty("No paper sections with sufficient text found.");
        }

        let full_text: String = analyzable
            .iter()
            .map(|(_, text, _)| *text)
            .collect::<Vec<_>>()
            .join(" ");
        let overall_metrics = compute_metrics(&full_text);

        let mut section_analyses = BTreeMap::new();
        for (section, text, standards) in &analyzable {
            debug!(section = %section, "Analyzing section writing");
            let metrics = compute_metrics(text);
            let analysis = self
                .analyze_section(section.as_str(), text, standards, &metrics)
                .await;
            section_analyses.insert(section.as_str().to_string(), analysis);
        }

        let synthesis = self
            .synthesize(&section_analyses, &overall_metrics, paper_type)
            .await;

        info!(
            score = %synthesis.overall_writing_score,
            sections = section_analyses.len(),
            "Writing assessment complete"
        );

        WritingReport {
            skipped: false,
            overall_writing_score: synthesis.overall_writing_score,
            overall_assessment: synthesis.overall_assessment,
            sections: section_analyses,
            quantitative_metrics: overall_metrics,
            cross_section_patterns: synthesis.cross_section_patterns,
            top_improvements: synthesis.top_improvements,
            style_guide_references: synthesis.style_guide_references,
            readability_level: if synthesis.readability_level.is_empty() {
                "unknown".to_string()
            } else {
                synthesis.readability_level
            },
            data_confidence: synthesis.data_confidence,
        }
    }

    async fn analyze_section(
        &self,
        name: &str,
        text: &str,
        standards: &str,
        metrics: &WritingMetrics,
    ) -> SectionWriting {
        let prompt = format!(
            "Analyze this {} section's writing quality.\n\n\
             SECTION-SPECIFIC STANDARDS:\n{}\n\n\
             QUANTITATIVE METRICS (pre-computed from the text):\n\
             - Average sentence length: {} words\n\
             - Longest sentence: {} words\n\
             - Total sentences: {}\n\
             - Passive voice ratio: {:.0}%\n\
             - Hedge words found: {}\n\
             - Filler phrases found: {}\n\
             - Transition words: {}\n\
             - Unique word ratio: {:.0}%\n\
             - Sentences over 40 words: {}\n\n\
             SECTION TEXT:\n{}",
            name.to_uppercase(),
            standards,
            metrics.avg_sentence_length,
            metrics.max_sentence_length,
            metrics.total_sentences,
            metrics.passive_voice_ratio * 100.0,
            metrics.hedge_word_count,
            metrics.filler_word_count,
            metrics.transition_word_count,
            metrics.unique_word_ratio * 100.0,
            metrics.sentences_over_40_words,
            truncate_chars(text, SECTION_CHAR_CAP),
        );

        let messages = vec![
            Message::system(WRITING_SECTION_PROMPT),
            Message::user(prompt),
        ];

        match self.oracle.complete_json(messages, 0.3).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(section = %name, error = %e, "Section writing payload did not match schema");
                SectionWriting::failed("Analysis returned an unexpected payload")
            }),
            Err(e) => {
                warn!(section = %name, error = %e, "Section writing analysis failed");
                SectionWriting::failed("Analysis failed")
            }
        }
    }

    async fn synthesize(
        &self,
        sections: &BTreeMap<String, SectionWriting>,
        metrics: &WritingMetrics,
        paper_type: PaperType,
    ) -> Synthesis {
        let summary: BTreeMap<&str, serde_json::Value> = sections
            .iter()
            .map(|(name, analysis)| {
                (
                    name.as_str(),
                    serde_json::json!({
                        "score": analysis.overall_section_score,
                        "strengths": analysis.strengths,
                        "weaknesses": analysis.weaknesses,
                    }),
                )
            })
            .collect();

        let prompt = format!(
            "Synthesize this writing quality assessment.\n\n\
             PAPER TYPE: {}\n\n\
             PER-SECTION RESULTS:\n{}\n\n\
             OVERALL QUANTITATIVE METRICS:\n{}\n\n\
             Provide your holistic assessment.",
            paper_type,
            serde_json::to_string_pretty(&summary).unwrap_or_default(),
            serde_json::to_string_pretty(metrics).unwrap_or_default(),
        );

        let messages = vec![
            Message::system(WRITING_SYNTHESIS_PROMPT),
            Message::user(prompt),
        ];

        match self.oracle.complete_json(messages, 0.3).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "Writing synthesis payload did not match schema");
                Synthesis::failed()
            }),
            Err(e) => {
                warn!(error = %e, "Writing synthesis failed");
                Synthesis::failed()
            }
        }
    }
}

impl Synthesis {
    fn failed() -> Self {
        Self {
            overall_writing_score: Score::Known(0.0),
            overall_assessment: "Synthesis failed".to_string(),
            readability_level: "unknown".to_string(),
            data_confidence: ConfidenceLevel::Low,
            ..Default::default()
        }
    }
}
