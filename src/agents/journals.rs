use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{truncate_chars, ConfidenceLevel, EvidenceStrength, NOT_SELECTED_NOTE};
use crate::metadata::{OpenAlexClient, VenueRecord};
use crate::oracle::{Message, OracleClient};
use crate::prompts::{JOURNAL_RANKING_PROMPT, JOURNAL_SUGGEST_PROMPT, SEARCH_QUERY_PROMPT};

/// Works scanned per search query
const WORKS_PER_QUERY: u32 = 50;

/// Frequency-based candidates carried into detail lookup
const TOP_FREQUENCY_VENUES: usize = 12;

/// Candidates forwarded to the ranking oracle
const RANKING_CANDIDATES: usize = 20;

/// Abstract cap embedded in prompts
const ABSTRACT_CAP: usize = 2_000;

/// Journal-submission recommendations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalReport {
    #[serde(rename = "_skipped")]
    pub skipped: bool,
    pub search_queries_used: Vec<String>,
    pub journals_found: u32,
    pub primary_recommendations: Vec<JournalRecommendation>,
    pub secondary_recommendations: Vec<JournalRecommendation>,
    pub publication_strategy: String,
    pub key_strengths_for_submission: Vec<String>,
    pub potential_concerns_for_reviewers: Vec<String>,
    pub recommendation_confidence: ConfidenceLevel,
}

/// One recommended journal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalRecommendation {
    pub journal_name: String,
    pub publisher: String,
    pub impact_factor_2yr: Option<f64>,
    pub h_index: Option<u32>,
    pub is_open_access: bool,
    pub apc_usd: Option<u64>,
    pub homepage_url: Option<String>,
    pub issn: Option<String>,
    pub scope_fit: String,
    pub fit_reasoning: String,
    pub acceptance_likelihood: String,
    pub similar_papers_found: u32,
}

/// Candidate journal assembled from OpenAlex data for the ranking prompt
#[derive(Debug, Clone, Serialize)]
struct CandidateJournal {
    display_name: String,
    publisher: String,
    issn: Option<String>,
    is_oa: bool,
    apc_usd: Option<u64>,
    homepage_url: Option<String>,
    h_index: Option<u32>,
    impact_factor_2yr: Option<f64>,
    works_count: u64,
    cited_by_count: u64,
    #[serde(rename = "type")]
    venue_type: String,
    similar_papers_found: u32,
    source: &'static str,
    relevance_score: f64,
}

struct Candidate {
    id: String,
    name: String,
    count: u32,
    llm_suggested: bool,
    record: Option<VenueRecord>,
}

impl JournalReport {
    /// Placeholder for an unselected agent
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            publication_strategy: NOT_SELECTED_NOTE.to_string(),
            ..Default::default()
        }
    }

    /// Empty recommendations when both grounding and fallback fail
    pub fn empty() -> Self {
        Self {
            publication_strategy: "Unable to generate recommendations. Please consult journal \
                selection tools like Jane (https://jane.biosemantics.org/) or Elsevier Journal \
                Finder."
                .to_string(),
            recommendation_confidence: ConfidenceLevel::Low,
            ..Default::default()
        }
    }
}

/// Agent 5: recommends journals using OpenAlex grounding data
#[derive(Clone)]
pub struct JournalRecommender {
    oracle: OracleClient,
    openalex: OpenAlexClient,
}

impl JournalRecommender {
    /// Create a new journal recommender
    pub fn new(oracle: OracleClient, openalex: OpenAlexClient) -> Self {
        Self { oracle, openalex }
    }

    /// Recommend journals for submission.
    ///
    /// `methods_quality` and `evidence_strength` are optional hints from the
    /// methodology and results agents; absent when those slots are
    /// placeholders.
    pub async fn analyze(
        &self,
        title: &str,
        abstract_text: &str,
        paper_type: &str,
        methods_quality: Option<f64>,
        evidence_strength: Option<EvidenceStrength>,
    ) -> JournalReport {
        info!("Journal recommender searching venues");

        let queries = self.extract_search_queries(title, abstract_text).await;
        debug!(?queries, "Search queries generated");

        let mut candidates: HashMap<String, Candidate> = HashMap::new();
        for query in &queries {
            let venues = self
                .openalex
                .search_work_venues(query, WORKS_PER_QUERY)
                .await;
            for (id, seen) in venues {
                candidates
                    .entry(id.clone())
                    .or_insert_with(|| Candidate {
                        id,
                        name: seen.name.clone(),
                        count: 0,
                        llm_suggested: false,
                        record: None,
                    })
                    .count += seen.count;
            }
        }

        let suggested_names = self.suggest_journal_names(title, abstract_text).await;
        for name in &suggested_names {
            let Some(record) = self.openalex.find_venue_by_name(name).await else {
                continue;
            };
            let Some(id) = record.id.clone() else { continue };
            candidates.entry(id.clone()).or_insert_with(|| Candidate {
                id,
                name: record
                    .display_name
                    .clone()
                    .unwrap_or_else(|| name.clone()),
                count: 0,
                llm_suggested: true,
                record: Some(record),
            });
        }

        if candidates.is_empty() {
            warn!("No venues found, falling back to LLM-only recommendations");
            return self
                .llm_only_fallback(title, abstract_text, paper_type, methods_quality,
                    evidence_strength, queries)
                .await;
        }

        let details = self.collect_details(candidates).await;
        if details.is_empty() {
            warn!("Could not fetch venue details, falling back to LLM-only recommendations");
            return self
                .llm_only_fallback(title, abstract_text, paper_type, methods_quality,
                    evidence_strength, queries)
                .await;
        }

        let journals_found = details.len() as u32;
        info!(journals = journals_found, "Venue details collected");

        let mut report = self
            .rank_journals(title, abstract_text, paper_type, methods_quality,
                evidence_strength, &details)
            .await;
        report.search_queries_used = queries;
        report.journals_found = journals_found;

        info!(
            primary = report.primary_recommendations.len(),
            secondary = report.secondary_recommendations.len(),
            confidence = %report.recommendation_confidence,
            "Journal recommendations complete"
        );

        report
    }

    /// Fetch details for the top frequency candidates plus all LLM-suggested
    /// ones, scored by impact, h-index, and frequency
    async fn collect_details(&self, candidates: HashMap<String, Candidate>) -> Vec<CandidateJournal> {
        let mut frequency: Vec<&Candidate> = candidates
            .values()
            .filter(|c| !c.llm_suggested)
            .collect();
        frequency.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));

        let selected: Vec<&Candidate> = frequency
            .into_iter()
            .take(TOP_FREQUENCY_VENUES)
            .chain(candidates.values().filter(|c| c.llm_suggested))
            .collect();

        let mut details = Vec::new();
        for candidate in selected {
            let record = match &candidate.record {
                Some(record) => record.clone(),
                None => match self.openalex.venue_details(&candidate.id).await {
                    Some(record) => record,
                    None => continue,
                },
            };

            let impact = record.impact_factor_2yr();
            let h_index = record.h_index();
            let relevance_score = impact.unwrap_or(0.0) * 3.0
                + h_index.unwrap_or(0) as f64 * 0.1
                + candidate.count as f64 * 2.0;

            details.push(CandidateJournal {
                display_name: record
                    .display_name
                    .clone()
                    .unwrap_or_else(|| candidate.name.clone()),
                publisher: record
                    .host_organization_name
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                issn: record.primary_issn().map(String::from),
                is_oa: record.is_oa.unwrap_or(false),
                apc_usd: record.apc_usd,
                homepage_url: record.homepage_url.clone(),
                h_index,
                impact_factor_2yr: impact,
                works_count: record.works_count.unwrap_or(0),
                cited_by_count: record.cited_by_count.unwrap_or(0),
                venue_type: record
                    .source_type
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                similar_papers_found: candidate.count,
                source: if candidate.llm_suggested {
                    "llm_suggested"
                } else {
                    "frequency"
                },
                relevance_score,
            });
        }

        details.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        details.truncate(RANKING_CANDIDATES);
        details
    }

    async fn extract_search_queries(&self, title: &str, abstract_text: &str) -> Vec<String> {
        let prompt = format!(
            "Paper Title: {}\n\nAbstract: {}\n\n\
             Generate 3 search queries to find similar papers in academic databases.",
            title,
            truncate_chars(abstract_text, ABSTRACT_CAP)
        );
        let messages = vec![Message::system(SEARCH_QUERY_PROMPT), Message::user(prompt)];

        #[derive(Deserialize)]
        struct Queries {
            #[serde(default)]
            queries: Vec<String>,
        }

        match self.oracle.complete_json(messages, 0.4).await {
            Ok(value) => {
                let parsed: Queries = serde_json::from_value(value).unwrap_or(Queries {
                    queries: Vec::new(),
                });
                let mut queries: Vec<String> = parsed
                    .queries
                    .into_iter()
                    .filter(|q| !q.trim().is_empty())
                    .take(3)
                    .collect();
                if queries.is_empty() {
                    queries.push(fallback_query(title));
                }
                queries
            }
            Err(e) => {
                warn!(error = %e, "Query extraction failed");
                vec![fallback_query(title)]
            }
        }
    }

    async fn suggest_journal_names(&self, title: &str, abstract_text: &str) -> Vec<String> {
        let prompt = format!(
            "Paper Title: {}\n\nAbstract: {}",
            title,
            truncate_chars(abstract_text, 1_500)
        );
        let messages = vec![
            Message::system(JOURNAL_SUGGEST_PROMPT),
            Message::user(prompt),
        ];

        #[derive(Deserialize)]
        struct Suggestions {
            #[serde(default)]
            suggested_journals: Vec<String>,
        }

        match self.oracle.complete_json(messages, 0.4).await {
            Ok(value) => {
                let parsed: Suggestions = serde_json::from_value(value).unwrap_or(Suggestions {
                    suggested_journals: Vec::new(),
                });
                parsed.suggested_journals.into_iter().take(8).collect()
            }
            Err(e) => {
                warn!(error = %e, "Journal suggestion failed");
                Vec::new()
            }
        }
    }

    async fn rank_journals(
        &self,
        title: &str,
        abstract_text: &str,
        paper_type: &str,
        methods_quality: Option<f64>,
        evidence_strength: Option<EvidenceStrength>,
        details: &[CandidateJournal],
    ) -> JournalReport {
        let prompt = format!(
            "PAPER TO SUBMIT:\nTitle: {}\nAbstract: {}\n\n\
             PAPER QUALITY CONTEXT:\n{}\n\
             CANDIDATE JOURNALS (from OpenAlex, sorted by composite relevance score):\n{}\n\n\
             Based on the paper's content, quality, and the journal data above, provide your \
             ranked recommendations.",
            title,
            truncate_chars(abstract_text, ABSTRACT_CAP),
            quality_context(paper_type, methods_quality, evidence_strength),
            serde_json::to_string_pretty(details).unwrap_or_default(),
        );

        let messages = vec![
            Message::system(JOURNAL_RANKING_PROMPT),
            Message::user(prompt),
        ];

        match self.oracle.complete_json(messages, 0.4).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "Journal ranking payload did not match schema");
                JournalReport::empty()
            }),
            Err(e) => {
                warn!(error = %e, "Journal ranking failed");
                JournalReport::empty()
            }
        }
    }

    /// Recommend from model knowledge alone when OpenAlex yields nothing
    async fn llm_only_fallback(
        &self,
        title: &str,
        abstract_text: &str,
        paper_type: &str,
        methods_quality: Option<f64>,
        evidence_strength: Option<EvidenceStrength>,
        queries: Vec<String>,
    ) -> JournalReport {
        let prompt = format!(
            "PAPER TO SUBMIT:\nTitle: {}\nAbstract: {}\n\n\
             PAPER QUALITY CONTEXT:\n{}\n\
             NOTE: Journal data could not be retrieved from OpenAlex. Based on your knowledge of \
             academic journals, provide your best recommendations. Set impact_factor_2yr, h_index, \
             apc_usd, homepage_url, and issn to null for any values you are not certain about. \
             Set similar_papers_found to 0 for all.\n\nProvide your ranked recommendations.",
            title,
            truncate_chars(abstract_text, ABSTRACT_CAP),
            quality_context(paper_type, methods_quality, evidence_strength),
        );

        let messages = vec![
            Message::system(JOURNAL_RANKING_PROMPT),
            Message::user(prompt),
        ];

        let mut report = match self.oracle.complete_json(messages, 0.4).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "LLM-only journal payload did not match schema");
                JournalReport::empty()
            }),
            Err(e) => {
                warn!(error = %e, "LLM-only journal fallback failed");
                JournalReport::empty()
            }
        };

        // Ungrounded recommendations are always low confidence
        report.recommendation_confidence = ConfidenceLevel::Low;
        report.search_queries_used = queries;
        report.journals_found = 0;
        report
    }
}

fn fallback_query(title: &str) -> String {
    title
        .split_whitespace()
        .take(5)
        .collect::<Vec<_>>()
        .join(" ")
}

fn quality_context(
    paper_type: &str,
    methods_quality: Option<f64>,
    evidence_strength: Option<EvidenceStrength>,
) -> String {
    let mut context = format!("paper_type: {}\n", paper_type);
    match methods_quality {
        Some(quality) => context.push_str(&format!("methods_quality: {}/5\n", quality)),
        None => context.push_str("methods_quality: N/A (review paper or not assessed)\n"),
    }
    match evidence_strength {
        Some(strength) => context.push_str(&format!("evidence_strength: {}\n", strength)),
        None => context.push_str("evidence_strength: not assessed\n"),
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_report_shape() {
        let report = JournalReport::skipped();
        assert!(report.skipped);
        assert!(report.primary_recommendations.is_empty());
        assert_eq!(report.journals_found, 0);
        assert_eq!(report.recommendation_confidence, ConfidenceLevel::Unknown);
    }

    #[test]
    fn test_empty_report_points_at_alternatives() {
        let report = JournalReport::empty();
        assert!(!report.skipped);
        assert!(report.publication_strategy.contains("Jane"));
        assert_eq!(report.recommendation_confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn test_fallback_query_takes_first_five_words() {
        assert_eq!(
            fallback_query("Effects of mindfulness meditation on anxiety and depression"),
            "Effects of mindfulness meditation on"
        );
        assert_eq!(fallback_query("Short title"), "Short title");
    }

    #[test]
    fn test_quality_context_with_and_without_hints() {
        let with = quality_context("original_research", Some(4.0), Some(EvidenceStrength::Strong));
        assert!(with.contains("methods_quality: 4/5"));
        assert!(with.contains("evidence_strength: strong"));

        let without = quality_context("review", None, None);
        assert!(without.contains("methods_quality: N/A"));
        assert!(without.contains("evidence_strength: not assessed"));
    }

    #[test]
    fn test_report_parses_oracle_payload() {
        let report: JournalReport = serde_json::from_value(serde_json::json!({
            "primary_recommendations": [{
                "journal_name": "Journal of Anxiety Disorders",
                "publisher": "Elsevier",
                "impact_factor_2yr": 4.2,
                "h_index": 130,
                "is_open_access": false,
                "apc_usd": null,
                "scope_fit": "excellent",
                "fit_reasoning": "Directly in scope.",
                "acceptance_likelihood": "medium",
                "similar_papers_found": 6
            }],
            "publication_strategy": "Submit there first.",
            "recommendation_confidence": "high"
        }))
        .unwrap();

        assert_eq!(report.primary_recommendations.len(), 1);
        assert_eq!(
            report.primary_recommendations[0].impact_factor_2yr,
            Some(4.2)
        );
        assert_eq!(report.recommendation_confidence, ConfidenceLevel::High);
    }
}
