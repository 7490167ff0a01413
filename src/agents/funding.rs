use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{truncate_chars, ConfidenceLevel, NOT_SELECTED_NOTE};
use crate::metadata::{FunderSeen, FundingStats, OpenAlexClient};
use crate::oracle::{Message, OracleClient};
use crate::prompts::{FUNDING_PROMPT, SEARCH_QUERY_PROMPT};

/// Works scanned per search query
const WORKS_PER_QUERY: u32 = 50;

/// Funders forwarded to the ranking oracle
const RANKING_CANDIDATES: usize = 15;

/// Abstract cap embedded in prompts
const ABSTRACT_CAP: usize = 2_000;

/// Funding-source recommendations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingReport {
    #[serde(rename = "_skipped")]
    pub skipped: bool,
    pub search_queries_used: Vec<String>,
    pub funders_found: u32,
    pub primary_funders: Vec<FunderRecommendation>,
    pub secondary_funders: Vec<FunderRecommendation>,
    pub funding_strategy: String,
    pub funding_landscape: String,
    pub total_similar_funded_papers: u32,
    pub data_confidence: ConfidenceLevel,
}

/// One recommended funder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunderRecommendation {
    pub funder_name: String,
    pub country: String,
    pub homepage_url: Option<String>,
    pub relevance: String,
    pub relevance_reasoning: String,
    pub known_programs: Vec<String>,
    pub typical_amount: String,
    pub typical_duration: String,
    pub eligibility_notes: String,
    pub application_tip: String,
}

/// Candidate funder assembled from OpenAlex data for the ranking prompt
#[derive(Debug, Clone, Serialize)]
struct CandidateFunder {
    display_name: String,
    country: Option<String>,
    homepage_url: Option<String>,
    grants_count: Option<u64>,
    similar_papers_funded: u32,
}

impl FundingReport {
    /// Placeholder for an unselected agent
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            funding_strategy: NOT_SELECTED_NOTE.to_string(),
            ..Default::default()
        }
    }

    /// Empty recommendations when grounding and fallback both fail
    pub fn empty() -> Self {
        Self {
            data_confidence: ConfidenceLevel::Low,
            ..Default::default()
        }
    }
}

/// Agent 6: identifies funding sources using OpenAlex funder data
#[derive(Clone)]
pub struct FundingAdvisor {
    oracle: OracleClient,
    openalex: OpenAlexClient,
}

impl FundingAdvisor {
    /// Create a new funding advisor
    pub fn new(oracle: OracleClient, openalex: OpenAlexClient) -> Self {
        Self { oracle, openalex }
    }

    /// Recommend funding sources for the paper's research area
    pub async fn analyze(
        &self,
        title: &str,
        abstract_text: &str,
        paper_type: &str,
    ) -> FundingReport {
        info!("Funding advisor searching funders");

        let queries = self.extract_search_queries(title, abstract_text).await;
        debug!(?queries, "Search queries generated");

        let mut funders: HashMap<String, FunderSeen> = HashMap::new();
        let mut stats = FundingStats::default();
        for query in &queries {
            let (found, query_stats) = self
                .openalex
                .search_work_funders(query, WORKS_PER_QUERY)
                .await;
            stats.total_works += query_stats.total_works;
            stats.funded_works += query_stats.funded_works;
            for (id, seen) in found {
                funders
                    .entry(id.clone())
                    .or_insert_with(|| FunderSeen {
                        id,
                        name: seen.name.clone(),
                        count: 0,
                    })
                    .count += seen.count;
            }
        }

        if funders.is_empty() {
            warn!("No funder data found");
            let mut report = self.rank_funders(title, abstract_text, paper_type, &[], stats).await;
            report.search_queries_used = queries;
            report.funders_found = 0;
            report.data_confidence = ConfidenceLevel::Low;
            return report;
        }

        let mut ranked: Vec<&FunderSeen> = funders.values().collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
        ranked.truncate(RANKING_CANDIDATES);

        let mut candidates = Vec::with_capacity(ranked.len());
        for seen in ranked {
            let record = self.openalex.funder_details(&seen.id).await;
            candidates.push(CandidateFunder {
                display_name: record
                    .as_ref()
                    .and_then(|r| r.display_name.clone())
                    .unwrap_or_else(|| seen.name.clone()),
                country: record.as_ref().and_then(|r| r.country_code.clone()),
                homepage_url: record.as_ref().and_then(|r| r.homepage_url.clone()),
                grants_count: record.as_ref().and_then(|r| r.grants_count),
                similar_papers_funded: seen.count,
            });
        }

        let funders_found = candidates.len() as u32;
        info!(funders = funders_found, funded_works = stats.funded_works, "Funder data collected");

        let mut report = self
            .rank_funders(title, abstract_text, paper_type, &candidates, stats)
            .await;
        report.search_queries_used = queries;
        report.funders_found = funders_found;

        info!(
            primary = report.primary_funders.len(),
            secondary = report.secondary_funders.len(),
            confidence = %report.data_confidence,
            "Funding recommendations complete"
        );

        report
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

        match self.oracle.complete_json(messages, 0.3).await {
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
                    queries.push(
                        title
                            .split_whitespace()
                            .take(5)
                            .collect::<Vec<_>>()
                            .join(" "),
                    );
                }
                queries
            }
            Err(e) => {
                warn!(error = %e, "Query extraction failed");
                vec![title
                    .split_whitespace()
                    .take(5)
                    .collect::<Vec<_>>()
                    .join(" ")]
            }
        }
    }

    async fn rank_funders(
        &self,
        title: &str,
        abstract_text: &str,
        paper_type: &str,
        candidates: &[CandidateFunder],
        stats: FundingStats,
    ) -> FundingReport {
        let funding_rate = if stats.total_works == 0 {
            0.0
        } else {
            stats.funded_works as f64 / stats.total_works as f64
        };

        let funders_text = if candidates.is_empty() {
            "No funder data could be retrieved from OpenAlex. Recommend from your knowledge of \
             the field and mark data_confidence low."
                .to_string()
        } else {
            serde_json::to_string_pretty(candidates).unwrap_or_default()
        };

        let prompt = format!(
            "RESEARCH PAPER:\nTitle: {}\nAbstract: {}\nPaper Type: {}\n\n\
             ANALYSIS STATS:\n\
             - Total similar papers searched: {}\n\
             - Papers with funding data: {} ({:.0}%)\n\n\
             FUNDERS WHO FUNDED SIMILAR RESEARCH (from OpenAlex, sorted by frequency):\n{}\n\n\
             Based on the paper's topic and the funder data, provide your personalized funding \
             recommendations. Enrich each funder with your knowledge about their specific \
             programs, typical amounts, and eligibility. Be honest: if the funding data coverage \
             is low, say so.",
            title,
            truncate_chars(abstract_text, ABSTRACT_CAP),
            paper_type,
            stats.total_works,
            stats.funded_works,
            funding_rate * 100.0,
            funders_text,
        );

        let messages = vec![Message::system(FUNDING_PROMPT), Message::user(prompt)];

        let mut report = match self.oracle.complete_json(messages, 0.4).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "Funding payload did not match schema");
                FundingReport::empty()
            }),
            Err(e) => {
                warn!(error = %e, "Funding ranking failed");
                FundingReport::empty()
            }
        };

        report.total_similar_funded_papers = stats.funded_works;
        report
    }
}
