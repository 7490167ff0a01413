//! Agent behavior tests: schema shape, degradation, and prompt routing,
//! with the oracle and metadata APIs mocked via wiremock.

use pretty_assertions::assert_eq as pretty_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use paper_analyzer::agents::{
    AgentKind, AgentReport, CitationHunter, CitationReport, FundingReport, JournalReport,
    JournalRecommender, MethodologyCritic, MethodologyReport, PlagiarismDetector,
    PlagiarismReport, ResultsReport, ResultsSynthesizer, VisualizationReport, WritingCoach,
    WritingReport,
};
use paper_analyzer::config::{OpenAlexConfig, OracleConfig, RequestConfig, ScholarConfig};
use paper_analyzer::ingest::{PaperType, SectionBundle};
use paper_analyzer::metadata::{OpenAlexClient, ScholarClient};
use paper_analyzer::oracle::OracleClient;

fn oracle(base_url: &str) -> OracleClient {
    let config = OracleConfig {
        api_key: "test-api-key".to_string(),
        base_url: base_url.to_string(),
        model: "gpt-4o-mini".to_string(),
        vision_model: "gpt-4o".to_string(),
    };
    OracleClient::new(
        &config,
        RequestConfig {
            timeout_ms: 5000,
            max_retries: 0,
            retry_delay_ms: 10,
        },
    )
    .expect("oracle client")
}

fn openalex(base_url: &str) -> OpenAlexClient {
    OpenAlexClient::new(
        &OpenAlexConfig {
            base_url: base_url.to_string(),
            mailto: None,
        },
        RequestConfig {
            timeout_ms: 5000,
            max_retries: 0,
            retry_delay_ms: 10,
        },
    )
    .expect("openalex client")
}

fn scholar(base_url: &str) -> ScholarClient {
    ScholarClient::new(
        &ScholarConfig {
            base_url: base_url.to_string(),
            api_key: None,
        },
        RequestConfig {
            timeout_ms: 5000,
            max_retries: 0,
            retry_delay_ms: 10,
        },
    )
    .expect("scholar client")
}

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": content.to_string()}
        }]
    })
}

// --- placeholder schema shape ------------------------------------------

fn default_report(kind: AgentKind) -> AgentReport {
    match kind {
        AgentKind::Results => AgentReport::Results(ResultsReport::default()),
        AgentKind::Writing => AgentReport::Writing(WritingReport::default()),
        AgentKind::Methodology => AgentReport::Methodology(MethodologyReport::default()),
        AgentKind::Visualization => AgentReport::Visualization(VisualizationReport::default()),
        AgentKind::Citations => AgentReport::Citations(CitationReport::default()),
        AgentKind::Plagiarism => AgentReport::Plagiarism(PlagiarismReport::default()),
        AgentKind::Journals => AgentReport::Journals(JournalReport::default()),
        AgentKind::Funding => AgentReport::Funding(FundingReport::default()),
    }
}

fn key_set(value: &serde_json::Value) -> Vec<String> {
    value
        .as_object()
        .expect("report serializes to an object")
        .keys()
        .cloned()
        .collect()
}

#[test]
fn skipped_placeholders_have_exactly_the_schema_key_set() {
    for kind in AgentKind::ALL {
        let skipped = serde_json::to_value(AgentReport::skipped(kind)).unwrap();
        let executed = serde_json::to_value(default_report(kind)).unwrap();
        pretty_eq!(key_set(&skipped), key_set(&executed), "{} key set", kind);
        assert_eq!(skipped["_skipped"], true, "{} flag", kind);
        assert_eq!(executed["_skipped"], false, "{} default flag", kind);
    }
}

// --- degradation -------------------------------------------------------

#[tokio::test]
async fn results_synthesizer_parses_valid_completion() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
            "primary_outcome": {
                "measure": "Anxiety score",
                "result": "Reduced by 12 points",
                "statistically_significant": true,
                "p_value": "<0.001"
            },
            "key_findings": [],
            "main_conclusion": "It works.",
            "strength_of_evidence": "strong"
        }))))
        .mount(&mock_server)
        .await;

    let agent = ResultsSynthesizer::new(oracle(&mock_server.uri()));
    let report = agent.analyze("The intervention reduced anxiety.").await;

    assert!(!report.skipped);
    assert!(report.primary_outcome.statistically_significant);
    assert_eq!(report.main_conclusion, "It works.");
}

#[tokio::test]
async fn results_synthesizer_degrades_when_oracle_is_down() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let agent = ResultsSynthesizer::new(oracle(&mock_server.uri()));
    let report = agent.analyze("Some results text.").await;

    // Schema-valid degraded output, never an error
    assert!(!report.skipped);
    assert_eq!(report.main_conclusion, "Results synthesis unavailable");
    assert!(report.key_findings.is_empty());
}

#[tokio::test]
async fn methodology_critic_degrades_on_malformed_completion() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "no json here"}}]
            })),
        )
        .mount(&mock_server)
        .await;

    let agent = MethodologyCritic::new(oracle(&mock_server.uri()));
    let report = agent.analyze("Methods text", "", "").await;

    assert!(!report.skipped);
    assert_eq!(
        report.critical_issues,
        vec!["Methodology critique unavailable".to_string()]
    );
}

// --- prompt routing ----------------------------------------------------

#[tokio::test]
async fn plagiarism_uses_review_criteria_for_review_papers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("REVIEW / META-ANALYSIS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
            "plagiarism_risk_score": 10,
            "risk_level": "low",
            "overall_assessment": "Expected paraphrasing only."
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let agent = PlagiarismDetector::new(oracle(&mock_server.uri()));
    let report = agent.analyze("Review paper text.", PaperType::Review).await;

    assert_eq!(report.overall_assessment, "Expected paraphrasing only.");
}

#[tokio::test]
async fn plagiarism_uses_strict_criteria_for_original_research() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("ORIGINAL RESEARCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
            "plagiarism_risk_score": 35,
            "risk_level": "medium",
            "overall_assessment": "Several uncited claims."
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let agent = PlagiarismDetector::new(oracle(&mock_server.uri()));
    let report = agent
        .analyze("Original paper text.", PaperType::OriginalResearch)
        .await;

    assert_eq!(report.overall_assessment, "Several uncited claims.");
}

// --- citation hunter ---------------------------------------------------

#[tokio::test]
async fn citation_hunter_degrades_when_no_literature_found() {
    let oracle_server = MockServer::start().await;
    let scholar_server = MockServer::start().await;

    // Oracle must never be consulted without literature context
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({}))))
        .expect(0)
        .mount(&oracle_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/paper/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&scholar_server)
        .await;

    let agent = CitationHunter::new(oracle(&oracle_server.uri()), scholar(&scholar_server.uri()));
    let report = agent.analyze("Some title", "Some abstract").await;

    assert_eq!(report, CitationReport::no_literature());
}

#[tokio::test]
async fn citation_hunter_analyzes_found_literature() {
    let oracle_server = MockServer::start().await;
    let scholar_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/paper/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"title": "Related work", "abstract": "Similar RCT", "year": 2021, "citationCount": 40}
            ]
        })))
        .mount(&scholar_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Related work"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
            "supporting_papers": [
                {"title": "Related work", "year": 2021, "relevance": "confirms", "key_finding": "d=0.8"}
            ],
            "literature_quality": "moderate",
            "citation_context": "Consistent with the field."
        }))))
        .expect(1)
        .mount(&oracle_server)
        .await;

    let agent = CitationHunter::new(oracle(&oracle_server.uri()), scholar(&scholar_server.uri()));
    let report = agent.analyze("Some title", "Some abstract").await;

    assert_eq!(report.supporting_papers.len(), 1);
    assert_eq!(report.citation_context, "Consistent with the field.");
}

// --- writing coach -----------------------------------------------------

#[tokio::test]
async fn writing_coach_degrades_without_analyzable_text() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({}))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let agent = WritingCoach::new(oracle(&mock_server.uri()));
    let report = agent
        .analyze(&SectionBundle::default(), PaperType::OriginalResearch)
        .await;

    assert!(!report.skipped);
    assert_eq!(
        report.overall_assessment,
        "No paper sections with sufficient text found."
    );
    assert!(report.sections.is_empty());
}

// --- journal recommender ----------------------------------------------

#[tokio::test]
async fn journal_recommender_falls_back_to_llm_only_when_openalex_is_empty() {
    let oracle_server = MockServer::start().await;
    let openalex_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&openalex_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&openalex_server)
        .await;

    // One payload that satisfies the query, suggestion, and ranking calls
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
            "queries": ["mindfulness anxiety trial"],
            "suggested_journals": [],
            "primary_recommendations": [{
                "journal_name": "Journal of Anxiety Disorders",
                "publisher": "Elsevier",
                "scope_fit": "excellent",
                "fit_reasoning": "In scope.",
                "acceptance_likelihood": "medium",
                "is_open_access": false,
                "similar_papers_found": 0
            }],
            "publication_strategy": "Submit there first.",
            "recommendation_confidence": "high"
        }))))
        .mount(&oracle_server)
        .await;

    let agent = JournalRecommender::new(oracle(&oracle_server.uri()), openalex(&openalex_server.uri()));
    let report = agent
        .analyze("Some title", "Some abstract", "original_research", Some(4.0), None)
        .await;

    // Ungrounded recommendations are forced to low confidence
    assert_eq!(
        report.recommendation_confidence,
        paper_analyzer::agents::ConfidenceLevel::Low
    );
    assert_eq!(report.journals_found, 0);
    assert_eq!(report.search_queries_used, vec!["mindfulness anxiety trial"]);
    assert_eq!(report.primary_recommendations.len(), 1);
}
