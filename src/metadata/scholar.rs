use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{RequestConfig, ScholarConfig};
use crate::error::{MetadataError, MetadataResult};

const PAPER_FIELDS: &str = "title,abstract,year,citationCount,authors";

/// Client for the Semantic Scholar Graph API paper search.
///
/// Search failures are absorbed into an empty result list; the citation
/// agent degrades to a "no related literature" report instead of aborting.
#[derive(Clone)]
pub struct ScholarClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    request_config: RequestConfig,
}

/// A related paper returned from search
#[derive(Debug, Clone, Deserialize)]
pub struct RelatedPaper {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(rename = "citationCount", default)]
    pub citation_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default = "Vec::new")]
    data: Vec<RelatedPaper>,
}

impl ScholarClient {
    /// Create a new Semantic Scholar client
    pub fn new(config: &ScholarConfig, request_config: RequestConfig) -> MetadataResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(MetadataError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search for papers related to `query`, absorbing failures to empty
    pub async fn search_papers(&self, query: &str, limit: u32) -> Vec<RelatedPaper> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        match self.search(query, limit).await {
            Ok(papers) => papers,
            Err(e) => {
                warn!(error = %e, "Semantic Scholar search failed");
                Vec::new()
            }
        }
    }

    async fn search(&self, query: &str, limit: u32) -> MetadataResult<Vec<RelatedPaper>> {
        let url = format!("{}/paper/search", self.base_url);
        let query_params = [
            ("query", query.to_string()),
            ("limit", limit.to_string()),
            ("fields", PAPER_FIELDS.to_string()),
        ];

        let mut retries = 0;
        loop {
            debug!(query = %query, retry = retries, "Semantic Scholar search");

            let mut request = self.client.get(&url).query(&query_params);
            if let Some(key) = &self.api_key {
                request = request.header("x-api-key", key);
            }

            let response = request.send().await.map_err(MetadataError::Http)?;
            let status = response.status();

            if status.as_u16() == 429 {
                if retries >= self.request_config.max_retries {
                    return Err(MetadataError::RateLimited { retries });
                }
                retries += 1;
                let delay =
                    Duration::from_millis(self.request_config.retry_delay_ms * 2_u64.pow(retries));
                warn!(
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Semantic Scholar rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(MetadataError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: SearchResponse =
                response
                    .json()
                    .await
                    .map_err(|e| MetadataError::InvalidResponse {
                        message: format!("Failed to parse response: {}", e),
                    })?;

            return Ok(body.data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = ScholarConfig {
            base_url: "https://api.semanticscholar.org/graph/v1/".to_string(),
            api_key: None,
        };
        let client = ScholarClient::new(&config, RequestConfig::default()).unwrap();
        assert_eq!(client.base_url(), "https://api.semanticscholar.org/graph/v1");
    }

    #[test]
    fn test_related_paper_parsing() {
        let paper: RelatedPaper = serde_json::from_value(serde_json::json!({
            "title": "Mindfulness and anxiety",
            "abstract": "An RCT of mindfulness.",
            "year": 2021,
            "citationCount": 57
        }))
        .unwrap();

        assert_eq!(paper.title.as_deref(), Some("Mindfulness and anxiety"));
        assert_eq!(paper.year, Some(2021));
        assert_eq!(paper.citation_count, Some(57));
    }

    #[tokio::test]
    async fn test_empty_query_short_circuits() {
        let config = ScholarConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
        };
        let client = ScholarClient::new(&config, RequestConfig::default()).unwrap();
        // No network call is made for a blank query
        assert!(client.search_papers("   ", 10).await.is_empty());
    }
}
