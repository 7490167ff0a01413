use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{OpenAlexConfig, RequestConfig};
use crate::error::{MetadataError, MetadataResult};

const WORK_VENUE_FIELDS: &str = "id,display_name,primary_location";
const WORK_FUNDER_FIELDS: &str = "id,display_name,funders,publication_year";
const SOURCE_FIELDS: &str = "id,display_name,host_organization_name,issn,is_oa,\
apc_usd,homepage_url,summary_stats,works_count,cited_by_count,type";
const FUNDER_FIELDS: &str = "id,display_name,country_code,homepage_url,grants_count,works_count";

/// Client for the OpenAlex scholarly-metadata API.
///
/// Failures after bounded retry are absorbed into empty results; the
/// recommendation agents degrade rather than abort when OpenAlex is down.
#[derive(Clone)]
pub struct OpenAlexClient {
    client: Client,
    base_url: String,
    mailto: Option<String>,
    request_config: RequestConfig,
}

/// Journal/venue record from the OpenAlex sources endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct VenueRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub host_organization_name: Option<String>,
    #[serde(default)]
    pub issn: Option<Vec<String>>,
    #[serde(default)]
    pub is_oa: Option<bool>,
    #[serde(default)]
    pub apc_usd: Option<u64>,
    #[serde(default)]
    pub homepage_url: Option<String>,
    #[serde(default)]
    pub summary_stats: Option<SummaryStats>,
    #[serde(default)]
    pub works_count: Option<u64>,
    #[serde(default)]
    pub cited_by_count: Option<u64>,
    #[serde(rename = "type", default)]
    pub source_type: Option<String>,
}

/// Citation statistics attached to a venue record
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryStats {
    #[serde(default)]
    pub h_index: Option<u32>,
    #[serde(rename = "2yr_mean_citedness", default)]
    pub two_year_mean_citedness: Option<f64>,
}

/// Funder record from the OpenAlex funders endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct FunderRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub homepage_url: Option<String>,
    #[serde(default)]
    pub grants_count: Option<u64>,
    #[serde(default)]
    pub works_count: Option<u64>,
}

/// A venue seen while scanning similar works, with its frequency
#[derive(Debug, Clone)]
pub struct VenueSeen {
    pub id: String,
    pub name: String,
    pub count: u32,
}

/// A funder seen while scanning similar works, with its frequency
#[derive(Debug, Clone)]
pub struct FunderSeen {
    pub id: String,
    pub name: String,
    pub count: u32,
}

/// Coverage statistics from a funder scan
#[derive(Debug, Clone, Copy, Default)]
pub struct FundingStats {
    pub total_works: u32,
    pub funded_works: u32,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct WorkRecord {
    #[serde(default)]
    primary_location: Option<PrimaryLocation>,
    #[serde(default)]
    funders: Option<Vec<FunderRef>>,
}

#[derive(Debug, Deserialize)]
struct PrimaryLocation {
    #[serde(default)]
    source: Option<SourceRef>,
}

#[derive(Debug, Deserialize)]
struct SourceRef {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FunderRef {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl OpenAlexClient {
    /// Create a new OpenAlex client
    pub fn new(config: &OpenAlexConfig, request_config: RequestConfig) -> MetadataResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(MetadataError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            mailto: config.mailto.clone(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search works matching `query` and tally the venues they were published in
    pub async fn search_work_venues(
        &self,
        query: &str,
        per_page: u32,
    ) -> HashMap<String, VenueSeen> {
        let params = [
            ("search", query.to_string()),
            ("per_page", per_page.to_string()),
            ("select", WORK_VENUE_FIELDS.to_string()),
        ];

        let mut venues = HashMap::new();
        let Some(response) = self
            .fetch::<ListResponse<WorkRecord>>("/works", &params)
            .await
        else {
            return venues;
        };

        for work in response.results {
            let Some(source) = work.primary_location.and_then(|l| l.source) else {
                continue;
            };
            let Some(id) = source.id else { continue };
            let name = source
                .display_name
                .unwrap_or_else(|| "Unknown".to_string());
            venues
                .entry(id.clone())
                .or_insert_with(|| VenueSeen { id, name, count: 0 })
                .count += 1;
        }

        venues
    }

    /// Search works matching `query` and tally the funders behind them
    pub async fn search_work_funders(
        &self,
        query: &str,
        per_page: u32,
    ) -> (HashMap<String, FunderSeen>, FundingStats) {
        let params = [
            ("search", query.to_string()),
            ("per_page", per_page.to_string()),
            ("select", WORK_FUNDER_FIELDS.to_string()),
        ];

        let mut funders = HashMap::new();
        let mut stats = FundingStats::default();
        let Some(response) = self
            .fetch::<ListResponse<WorkRecord>>("/works", &params)
            .await
        else {
            return (funders, stats);
        };

        stats.total_works = response.results.len() as u32;
        for work in response.results {
            let Some(work_funders) = work.funders.filter(|f| !f.is_empty()) else {
                continue;
            };
            stats.funded_works += 1;
            for funder in work_funders {
                let Some(id) = funder.id else { continue };
                let name = funder
                    .display_name
                    .unwrap_or_else(|| "Unknown".to_string());
                funders
                    .entry(id.clone())
                    .or_insert_with(|| FunderSeen { id, name, count: 0 })
                    .count += 1;
            }
        }

        (funders, stats)
    }

    /// Fetch detailed metadata for one venue by OpenAlex source ID
    pub async fn venue_details(&self, source_id: &str) -> Option<VenueRecord> {
        let short_id = source_id.rsplit('/').next().unwrap_or(source_id);
        let params = [("select", SOURCE_FIELDS.to_string())];
        self.fetch::<VenueRecord>(&format!("/sources/{}", short_id), &params)
            .await
    }

    /// Search for a venue by name, returning the best match
    pub async fn find_venue_by_name(&self, name: &str) -> Option<VenueRecord> {
        let params = [
            ("search", name.to_string()),
            ("per_page", "3".to_string()),
            ("select", SOURCE_FIELDS.to_string()),
        ];
        self.fetch::<ListResponse<VenueRecord>>("/sources", &params)
            .await
            .and_then(|r| r.results.into_iter().next())
    }

    /// Fetch detailed metadata for one funder by OpenAlex funder ID
    pub async fn funder_details(&self, funder_id: &str) -> Option<FunderRecord> {
        let short_id = funder_id.rsplit('/').next().unwrap_or(funder_id);
        let params = [("select", FUNDER_FIELDS.to_string())];
        self.fetch::<FunderRecord>(&format!("/funders/{}", short_id), &params)
            .await
    }

    /// GET with retry-on-429; any terminal failure is logged and absorbed to None
    async fn fetch<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Option<T> {
        match self.request(path, params).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path, error = %e, "OpenAlex request failed");
                None
            }
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> MetadataResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let mut query: Vec<(&str, String)> = params.to_vec();
        if let Some(mailto) = &self.mailto {
            query.push(("mailto", mailto.clone()));
        }

        let mut retries = 0;
        loop {
            debug!(path = %path, retry = retries, "OpenAlex request");

            let response = self
                .client
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(MetadataError::Http)?;

            let status = response.status();

            if status.as_u16() == 429 {
                if retries >= self.request_config.max_retries {
                    return Err(MetadataError::RateLimited { retries });
                }
                retries += 1;
                let delay =
                    Duration::from_millis(self.request_config.retry_delay_ms * 2_u64.pow(retries));
                warn!(
                    path = %path,
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "OpenAlex rate limited, backing off"
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

            return response
                .json::<T>()
                .await
                .map_err(|e| MetadataError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                });
        }
    }
}

impl VenueRecord {
    /// First ISSN, if any
    pub fn primary_issn(&self) -> Option<&str> {
        self.issn.as_ref().and_then(|v| v.first()).map(|s| s.as_str())
    }

    /// H-index from summary statistics
    pub fn h_index(&self) -> Option<u32> {
        self.summary_stats.as_ref().and_then(|s| s.h_index)
    }

    /// Two-year mean citedness from summary statistics
    pub fn impact_factor_2yr(&self) -> Option<f64> {
        self.summary_stats
            .as_ref()
            .and_then(|s| s.two_year_mean_citedness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = OpenAlexConfig {
            base_url: "https://api.openalex.org/".to_string(),
            mailto: Some("research@example.org".to_string()),
        };
        let client = OpenAlexClient::new(&config, RequestConfig::default()).unwrap();
        assert_eq!(client.base_url(), "https://api.openalex.org");
    }

    #[test]
    fn test_venue_record_accessors() {
        let record: VenueRecord = serde_json::from_value(serde_json::json!({
            "id": "https://openalex.org/S12345",
            "display_name": "Journal of Testing",
            "issn": ["1234-5678", "8765-4321"],
            "summary_stats": {"h_index": 42, "2yr_mean_citedness": 3.5}
        }))
        .unwrap();

        assert_eq!(record.primary_issn(), Some("1234-5678"));
        assert_eq!(record.h_index(), Some(42));
        assert_eq!(record.impact_factor_2yr(), Some(3.5));
    }

    #[test]
    fn test_venue_record_defaults() {
        let record: VenueRecord = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(record.primary_issn().is_none());
        assert!(record.h_index().is_none());
        assert!(record.impact_factor_2yr().is_none());
    }
}
