use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, error, info, warn};

use super::extract_json;
use super::types::{ChatRequest, ChatResponse, Message};
use crate::config::{OracleConfig, RequestConfig};
use crate::error::{OracleError, OracleResult};

/// Client for an OpenAI-compatible chat-completions API.
///
/// Every analysis agent funnels its LLM calls through one shared instance,
/// injected at construction time rather than created at import time.
#[derive(Clone)]
pub struct OracleClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    vision_model: String,
    request_config: RequestConfig,
}

impl OracleClient {
    /// Create a new oracle client
    pub fn new(config: &OracleConfig, request_config: RequestConfig) -> OracleResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(OracleError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            vision_model: config.vision_model.clone(),
            request_config,
        })
    }

    /// The configured text-completion model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The configured vision-capable model name
    pub fn vision_model(&self) -> &str {
        &self.vision_model
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a chat completion, retrying transient failures with exponential backoff
    pub async fn complete(&self, request: ChatRequest) -> OracleResult<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let model = request.model.clone();

        let mut last_error = None;
        let mut retries = 0;

        while retries <= self.request_config.max_retries {
            if retries > 0 {
                let delay = Duration::from_millis(
                    self.request_config.retry_delay_ms * (2_u64.pow(retries - 1)),
                );
                warn!(
                    model = %model,
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Retrying oracle request"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match self.execute_request(&url, &request).await {
                Ok(response) => {
                    let latency = start.elapsed();
                    info!(
                        model = %model,
                        latency_ms = latency.as_millis(),
                        "Oracle completion succeeded"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    let latency = start.elapsed();
                    error!(
                        model = %model,
                        error = %e,
                        latency_ms = latency.as_millis(),
                        retry = retries,
                        "Oracle completion failed"
                    );
                    last_error = Some(e);
                    retries += 1;
                }
            }
        }

        Err(OracleError::Unavailable {
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
            retries,
        })
    }

    /// Run a JSON-mode completion and parse the completion body as a JSON value.
    ///
    /// Handles completions wrapped in markdown code fences.
    pub async fn complete_json(
        &self,
        messages: Vec<Message>,
        temperature: f64,
    ) -> OracleResult<serde_json::Value> {
        let request = ChatRequest::new(&self.model, messages)
            .with_json_output()
            .with_temperature(temperature);
        self.parse_json_completion(request).await
    }

    /// Run a JSON-mode completion against the vision-capable model
    pub async fn complete_json_vision(
        &self,
        messages: Vec<Message>,
        temperature: f64,
    ) -> OracleResult<serde_json::Value> {
        let request = ChatRequest::new(&self.vision_model, messages)
            .with_json_output()
            .with_temperature(temperature);
        self.parse_json_completion(request).await
    }

    async fn parse_json_completion(&self, request: ChatRequest) -> OracleResult<serde_json::Value> {
        let response = self.complete(request).await?;
        let content = response
            .content()
            .ok_or_else(|| OracleError::InvalidResponse {
                message: "Completion contained no content".to_string(),
            })?;

        let json_text = extract_json(content).map_err(|message| OracleError::InvalidResponse {
            message,
        })?;

        serde_json::from_str(json_text).map_err(|e| OracleError::InvalidResponse {
            message: format!("Failed to parse completion JSON: {}", e),
        })
    }

    /// Execute a single request (internal)
    async fn execute_request(&self, url: &str, request: &ChatRequest) -> OracleResult<ChatResponse> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Calling completion API"
        );

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    OracleError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let chat_response: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| OracleError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        Ok(chat_response)
    }
}
