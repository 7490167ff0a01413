use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub oracle: OracleConfig,
    pub openalex: OpenAlexConfig,
    pub scholar: ScholarConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub metadata_request: RequestConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

/// LLM completion API configuration
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub vision_model: String,
}

/// OpenAlex API configuration
#[derive(Debug, Clone)]
pub struct OpenAlexConfig {
    pub base_url: String,
    /// Contact email for the OpenAlex polite pool (optional)
    pub mailto: Option<String>,
}

/// Semantic Scholar API configuration
#[derive(Debug, Clone)]
pub struct ScholarConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Orchestration settings
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Overall run deadline, checked at stage boundaries. None = no deadline.
    pub run_deadline_ms: Option<u64>,
}

/// Report artifact output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let oracle = OracleConfig {
            api_key: env::var("ORACLE_API_KEY").map_err(|_| AppError::Config {
                message: "ORACLE_API_KEY is required".to_string(),
            })?,
            base_url: env::var("ORACLE_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("ORACLE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            vision_model: env::var("ORACLE_VISION_MODEL")
                .unwrap_or_else(|_| "gpt-4o".to_string()),
        };

        let openalex = OpenAlexConfig {
            base_url: env::var("OPENALEX_BASE_URL")
                .unwrap_or_else(|_| "https://api.openalex.org".to_string()),
            mailto: env::var("OPENALEX_MAILTO").ok().filter(|s| !s.is_empty()),
        };

        let scholar = ScholarConfig {
            base_url: env::var("SEMANTIC_SCHOLAR_BASE_URL")
                .unwrap_or_else(|_| "https://api.semanticscholar.org/graph/v1".to_string()),
            api_key: env::var("SEMANTIC_SCHOLAR_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60000),
            max_retries: env::var("MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: env::var("RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        };

        // Metadata APIs answer fast or not at all; keep their timeout short.
        let metadata_request = RequestConfig {
            timeout_ms: env::var("METADATA_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15000),
            max_retries: request.max_retries,
            retry_delay_ms: request.retry_delay_ms,
        };

        let pipeline = PipelineConfig {
            run_deadline_ms: env::var("RUN_DEADLINE_MS").ok().and_then(|s| s.parse().ok()),
        };

        let output = OutputConfig {
            dir: PathBuf::from(
                env::var("OUTPUT_DIR").unwrap_or_else(|_| "./data/output".to_string()),
            ),
        };

        Ok(Config {
            oracle,
            openalex,
            scholar,
            logging,
            request,
            metadata_request,
            pipeline,
            output,
        })
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}
