use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// PDF ingestion errors
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Cannot read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parse failed: {message}")]
    Parse { message: String },

    #[error("Document contains no extractable text")]
    EmptyDocument,
}

/// LLM completion API errors
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Literature-metadata API errors (OpenAlex, Semantic Scholar)
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Rate limit exceeded after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<lopdf::Error> for IngestError {
    fn from(err: lopdf::Error) -> Self {
        IngestError::Parse {
            message: err.to_string(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type alias for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;

/// Result type alias for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;
