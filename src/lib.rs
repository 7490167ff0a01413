//! # Paper Analyzer
//!
//! A research-paper analysis pipeline that runs an uploaded PDF through
//! eight LLM-backed analysis agents and aggregates their results into a
//! markdown report plus a machine-readable bundle.
//!
//! ## Features
//!
//! - **Results Synthesis**: key findings, effect sizes, evidence strength
//! - **Writing Quality**: quantitative metrics plus per-section coaching
//! - **Methodology Critique**: design, sample size, bias, reproducibility
//! - **Visualization Critique**: per-figure vision analysis
//! - **Citation Search**: related literature via Semantic Scholar
//! - **Plagiarism Check**: integrity analysis with review-aware criteria
//! - **Journal Recommendations**: OpenAlex-grounded venue ranking
//! - **Funding Recommendations**: OpenAlex-grounded funder ranking
//!
//! ## Architecture
//!
//! ```text
//! PDF → DocumentIngestor → (text, sections, paper type)
//!          ↓
//!    Orchestrator → 8 agent stages → progress events (mpsc)
//!          ↓
//!    ReportAssembler → markdown report + JSON bundle
//! ```
//!
//! Each agent degrades internally on failure, so every finished run yields
//! a complete, schema-valid result bundle; only an error escaping an
//! agent's own handling aborts the run.
//!
//! ## Example
//!
//! ```ignore
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//! use paper_analyzer::{AgentKind, Config, Orchestrator};
//! use paper_analyzer::agents::AgentSuite;
//! use paper_analyzer::ingest::DocumentIngestor;
//! use paper_analyzer::metadata::{OpenAlexClient, ScholarClient};
//! use paper_analyzer::oracle::OracleClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let oracle = OracleClient::new(&config.oracle, config.request.clone())?;
//!     let openalex = OpenAlexClient::new(&config.openalex, config.metadata_request.clone())?;
//!     let scholar = ScholarClient::new(&config.scholar, config.metadata_request.clone())?;
//!
//!     let ingestor = Arc::new(DocumentIngestor::new(oracle.clone()));
//!     let suite = Arc::new(AgentSuite::new(oracle, openalex, scholar));
//!     let orchestrator = Orchestrator::new(ingestor, suite, &config.pipeline);
//!
//!     let selection: BTreeSet<AgentKind> = AgentKind::ALL.into_iter().collect();
//!     let mut events = orchestrator.run("paper.pdf".into(), selection)?;
//!     while let Some(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// The eight analysis agents and shared schema types.
pub mod agents;
/// Configuration management.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// PDF ingestion and section classification.
pub mod ingest;
/// Literature-metadata API clients (OpenAlex, Semantic Scholar).
pub mod metadata;
/// LLM completion client.
pub mod oracle;
/// The analysis orchestrator and its event stream.
pub mod pipeline;
/// Centralized system prompts.
pub mod prompts;
/// Report assembly (markdown + JSON bundle).
pub mod report;

pub use agents::AgentKind;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use pipeline::{AnalysisEvent, Orchestrator, RunState};
