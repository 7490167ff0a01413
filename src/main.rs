use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paper_analyzer::agents::{AgentKind, AgentSuite};
use paper_analyzer::config::Config;
use paper_analyzer::ingest::DocumentIngestor;
use paper_analyzer::metadata::{OpenAlexClient, ScholarClient};
use paper_analyzer::oracle::OracleClient;
use paper_analyzer::pipeline::{AnalysisEvent, Orchestrator, StageOutcome};
use paper_analyzer::report;

/// Analyze a research-paper PDF with eight LLM-backed agents
#[derive(Debug, Parser)]
#[command(name = "paper-analyzer", version, about)]
struct Cli {
    /// Path to the research paper PDF
    document: PathBuf,

    /// Agents to run (comma-separated subset of: results, writing,
    /// methodology, visualization, citations, plagiarism, journals, funding)
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_agent,
        default_value = "results,writing,methodology,visualization,citations,plagiarism,journals,funding"
    )]
    agents: Vec<AgentKind>,

    /// Directory for report artifacts (defaults to OUTPUT_DIR)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write the machine-readable JSON bundle
    #[arg(long)]
    json: bool,
}

fn parse_agent(s: &str) -> Result<AgentKind, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        document = %cli.document.display(),
        "Paper analyzer starting..."
    );

    // Construct shared clients
    let oracle = match OracleClient::new(&config.oracle, config.request.clone()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to initialize oracle client");
            return Err(e.into());
        }
    };
    let openalex = OpenAlexClient::new(&config.openalex, config.metadata_request.clone())?;
    let scholar = ScholarClient::new(&config.scholar, config.metadata_request.clone())?;

    let ingestor = Arc::new(DocumentIngestor::new(oracle.clone()));
    let suite = Arc::new(AgentSuite::new(oracle, openalex, scholar));
    let orchestrator = Orchestrator::new(ingestor, suite, &config.pipeline);

    let selection: BTreeSet<AgentKind> = cli.agents.iter().copied().collect();
    let mut events = match orchestrator.run(cli.document.clone(), selection) {
        Ok(events) => events,
        Err(e) => {
            error!(error = %e, "Cannot start analysis");
            return Err(e.into());
        }
    };

    let output_dir = cli.output.unwrap_or(config.output.dir);

    while let Some(event) = events.recv().await {
        match event {
            AnalysisEvent::StageStarted { stage } => {
                info!(stage = %stage, "Stage started");
            }
            AnalysisEvent::StageCompleted { stage, outcome } => match outcome {
                StageOutcome::TextExtracted { chars } => {
                    info!(stage = %stage, chars, "Text extracted");
                }
                StageOutcome::SectionsExtracted { paper_type } => {
                    info!(stage = %stage, paper_type = %paper_type, "Sections extracted");
                }
                StageOutcome::AgentFinished { report } => {
                    info!(
                        stage = %stage,
                        skipped = report.is_skipped(),
                        "Agent finished"
                    );
                }
            },
            AnalysisEvent::RunCompleted { state, report: text } => {
                std::fs::create_dir_all(&output_dir)?;
                let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

                let report_path = output_dir.join(format!("analysis_report_{}.md", stamp));
                std::fs::write(&report_path, &text)?;
                info!(path = %report_path.display(), "Report saved");
                println!("Report saved: {}", report_path.display());

                if cli.json {
                    let bundle = report::render_json_bundle(&state);
                    let bundle_path = output_dir.join(format!("analysis_bundle_{}.json", stamp));
                    std::fs::write(&bundle_path, serde_json::to_string_pretty(&bundle)?)?;
                    info!(path = %bundle_path.display(), "Bundle saved");
                    println!("Bundle saved: {}", bundle_path.display());
                }
            }
            AnalysisEvent::RunFailed { stage, message } => {
                error!(stage = %stage, error = %message, "Analysis failed");
                eprintln!("Analysis failed at {}: {}", stage, message);
                std::process::exit(1);
            }
        }
    }

    info!("Done");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        paper_analyzer::config::LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        paper_analyzer::config::LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
