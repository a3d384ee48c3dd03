//! Route Agent - Main Entry Point
//!
//! Command-line front end for the routing agent: single queries, batches,
//! an interactive prompt, and configuration and backend checks.

use clap::{Parser, Subcommand};
use route_agent::agent::{parse_query, RoutingAgent, RunOutcome};
use route_agent::config::{AgentConfig, ModelBackend};
use route_agent::llm::providers::{
    OllamaClient, OllamaConfig, OpenAiCompatibleClient, OpenAiConfig,
};
use route_agent::llm::ModelClient;
use route_agent::observability::init_default_logging;
use route_agent::query::Query;
use route_agent::report::{render_console, BatchSummary, TranscriptWriter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Route queries to math, summary or general handlers backed by a local model
#[derive(Parser)]
#[command(name = "route-agent")]
#[command(about = "Routes queries to math, summary or general handlers backed by a local model")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Model name override
    #[arg(long, env = "ROUTE_AGENT_MODEL")]
    model: Option<String>,

    /// Model server base URL override
    #[arg(long, value_name = "URL", env = "ROUTE_AGENT_BASE_URL")]
    base_url: Option<String>,

    /// Maximum wait per model call, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Route and answer a single query
    Run {
        query: String,
        /// Print the run outcome as JSON
        #[arg(long)]
        json: bool,
        /// Retries after an unavailable or timed-out model
        #[arg(long, default_value_t = 0)]
        retries: u32,
        /// Directory to save the transcript in
        #[arg(long, value_name = "DIR")]
        transcript_dir: Option<PathBuf>,
    },
    /// Show which route a query takes, without calling the model
    Route { query: String },
    /// Run the demo cases, or one query per line from a file
    Batch {
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
        /// Run all queries at once instead of one after another
        #[arg(long)]
        concurrent: bool,
        #[arg(long, value_name = "DIR")]
        transcript_dir: Option<PathBuf>,
    },
    /// Read queries from stdin until quit
    Interactive,
    /// Check that the model backend answers
    Health,
    /// Validate configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

/// One named entry of a batch
struct BatchCase {
    name: Option<String>,
    query: Query,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging(cli.verbose);

    info!("Starting route-agent v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration(&cli).await {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Route { query } => handle_route_command(&config, &query),
        Commands::Config { show } => handle_config_command(&config, show),
        Commands::Health => handle_health_command(&config).await,
        Commands::Run {
            query,
            json,
            retries,
            transcript_dir,
        } => handle_run_command(&config, &query, json, retries, transcript_dir).await,
        Commands::Batch {
            file,
            concurrent,
            transcript_dir,
        } => handle_batch_command(&config, file, concurrent, transcript_dir).await,
        Commands::Interactive => handle_interactive_command(&config).await,
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn load_configuration(cli: &Cli) -> CliResult<AgentConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            AgentConfig::load_from_file(path)?
        }
        None => {
            let default_paths = ["route-agent.toml", "config/route-agent.toml"];

            match default_paths.iter().map(Path::new).find(|p| p.exists()) {
                Some(path) => {
                    info!("Loading configuration from: {}", path.display());
                    AgentConfig::load_from_file(path)?
                }
                None => {
                    info!("No configuration file found, using defaults");
                    AgentConfig::default()
                }
            }
        }
    };

    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.llm.base_url = base_url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.llm.timeout_secs = timeout;
    }

    config.validate()?;
    Ok(config)
}

/// Model client factory for the configured backend
struct ModelClientFactory;

impl ModelClientFactory {
    fn create_client(config: &AgentConfig) -> CliResult<Arc<dyn ModelClient>> {
        let base_url = config.llm.base_url.clone();
        let timeout = config.llm.timeout();

        match config.llm.provider {
            ModelBackend::Ollama => Ok(Arc::new(OllamaClient::new(OllamaConfig {
                base_url,
                timeout,
            })?)),
            ModelBackend::Openai => {
                let api_key = config.get_llm_api_key()?;
                Ok(Arc::new(OpenAiCompatibleClient::new(OpenAiConfig {
                    api_key,
                    base_url,
                    timeout,
                })?))
            }
        }
    }
}

fn build_agent(config: &AgentConfig) -> CliResult<RoutingAgent> {
    let client = ModelClientFactory::create_client(config)?;
    info!(
        backend = client.name(),
        model = %config.llm.model,
        base_url = %config.llm.base_url,
        "Model client ready"
    );
    Ok(RoutingAgent::from_config(config, client)?)
}

fn print_failure(outcome: &RunOutcome) {
    if let RunOutcome::Failed {
        route,
        reason,
        message,
        ..
    } = outcome
    {
        eprintln!("Error ({reason}) on route {route}: {message}");
    }
}

async fn handle_run_command(
    config: &AgentConfig,
    input: &str,
    json: bool,
    retries: u32,
    transcript_dir: Option<PathBuf>,
) -> CliResult<()> {
    let query = parse_query(input)?;
    let agent = build_agent(config)?;

    let outcome = agent.run_with_retries(query, retries).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    match &outcome {
        RunOutcome::Recorded(record) => {
            if !json {
                print!("{}", render_console(record));
            }
            if let Some(dir) = transcript_dir {
                let path = TranscriptWriter::new(dir).write(1, record, None).await?;
                println!("Results saved to {}", path.display());
            }
            Ok(())
        }
        RunOutcome::Failed { reason, .. } => {
            print_failure(&outcome);
            Err(format!("Query failed: {reason}").into())
        }
    }
}

fn handle_route_command(config: &AgentConfig, input: &str) -> CliResult<()> {
    let query = parse_query(input)?;
    let router = route_agent::routing::Router::from_config(&config.routing)?;
    let classification = router.classify(query.text());

    println!("Input: {query}");
    println!("Route: {}", classification.route);
    println!(
        "Processing Type: {}",
        classification.route.processing_type()
    );
    if classification.is_ambiguous() {
        let candidates: Vec<&str> = classification
            .candidates
            .iter()
            .map(|r| r.as_str())
            .collect();
        println!("Candidates: {}", candidates.join(", "));
    }
    Ok(())
}

fn demo_cases() -> Vec<BatchCase> {
    [
        ("Math Problem", "What is 15 + 25 * 3?"),
        (
            "Text Summary",
            "Summarize: LangGraph is a powerful tool for building agent workflows with non-linear processing capabilities. It enables developers to create sophisticated multi-agent systems.",
        ),
        ("General Query", "Hello, how are you today?"),
    ]
    .into_iter()
    .map(|(name, text)| BatchCase {
        name: Some(name.to_string()),
        query: Query::from(text),
    })
    .collect()
}

async fn load_batch_file(path: &Path) -> CliResult<Vec<BatchCase>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| BatchCase {
            name: None,
            query: Query::from(line),
        })
        .collect())
}

async fn handle_batch_command(
    config: &AgentConfig,
    file: Option<PathBuf>,
    concurrent: bool,
    transcript_dir: Option<PathBuf>,
) -> CliResult<()> {
    let cases = match file {
        Some(path) => load_batch_file(&path).await?,
        None => demo_cases(),
    };
    if cases.is_empty() {
        return Err("Batch file contains no queries".into());
    }

    let agent = build_agent(config)?;
    info!(count = cases.len(), concurrent, "Running batch");

    let outcomes = if concurrent {
        agent
            .run_many(cases.iter().map(|c| c.query.clone()).collect())
            .await
    } else {
        let mut outcomes = Vec::with_capacity(cases.len());
        for case in &cases {
            outcomes.push(agent.run_outcome(case.query.clone()).await);
        }
        outcomes
    };

    let writer = transcript_dir.map(TranscriptWriter::new);

    for (i, (case, outcome)) in cases.iter().zip(&outcomes).enumerate() {
        let index = i + 1;
        println!("\nQuery {index}: {}", case.query);
        match outcome {
            RunOutcome::Recorded(record) => {
                println!(
                    "Time: {:.2}s | Route: {}",
                    record.duration_secs(),
                    record.route
                );
                if let Some(writer) = &writer {
                    writer.write(index, record, case.name.as_deref()).await?;
                }
            }
            RunOutcome::Failed { .. } => print_failure(outcome),
        }
    }

    println!("\n{}", BatchSummary::from_outcomes(&outcomes));
    Ok(())
}

async fn handle_interactive_command(config: &AgentConfig) -> CliResult<()> {
    let agent = build_agent(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Route Agent - interactive mode");
    println!("Type 'quit', 'exit' or 'q' to leave.");

    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        print!("\nEnter your query: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            _ = &mut ctrl_c => {
                info!("Received interrupt, leaving interactive mode");
                println!();
                break;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            break;
        };

        if matches!(line.trim().to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        let query = match parse_query(&line) {
            Ok(query) => query,
            Err(e) => {
                println!("{}", e.user_message());
                continue;
            }
        };

        println!("\nProcessing...");
        let Some(outcome) = agent.run_interruptible(query, &mut ctrl_c).await else {
            println!();
            break;
        };
        match &outcome {
            RunOutcome::Recorded(record) => print!("{}", render_console(record)),
            RunOutcome::Failed { .. } => print_failure(&outcome),
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn handle_health_command(config: &AgentConfig) -> CliResult<()> {
    let client = ModelClientFactory::create_client(config)?;

    match client.health_check().await {
        Ok(()) => {
            println!(
                "Model backend '{}' at {} is healthy",
                client.name(),
                config.llm.base_url
            );
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "Model backend '{}' at {} is unavailable: {}",
                client.name(),
                config.llm.base_url,
                e
            );
            Err(e.into())
        }
    }
}

fn handle_config_command(config: &AgentConfig, show: bool) -> CliResult<()> {
    if show {
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(config)?);
    }

    info!("Configuration validation complete");
    Ok(())
}
