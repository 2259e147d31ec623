//! DocQA CLI
//!
//! Main entry point for the docqa command-line tool.
//! Indexes a single PDF or DOCX document and answers questions about it.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IngestCommand, StatusCommand};
use docqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;
use std::process::ExitCode;

/// DocQA - ask questions about a PDF or DOCX document
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Ask questions about a PDF or DOCX document", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the persisted index (default: knowledge_db)
    #[arg(short, long, global = true, env = "DOCQA_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Language model identifier
    #[arg(short, long, global = true, env = "DOCQA_MODEL")]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index a PDF or DOCX document, replacing the current one
    Ingest(IngestCommand),

    /// Ask a question about the indexed document
    Ask(AskCommand),

    /// Show whether a document is indexed
    Status(StatusCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<ExitCode> {
    // Defaults, config file and environment
    let config = AppConfig::load(cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.storage_dir,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("DocQA CLI starting");
    tracing::debug!("Storage: {:?}", config.storage_dir);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Embedding provider: {}", config.embedding.provider);

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Status(_) => "status",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Status(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
