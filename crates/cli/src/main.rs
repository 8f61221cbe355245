//! Policy assistant CLI
//!
//! Answers HR policy questions from a versioned policy corpus, citing only
//! documents whose lifecycle status the question may see.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{AskCommand, CorpusCommand, DemoCommand};
use policy_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Policy assistant - grounded answers from versioned HR policy
#[derive(Parser, Debug)]
#[command(name = "policy")]
#[command(about = "Grounded answers from versioned HR policy documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "POLICY_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "POLICY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generation provider (gemini, ollama)
    #[arg(short, long, global = true, env = "POLICY_PROVIDER")]
    provider: Option<String>,

    /// Generation model identifier
    #[arg(short, long, global = true, env = "POLICY_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question about HR policy
    Ask(AskCommand),

    /// Run the reference questions
    Demo(DemoCommand),

    /// List the policy corpus
    Corpus(CorpusCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("Failed to load configuration")?;

    // Config files selected on the command line are merged before flag overrides
    let extra_config = match (&cli.config, &cli.workspace) {
        (Some(path), _) if config.config_file.as_ref() != Some(path) => Some(path.clone()),
        (None, Some(workspace)) if config.config_file.is_none() => Some(
            workspace
                .join(policy_core::config::POLICY_DIR)
                .join("config.yaml"),
        )
        .filter(|p| p.exists()),
        _ => None,
    };
    if let Some(path) = extra_config {
        config = config
            .merge_yaml(&path)
            .with_context(|| format!("Failed to load config file {:?}", path))?;
    }

    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)
        .context("Failed to initialize logging")?;

    tracing::info!("Policy assistant starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Demo(_) => "demo",
        Commands::Corpus(_) => "corpus",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Demo(cmd) => cmd.execute(&config).await,
        Commands::Corpus(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!(kind = ?e.kind(), "Command failed: {}", e),
    }

    result.with_context(|| format!("{} failed", command_name))
}
