//! smartcommit - CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use smartcommit::backend::{self, BackendKind, Style};
use smartcommit::config::{self, Config};
use smartcommit::git::check_git_installed;
use smartcommit::pipeline::{ConsentGate, PipelineOptions, TerminalPrompter, run_pipeline};

/// Generate Conventional Commits messages from staged changes.
#[derive(Parser, Debug)]
#[command(name = "smartcommit")]
#[command(about = "Generate Conventional Commits messages from staged changes")]
#[command(version)]
struct Cli {
    /// Force the commit type (feat, fix, docs, ...)
    #[arg(short = 't', long = "type")]
    commit_type: Option<String>,

    /// Force the commit scope
    #[arg(short, long)]
    scope: Option<String>,

    /// Print the generated message without committing
    #[arg(short, long)]
    dry_run: bool,

    /// Copy the generated message to the clipboard
    #[arg(short, long)]
    copy: bool,

    /// Message style (overrides config)
    #[arg(long, value_enum)]
    style: Option<Style>,

    /// Generation backend (overrides config)
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Check prerequisites
    check_git_installed().context("git is required")?;

    // Step 2: Load configuration (a broken config file is not fatal)
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    config::load_dotenv(&cwd);
    let mut config = match Config::load(&cwd) {
        Ok(result) => result.config,
        Err(e) => {
            warn!("Config load failed: {e}");
            println!("Warning: {e}. Using default configuration.");
            Config::default()
        }
    }
    .with_env_overrides();

    if let Some(style) = cli.style {
        config.style = style;
    }
    if let Some(kind) = cli.backend {
        config.backend = kind;
    }

    // Step 3: Build the backend and consent gate
    let backend = backend::from_config(&config).context("Failed to set up backend")?;
    let consent = ConsentGate::in_home_dir()?;

    // Step 4: Run the pipeline
    let options = PipelineOptions {
        repo_path: cwd,
        commit_type: cli.commit_type,
        scope: cli.scope,
        dry_run: cli.dry_run,
        copy: cli.copy,
    };

    run_pipeline(
        &config,
        backend.as_ref(),
        &TerminalPrompter,
        &consent,
        &options,
    )
    .await?;

    Ok(())
}
