//! CLI entrypoint for toolgate
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use toolgate_application::{RunTurnUseCase, TurnLogger};
use toolgate_domain::TurnInput;
use toolgate_infrastructure::{
    ConfigLoader, JsonlTurnLogger, LocalToolProvider, OllamaGenerationGateway, RemoteToolProvider,
    ToolCatalog,
};

#[derive(Parser, Debug)]
#[command(name = "toolgate", about = "Tool-routing chat gateway", version)]
struct Cli {
    /// The question to ask
    question: Option<String>,

    /// Only answer from tool output; decline when no tool covers the question
    #[arg(long)]
    require_tool: bool,

    /// List the tools currently in the catalog and exit
    #[arg(long)]
    list_tools: bool,

    /// Override the generation model from config
    #[arg(long)]
    model: Option<String>,

    /// Path to a config file (highest priority)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip all config files and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress informational output
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting toolgate");

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };
    if let Some(model) = cli.model {
        config.generation.model = model;
    }

    // === Dependency Injection ===
    let client = reqwest::Client::new();

    let mut catalog = ToolCatalog::new().register(LocalToolProvider::builtin());
    for remote in &config.remotes {
        catalog = catalog.register(RemoteToolProvider::over_http(
            remote.name.clone(),
            client.clone(),
            remote.base_url.clone(),
        ));
    }

    let report = catalog.refresh().await;
    for provider in &report.failed_providers {
        warn!(provider = %provider, "Provider unavailable, its tools may be stale or missing");
    }

    let snapshot = catalog.snapshot();

    if cli.list_tools {
        if snapshot.is_empty() {
            println!("No tools available.");
        } else {
            for (name, description) in snapshot.listing() {
                println!("{}  {}", name, description);
            }
        }
        return Ok(());
    }

    let Some(question) = cli.question else {
        bail!("Question is required. Use --list-tools to inspect the catalog.");
    };

    let gateway = Arc::new(OllamaGenerationGateway::new(
        client,
        config.generation.base_url.clone(),
        config.generation.model.clone(),
    ));

    let mut use_case = RunTurnUseCase::new(gateway, config.execution.to_params());
    if let Some(path) = &config.logging.turn_log
        && let Some(logger) = JsonlTurnLogger::new(path)
    {
        if !cli.quiet {
            info!(path = %logger.path().display(), "Turn log enabled");
        }
        use_case = use_case.with_turn_logger(Arc::new(logger) as Arc<dyn TurnLogger>);
    }

    let input = if cli.require_tool {
        TurnInput::tool_required(question)
    } else {
        TurnInput::open(question)
    };

    // Ctrl-C tears the turn down cleanly
    let cancel = CancellationToken::new();
    let ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrlc.cancel();
        }
    });

    let mut handle = use_case.execute(input, snapshot, cancel);

    let mut stdout = std::io::stdout();
    let mut wrote = false;
    while let Some(chunk) = handle.recv().await {
        write!(stdout, "{}", chunk)?;
        stdout.flush()?;
        wrote = true;
    }
    if wrote {
        writeln!(stdout)?;
    }

    Ok(())
}
