//! Scrappa actors CLI - run one integration per invocation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scrappa::{ClientConfig, ScrappaClient};
use scrappa_actors::{ActorKind, RunOutcome, RunStorage};

/// Run a single Scrappa actor and persist its results.
#[derive(Parser)]
#[command(name = "scrappa-actors")]
#[command(about = "Single-purpose Scrappa integrations")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Storage directory for the dataset and key-value store
    #[arg(long, env = "SCRAPPA_STORAGE_DIR", default_value = "./storage")]
    storage: PathBuf,

    /// Actor to run
    #[arg(value_enum)]
    actor: ActorKind,

    /// Path to a JSON input document
    #[arg(long, conflicts_with = "input_json")]
    input: Option<PathBuf>,

    /// Inline JSON input document
    #[arg(long)]
    input_json: Option<String>,
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("scrappa=debug,scrappa_actors=debug,info")
        } else {
            EnvFilter::new("scrappa=info,scrappa_actors=info,warn")
        }
    });

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

async fn read_input(cli: &Cli) -> Result<Value> {
    let raw = match (&cli.input, &cli.input_json) {
        (Some(path), _) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read input file {}", path.display()))?,
        (None, Some(inline)) => inline.clone(),
        (None, None) => return Ok(Value::Object(serde_json::Map::new())),
    };

    serde_json::from_str(&raw).context("Input is not valid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = ClientConfig::from_env().context("Failed to load Scrappa configuration")?;
    let client = ScrappaClient::new(config).context("Failed to create Scrappa client")?;
    let storage = RunStorage::open(&cli.storage)
        .await
        .with_context(|| format!("Failed to open storage at {}", cli.storage.display()))?;
    let input = read_input(&cli).await?;

    match cli.actor.run(&client, input, &storage).await {
        Ok(RunOutcome::Completed { items, .. }) => {
            info!(actor = ?cli.actor, items, "Completed successfully");
            Ok(())
        }
        Ok(RunOutcome::NotFound { .. }) => {
            info!(actor = ?cli.actor, "Completed with not-found result");
            Ok(())
        }
        Err(e) => {
            error!(actor = ?cli.actor, error = %e, "Actor failed");
            Err(e).context("Actor failed")
        }
    }
}
