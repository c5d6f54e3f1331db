//! Driftnet main entry point
//!
//! This is the command-line interface for the Driftnet origin crawler.

use anyhow::{anyhow, Context};
use clap::Parser;
use driftnet::config::{load_config_with_hash, Config};
use driftnet::crawler::{spawn_control_listener, stdin_lines, Engine, STOP_TOKENS};
use driftnet::output::{load_statistics, print_statistics};
use driftnet::storage::{open_storage, RunStatus, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Driftnet: a continuous origin-level web crawler
///
/// Driftnet starts from a seed address, records every origin it discovers
/// and builds an inverted tag index from the text of each HTML page. Type
/// `close`, `exit`, `cl` or `ex` (or press Ctrl-C) to stop.
#[derive(Parser, Debug)]
#[command(name = "driftnet")]
#[command(version)]
#[command(about = "A continuous origin-level web crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "SEED", required_unless_present = "stats")]
    seed: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides the config file)
    #[arg(long, value_name = "PATH", env = "DRIFTNET_DATABASE")]
    database: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), String::new())
        }
    };

    if let Some(database) = &cli.database {
        config.output.database_path = database.display().to_string();
    }

    if cli.stats {
        return handle_stats(&config);
    }

    let seed = cli.seed.context("A seed URL is required to crawl")?;
    handle_crawl(config, &config_hash, &seed).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("driftnet=info,warn"),
            1 => EnvFilter::new("driftnet=debug,info"),
            2 => EnvFilter::new("driftnet=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.output.database_path);
    open_storage(path, Duration::from_millis(config.output.busy_timeout_ms))
        .with_context(|| format!("Failed to open database {}", path.display()))
}

fn lock(store: &Mutex<SqliteStorage>) -> anyhow::Result<MutexGuard<'_, SqliteStorage>> {
    store.lock().map_err(|_| anyhow!("Storage lock poisoned"))
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str, seed: &str) -> anyhow::Result<()> {
    let mut storage = open(&config)?;

    let reset = storage.reset_in_progress()?;
    if reset > 0 {
        tracing::info!("Reset {} links left in progress by a previous run", reset);
    }

    let store = Arc::new(Mutex::new(storage));
    let cancel = CancellationToken::new();
    let mut engine = Engine::new(Arc::clone(&store), &config, cancel.clone())?;

    let seed_key = engine
        .seed(seed)
        .with_context(|| format!("Invalid seed URL: {}", seed))?;
    let run_id = lock(&store)?.create_run(&seed_key, config_hash)?;
    tracing::info!(
        "Run {} crawling from {} into {}",
        run_id,
        seed_key,
        config.output.database_path
    );

    let listener = spawn_control_listener(stdin_lines(), cancel.clone());
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, finishing current iteration");
                cancel.cancel();
            }
        })
    };
    tracing::info!("Type one of {:?} to stop", STOP_TOKENS);

    let result = engine.run().await;

    listener.abort();
    interrupt.abort();

    let (status, iterations) = match &result {
        Ok(summary) if summary.stopped => (RunStatus::Interrupted, summary.iterations),
        Ok(summary) => (RunStatus::Completed, summary.iterations),
        Err(_) => (RunStatus::Failed, 0),
    };
    lock(&store)?.finish_run(run_id, status, iterations)?;

    let summary = result.context("Crawl failed")?;
    tracing::info!(
        "Run {} {}: {} done, {} unavailable, {} skipped, {} deferred, {} retried",
        run_id,
        status.to_db_string(),
        summary.done,
        summary.unavailable,
        summary.skipped,
        summary.deferred,
        summary.retried
    );

    Ok(())
}
