//! StageMatch: Multi-Source Internship Listing Aggregator
//!
//! CLI entry point: run a sweep, write a starter config, or list sources.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stagematch::{
    config::{Config, LogFormat},
    scrape::{default_adapters, Orchestrator, RunOutcome, SweepPlan},
    store::MemoryStore,
    types::SourceId,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "stagematch")]
#[command(about = "Multi-source internship and apprenticeship listing aggregator")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "stagematch.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List the registered sources and their effective limits
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init never reads existing config; it writes a fresh one
    if let Some(Commands::Init { path }) = &cli.command {
        return init_config(path);
    }

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    setup_logging(&config, cli.verbose)?;

    match cli.command {
        Some(Commands::Sources) => show_sources(&config),
        _ => run_sweep(config).await,
    }
}

fn setup_logging(config: &Config, verbose: u8) -> Result<()> {
    let level = config.logging.level.louder(verbose).to_tracing();
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);

    match config.logging.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
    }
    .context("Failed to install log subscriber")
}

async fn run_sweep(config: Config) -> Result<()> {
    let adapters = default_adapters(&config.sweep);
    let store = Arc::new(MemoryStore::new());
    let plan = SweepPlan::from_config(&config.sweep);
    let orchestrator = Orchestrator::new(plan, adapters, store, &config.http)?;

    // Ctrl-C winds the run down; everything fetched so far is still saved
    let cancel = orchestrator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight work");
            cancel.store(true, Ordering::Relaxed);
        }
    });

    let outcome = orchestrator.run().await;
    print_summary(&outcome);

    if let Some(fatal) = outcome.fatal {
        return Err(fatal.into());
    }
    Ok(())
}

fn print_summary(outcome: &RunOutcome) {
    let stats = &outcome.stats;

    if outcome.failed() {
        println!("\nSweep aborted!");
    } else {
        println!("\nSweep complete!");
    }
    println!("===============");
    println!("Run id:           {}", outcome.run_id);
    println!("Pages fetched:    {}", stats.pages_fetched);
    println!("Records scraped:  {}", stats.total_scraped);
    println!("Records saved:    {}", stats.total_saved);
    println!("Insert failures:  {}", stats.insert_failures);
    println!("Chains abandoned: {}", stats.chains_abandoned);

    println!("\nPer source:");
    for source in SourceId::ALL {
        let s = stats.source(source);
        println!(
            "  {:<22} {:>4} scraped, {:>4} saved",
            source.label(),
            s.scraped,
            s.saved
        );
    }

    if !stats.sources_failed.is_empty() {
        let failed: Vec<&str> = stats.sources_failed.iter().map(|s| s.as_str()).collect();
        println!("\nSources failed: {}", failed.join(", "));
    }
    if let Some(totals) = outcome.totals {
        println!(
            "\nStore totals: {} listings from {} companies",
            totals.total_listings, totals.total_companies
        );
    }
}

fn init_config(path: &Path) -> Result<()> {
    let config_path = path.join("stagematch.toml");
    if config_path.exists() {
        anyhow::bail!("'{}' already exists, not overwriting", config_path.display());
    }

    std::fs::write(&config_path, Config::starter_toml())
        .with_context(|| format!("Failed to write '{}'", config_path.display()))?;
    println!("Wrote default configuration to {}", config_path.display());
    Ok(())
}

fn show_sources(config: &Config) -> Result<()> {
    println!("\nRegistered sources:");
    println!("===================");
    for adapter in default_adapters(&config.sweep) {
        let limits = adapter.limits();
        println!(
            "{:<22} ({}) - delay {}ms, up to {} page(s)",
            adapter.id().label(),
            adapter.id(),
            limits.delay.as_millis(),
            limits.max_pages
        );
    }

    let disabled: Vec<&str> = SourceId::ALL
        .iter()
        .filter(|s| !config.sweep.is_enabled(**s))
        .map(|s| s.as_str())
        .collect();
    if !disabled.is_empty() {
        println!("\nDisabled: {}", disabled.join(", "));
    }

    println!("\nTerms:     {}", config.sweep.terms.join(", "));
    println!("Locations: {}", config.sweep.locations.join(", "));
    Ok(())
}
