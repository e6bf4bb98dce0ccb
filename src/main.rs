//! Pagewatch main entry point
//!
//! This is the command-line interface for the Pagewatch page monitor.

use anyhow::Context;
use clap::Parser;
use pagewatch::config::{load_config_with_hash, validate, Config};
use pagewatch::crawler::{HttpPageSource, Monitor};
use pagewatch::output::{GraphReport, MarkdownReport, SqliteSnapshotRenderer};
use pagewatch::storage::{RunStatus, SqliteStorage, Storage};
use pagewatch::PagewatchError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Pagewatch: a rank-driven page collection monitor
///
/// Pagewatch discovers the link graph of a page collection, ranks every
/// page by structural importance and then re-polls important pages more
/// often than unimportant ones, recording each content version it sees.
#[derive(Parser, Debug)]
#[command(name = "pagewatch")]
#[command(version)]
#[command(about = "A rank-driven page collection monitor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the effective settings without monitoring
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics of the latest stored run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Regenerate the markdown dashboard from the latest stored run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (config, config_hash) = load_configuration(cli.config.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(ExitCode::SUCCESS)
    } else if cli.stats {
        handle_stats(&config)?;
        Ok(ExitCode::SUCCESS)
    } else if cli.export_summary {
        handle_export_summary(&config)?;
        Ok(ExitCode::SUCCESS)
    } else {
        handle_monitor(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagewatch=info,warn"),
            1 => EnvFilter::new("pagewatch=debug,info"),
            2 => EnvFilter::new("pagewatch=trace,debug"),
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

fn load_configuration(path: Option<&Path>) -> anyhow::Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            let config = Config::default();
            validate(&config).context("Built-in defaults failed validation")?;
            Ok((config, "defaults".to_string()))
        }
    }
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Pagewatch Dry Run ===\n");

    println!("Server:");
    println!("  Base URL: {}", config.server.base_url);
    println!("  Request timeout: {}s", config.server.request_timeout_secs);

    println!("\nRank:");
    println!("  Damping factor: {}", config.rank.damping_factor);
    println!("  Tolerance: {}", config.rank.tolerance);
    println!("  Max iterations: {}", config.rank.max_iterations);

    println!("\nDiscovery:");
    println!("  Max pages: {}", config.discovery.max_pages);

    println!("\nMonitor:");
    println!("  Tick: {}ms", config.monitor.tick_ms);
    println!(
        "  Intervals: high {}ms / medium {}ms / low {}ms",
        config.monitor.high_interval_ms,
        config.monitor.medium_interval_ms,
        config.monitor.low_interval_ms
    );
    println!("  Report interval: {}ms", config.monitor.report_interval_ms);
    println!(
        "  Reclassify on report: {}",
        config.monitor.reclassify_on_report
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);
    println!("  Graph: {}", config.output.graph_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use pagewatch::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: regenerates the markdown dashboard
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    use pagewatch::output::{generate_markdown_summary, generate_summary};

    println!("=== Exporting Dashboard ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("Failed to open database")?;

    tracing::info!("Loading run snapshot from database...");
    let summary = generate_summary(&storage)?;

    tracing::info!("Generating markdown dashboard...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;

    println!("✓ Dashboard exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the main monitoring operation
async fn handle_monitor(config: Config, config_hash: &str) -> anyhow::Result<ExitCode> {
    let db_path = PathBuf::from(&config.output.database_path);
    let mut storage = SqliteStorage::new(&db_path).context("Failed to open database")?;
    let run_id = storage.create_run(config_hash)?;
    tracing::info!("Started run {}", run_id);

    let source = HttpPageSource::new(&config.server).context("Failed to build HTTP client")?;
    let mut monitor = Monitor::new(source, &config);
    monitor.add_renderer(Box::new(
        MarkdownReport::new(&config.output.summary_path).with_run_id(run_id),
    ));
    monitor.add_renderer(Box::new(SqliteSnapshotRenderer::open(&db_path, run_id)?));
    monitor.add_renderer(Box::new(GraphReport::new(&config.output.graph_path)));

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                signal_token.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    match monitor.start(&token).await {
        Ok(()) => {}
        Err(PagewatchError::Cancelled) => {
            storage.finish_run(run_id, RunStatus::Interrupted)?;
            tracing::info!("Run {} interrupted before monitoring began", run_id);
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            storage.finish_run(run_id, RunStatus::Failed)?;
            return Ok(ExitCode::FAILURE);
        }
    }

    monitor.run(&token).await;

    storage.finish_run(run_id, RunStatus::Completed)?;
    tracing::info!("Run {} finished", run_id);

    Ok(ExitCode::SUCCESS)
}
