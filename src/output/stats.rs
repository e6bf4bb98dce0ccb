//! Statistics generation from the snapshot database
//!
//! This module provides functionality for extracting and displaying
//! statistics of a stored monitoring run.

use crate::output::traits::ReportSummary;
use crate::storage::{RunRecord, Storage, StorageError};
use crate::PagewatchError;

/// Statistics of one stored run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    /// The run the statistics belong to
    pub run: RunRecord,

    /// Number of pages in the snapshot
    pub total_pages: u64,

    /// Number of stored link entries
    pub total_links: u64,

    /// Number of stored version history entries
    pub total_versions: u64,

    /// Summary rebuilt from the snapshot
    pub summary: ReportSummary,
}

/// Loads statistics of the latest run from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(RunStatistics)` - Successfully loaded statistics
/// * `Err(PagewatchError)` - No run stored, or the query failed
pub fn load_statistics(storage: &dyn Storage) -> Result<RunStatistics, PagewatchError> {
    let run = storage.get_latest_run()?.ok_or_else(|| {
        StorageError::Database("No monitoring runs found in database".to_string())
    })?;

    let total_pages = storage.count_pages(run.id)?;
    let total_links = storage.count_links(run.id)?;
    let total_versions = storage.count_versions(run.id)?;

    let pages = storage.load_snapshot(run.id)?;
    let summary = ReportSummary::from_snapshot(&pages).with_run_id(run.id);

    Ok(RunStatistics {
        run,
        total_pages,
        total_links,
        total_versions,
        summary,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Monitoring Statistics ===\n");

    println!("Run:");
    println!("  ID: {}", stats.run.id);
    println!("  Status: {}", stats.run.status.to_db_string());
    println!("  Started: {}", stats.run.started_at);
    if let Some(finished) = &stats.run.finished_at {
        println!("  Finished: {}", finished);
    }
    if let Some(snapshot) = &stats.run.last_snapshot_at {
        println!("  Last snapshot: {}", snapshot);
    }
    println!("  Config hash: {}", stats.run.config_hash);
    println!();

    println!("Overview:");
    println!("  Pages: {}", stats.total_pages);
    println!("  Links: {}", stats.total_links);
    println!("  Dangling pages: {}", stats.summary.dangling_pages);
    println!("  Version history entries: {}", stats.total_versions);
    println!();

    println!("Priority Tiers:");
    for (name, count) in [
        ("high", stats.summary.high_pages),
        ("medium", stats.summary.medium_pages),
        ("low", stats.summary.low_pages),
    ] {
        let percentage = if stats.total_pages > 0 {
            (count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", name, count, percentage);
    }
    println!();

    if !stats.summary.top_ranked.is_empty() {
        println!("Top Pages by Rank:");
        for (page_id, rank) in &stats.summary.top_ranked {
            println!("  {:<20} {:.6}", page_id, rank);
        }
        println!();
    }

    println!(
        "Activity: {} recorded updates, {} changes observed during the run",
        stats.summary.total_updates, stats.summary.changes_observed
    );
}
