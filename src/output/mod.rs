//! Output module for reports on the monitored pages
//!
//! This module handles:
//! - The report renderer contract used by the monitoring loop
//! - Markdown dashboards
//! - Graphviz renderings of the page graph
//! - SQLite snapshots of the page model
//! - Statistics of stored runs

mod graph;
mod markdown;
mod sqlite_output;
pub mod stats;
mod traits;

pub use graph::{format_dot_graph, node_color, node_size, GraphReport};
pub use markdown::{format_markdown_summary, generate_markdown_summary, MarkdownReport};
pub use sqlite_output::SqliteSnapshotRenderer;
pub use stats::{load_statistics, print_statistics, RunStatistics};
pub use traits::{OutputError, OutputResult, ReportContext, ReportRenderer, ReportSummary};

use crate::storage::{Storage, StorageError};
use crate::PagewatchError;

/// Generates a report summary of the latest stored run
///
/// # Arguments
///
/// * `storage` - The storage backend containing run snapshots
///
/// # Returns
///
/// * `Ok(ReportSummary)` - Successfully generated summary
/// * `Err(PagewatchError)` - No run stored, or the query failed
pub fn generate_summary(storage: &dyn Storage) -> Result<ReportSummary, PagewatchError> {
    let run = storage.get_latest_run()?.ok_or_else(|| {
        StorageError::Database("No monitoring runs found in database".to_string())
    })?;

    let pages = storage.load_snapshot(run.id)?;
    if pages.is_empty() {
        tracing::warn!("Run {} has no stored snapshot", run.id);
    }

    Ok(ReportSummary::from_snapshot(&pages).with_run_id(run.id))
}
