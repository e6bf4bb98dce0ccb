//! Report renderer traits and types
//!
//! This module defines the trait interface for report renderers and the
//! summary data shared by every report format.

use crate::crawler::PageId;
use crate::rank::RankTable;
use crate::state::{GraphStore, PriorityTier, TierAssignment, VersionTracker};
use crate::storage::PageSnapshot;
use thiserror::Error;

/// Number of entries in the "top" lists of a summary
pub const TOP_N: usize = 5;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Read-only view of the page model handed to renderers
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub graph: &'a GraphStore,
    pub ranks: &'a RankTable,
    pub versions: &'a VersionTracker,
    pub tiers: &'a TierAssignment,
}

impl<'a> ReportContext<'a> {
    /// Flattens the model into per-page snapshots, in graph order
    pub fn snapshot(&self) -> Vec<PageSnapshot> {
        let tiers = self.tiers.by_page();

        self.graph
            .iter()
            .map(|(page_id, links)| PageSnapshot {
                page_id: page_id.clone(),
                current_version: self.versions.current_version(page_id).map(str::to_string),
                rank: self.ranks.get(page_id).copied().unwrap_or(0.0),
                tier: tiers.get(page_id.as_str()).copied(),
                outgoing: links.to_vec(),
                history: self
                    .versions
                    .history(page_id)
                    .map(<[_]>::to_vec)
                    .unwrap_or_default(),
                changes_observed: self.versions.changes_observed(page_id),
            })
            .collect()
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub generated_at: String,
    pub run_id: Option<i64>,

    // Overview
    pub total_pages: usize,
    pub total_links: usize,
    pub dangling_pages: usize,
    pub high_pages: usize,
    pub medium_pages: usize,
    pub low_pages: usize,

    /// Highest ranked pages, best first
    pub top_ranked: Vec<(PageId, f64)>,

    /// Pages with the longest version history, longest first
    pub most_active: Vec<(PageId, usize)>,

    /// Version transitions recorded in the histories
    pub total_updates: usize,

    /// Version changes seen while monitoring
    pub changes_observed: u64,
}

impl ReportSummary {
    /// Builds a summary from page snapshots
    ///
    /// `total_updates` counts every history entry beyond a page's first one.
    pub fn from_snapshot(pages: &[PageSnapshot]) -> Self {
        let mut summary = Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            total_pages: pages.len(),
            ..Self::default()
        };

        for page in pages {
            summary.total_links += page.outgoing.len();
            if page.outgoing.is_empty() {
                summary.dangling_pages += 1;
            }
            match page.tier {
                Some(PriorityTier::High) => summary.high_pages += 1,
                Some(PriorityTier::Medium) => summary.medium_pages += 1,
                Some(PriorityTier::Low) => summary.low_pages += 1,
                None => {}
            }
            summary.changes_observed += u64::from(page.changes_observed);
        }

        let history_entries: usize = pages.iter().map(|p| p.history.len()).sum();
        let pages_with_history = pages.iter().filter(|p| !p.history.is_empty()).count();
        summary.total_updates = history_entries.saturating_sub(pages_with_history);

        let mut ranked: Vec<(PageId, f64)> =
            pages.iter().map(|p| (p.page_id.clone(), p.rank)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(TOP_N);
        summary.top_ranked = ranked;

        let mut active: Vec<(PageId, usize)> = pages
            .iter()
            .filter(|p| !p.history.is_empty())
            .map(|p| (p.page_id.clone(), p.history.len()))
            .collect();
        active.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        active.truncate(TOP_N);
        summary.most_active = active;

        summary
    }

    /// Builds a summary of the live model
    pub fn from_context(ctx: &ReportContext<'_>) -> Self {
        Self::from_snapshot(&ctx.snapshot())
    }

    pub fn with_run_id(mut self, run_id: i64) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn top_page(&self) -> Option<&(PageId, f64)> {
        self.top_ranked.first()
    }

    pub fn most_active_page(&self) -> Option<&(PageId, usize)> {
        self.most_active.first()
    }
}

/// Trait for report renderers
///
/// Renderers are invoked after every rank computation of the monitoring loop.
/// A failing renderer never affects the loop; the error is logged.
pub trait ReportRenderer {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Renders a report of the current model
    ///
    /// # Arguments
    ///
    /// * `ctx` - The graph, ranks, version histories and tiers to report on
    fn render(&mut self, ctx: &ReportContext<'_>) -> OutputResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::VersionRecord;

    fn page(
        id: &str,
        rank: f64,
        links: usize,
        history: usize,
        tier: Option<PriorityTier>,
    ) -> PageSnapshot {
        PageSnapshot {
            page_id: id.to_string(),
            current_version: Some("v".to_string()),
            rank,
            tier,
            outgoing: (0..links).map(|i| format!("l{}", i)).collect(),
            history: (0..history)
                .map(|i| VersionRecord::new(format!("v{}", i), "t"))
                .collect(),
            changes_observed: 0,
        }
    }

    #[test]
    fn test_summary_from_snapshot() {
        let pages = vec![
            page("a", 0.5, 2, 3, Some(PriorityTier::High)),
            page("b", 0.3, 0, 1, Some(PriorityTier::Medium)),
            page("c", 0.2, 1, 0, Some(PriorityTier::Low)),
        ];
        let summary = ReportSummary::from_snapshot(&pages);

        assert_eq!(summary.total_pages, 3);
        assert_eq!(summary.total_links, 3);
        assert_eq!(summary.dangling_pages, 1);
        assert_eq!((summary.high_pages, summary.medium_pages, summary.low_pages), (1, 1, 1));
        // (3 + 1 + 0) entries over 2 pages with history
        assert_eq!(summary.total_updates, 2);
        assert_eq!(summary.top_page().map(|(id, _)| id.as_str()), Some("a"));
        assert_eq!(summary.most_active_page(), Some(&("a".to_string(), 3)));
        assert_eq!(summary.most_active.len(), 2);
    }

    #[test]
    fn test_empty_summary() {
        let summary = ReportSummary::from_snapshot(&[]);

        assert_eq!(summary.total_pages, 0);
        assert_eq!(summary.total_updates, 0);
        assert!(summary.top_page().is_none());
        assert!(summary.most_active_page().is_none());
    }

    #[test]
    fn test_top_lists_are_truncated() {
        let pages: Vec<PageSnapshot> = (0..8)
            .map(|i| page(&format!("p{}", i), i as f64, 0, i, None))
            .collect();
        let summary = ReportSummary::from_snapshot(&pages);

        assert_eq!(summary.top_ranked.len(), TOP_N);
        assert_eq!(summary.top_ranked[0].0, "p7");
        assert_eq!(summary.most_active.len(), TOP_N);
        assert_eq!(summary.most_active[0], ("p7".to_string(), 7));
    }

    #[test]
    fn test_context_snapshot_follows_graph_order() {
        let mut graph = GraphStore::new();
        graph.set_links("b", vec!["a".to_string()]);
        graph.set_links("a", vec![]);

        let mut versions = VersionTracker::new();
        versions.observe("a", "v1", vec![VersionRecord::new("v1", "t")]);

        let mut ranks = RankTable::new();
        ranks.insert("a".to_string(), 0.7);

        let mut tiers = TierAssignment::new();
        tiers.push(PriorityTier::High, "a".to_string());

        let ctx = ReportContext {
            graph: &graph,
            ranks: &ranks,
            versions: &versions,
            tiers: &tiers,
        };
        let pages = ctx.snapshot();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_id, "b");
        assert_eq!(pages[0].rank, 0.0);
        assert_eq!(pages[0].tier, None);
        assert_eq!(pages[0].current_version, None);
        assert_eq!(pages[1].page_id, "a");
        assert_eq!(pages[1].tier, Some(PriorityTier::High));
        assert_eq!(pages[1].history.len(), 1);
    }
}
