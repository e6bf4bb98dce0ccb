//! Node version tracking
//!
//! Keeps the most recently observed version id of every page together with the
//! history the page reported alongside it.

use crate::crawler::{PageId, VersionRecord};
use std::collections::HashMap;

/// Per-page current version and version history
#[derive(Debug, Clone, Default)]
pub struct VersionTracker {
    /// Most recently observed version id per page
    current: HashMap<PageId, String>,

    /// History as last reported by the page
    history: HashMap<PageId, Vec<VersionRecord>>,

    /// Number of version changes seen after the first observation
    changes: HashMap<PageId, u32>,
}

impl VersionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an observation of a page and reports whether its version changed
    ///
    /// On a change (including the first observation) the stored history is
    /// replaced wholesale with `reported_history`; the page is assumed to
    /// report its authoritative full history. An unchanged version leaves all
    /// state untouched.
    pub fn observe(
        &mut self,
        page_id: &str,
        reported_version: &str,
        reported_history: Vec<VersionRecord>,
    ) -> bool {
        let previous = self.current.get(page_id);
        if previous.map(String::as_str) == Some(reported_version) {
            return false;
        }

        match previous {
            Some(old) => {
                tracing::info!(
                    "Version update: page {} changed from {} -> {}",
                    page_id,
                    old,
                    reported_version
                );
                *self.changes.entry(page_id.to_string()).or_insert(0) += 1;
            }
            None => {
                tracing::info!(
                    "Discovered page {} (version {})",
                    page_id,
                    reported_version
                );
            }
        }

        self.current
            .insert(page_id.to_string(), reported_version.to_string());
        self.history.insert(page_id.to_string(), reported_history);
        true
    }

    pub fn current_version(&self, page_id: &str) -> Option<&str> {
        self.current.get(page_id).map(String::as_str)
    }

    pub fn history(&self, page_id: &str) -> Option<&[VersionRecord]> {
        self.history.get(page_id).map(Vec::as_slice)
    }

    /// All stored histories
    pub fn histories(&self) -> &HashMap<PageId, Vec<VersionRecord>> {
        &self.history
    }

    /// Number of version changes observed for a page during this run
    pub fn changes_observed(&self, page_id: &str) -> u32 {
        self.changes.get(page_id).copied().unwrap_or(0)
    }

    /// Total number of version changes observed during this run
    pub fn total_changes_observed(&self) -> u64 {
        self.changes.values().map(|&c| c as u64).sum()
    }

    /// Number of pages with a known version
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Pages with the longest histories, longest first (ties by page id)
    pub fn most_versioned(&self, n: usize) -> Vec<(&PageId, usize)> {
        let mut entries: Vec<(&PageId, usize)> = self
            .history
            .iter()
            .map(|(id, history)| (id, history.len()))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }
}
