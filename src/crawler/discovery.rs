//! Breadth-first graph discovery
//!
//! The [`Crawler`] owns the in-memory page model (graph, version tracker and
//! visited set) and is the only component that feeds fetched records into it,
//! both during discovery and during monitoring sweeps.

use crate::crawler::{PageId, PageRecord, PageSource};
use crate::state::{GraphStore, VersionTracker};
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Number of visited pages between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Summary of one discovery pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryStats {
    /// Pages successfully fetched during this pass
    pub pages_visited: usize,

    /// Fetch attempts that failed (the page was not marked visited)
    pub fetch_failures: usize,

    /// Ids still waiting in the frontier when the pass stopped
    pub frontier_remaining: usize,

    /// Whether the pass stopped because the page cap was reached
    pub hit_page_cap: bool,

    /// Whether the pass stopped because `token` was cancelled
    pub cancelled: bool,

    /// Wall-clock duration of the pass
    pub duration: Duration,
}

/// Page crawler and owner of the page model
pub struct Crawler<S> {
    source: S,
    graph: GraphStore,
    versions: VersionTracker,
    visited: HashSet<PageId>,
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            graph: GraphStore::new(),
            versions: VersionTracker::new(),
            visited: HashSet::new(),
        }
    }

    /// Discovers the page collection by breadth-first traversal
    ///
    /// Each page is fetched at most once. A page whose fetch fails is neither
    /// marked visited nor re-enqueued; it is only attempted again if another
    /// page links to it later in the pass.
    ///
    /// `token` is checked before every frontier pop; a fetch already in
    /// flight completes first.
    ///
    /// # Arguments
    ///
    /// * `start` - The page to start from
    /// * `max_pages` - Stop once this many pages have been visited
    /// * `token` - Stops the pass early when cancelled
    ///
    /// # Returns
    ///
    /// Statistics for the pass
    pub async fn discover_from(
        &mut self,
        start: &str,
        max_pages: usize,
        token: &CancellationToken,
    ) -> DiscoveryStats {
        tracing::info!(
            "Starting discovery from page {} (max {} pages)",
            start,
            max_pages
        );

        let started = Instant::now();
        let mut frontier: VecDeque<PageId> = VecDeque::from([start.to_string()]);
        let mut pages_visited = 0;
        let mut fetch_failures = 0;
        let mut cancelled = false;

        while pages_visited < max_pages {
            if token.is_cancelled() {
                cancelled = true;
                break;
            }

            let Some(page_id) = frontier.pop_front() else {
                break;
            };

            if self.visited.contains(&page_id) {
                continue;
            }

            let Some(record) = self.source.fetch(&page_id).await else {
                fetch_failures += 1;
                continue;
            };

            self.visited.insert(page_id.clone());
            pages_visited += 1;

            self.process_record(&page_id, record);

            if let Some(links) = self.graph.links(&page_id) {
                frontier.extend(
                    links
                        .iter()
                        .filter(|link| !self.visited.contains(*link))
                        .cloned(),
                );
            }

            if pages_visited % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "Progress: {} pages visited, {} in frontier",
                    pages_visited,
                    frontier.len()
                );
            }
        }

        let stats = DiscoveryStats {
            pages_visited,
            fetch_failures,
            frontier_remaining: frontier.len(),
            hit_page_cap: pages_visited >= max_pages,
            cancelled,
            duration: started.elapsed(),
        };

        tracing::info!(
            "Discovery finished: {} pages visited, {} fetch failures, {} left in frontier ({:.2}s)",
            stats.pages_visited,
            stats.fetch_failures,
            stats.frontier_remaining,
            stats.duration.as_secs_f64()
        );
        if stats.cancelled {
            tracing::warn!("Discovery cancelled after {} pages", stats.pages_visited);
        } else if stats.hit_page_cap && stats.frontier_remaining > 0 {
            tracing::warn!("Discovery stopped at the page cap of {}", max_pages);
        }

        stats
    }

    /// Re-fetches a list of already visited pages
    ///
    /// Each successful fetch refreshes the page's links and is fed through the
    /// version tracker. Failed fetches count as "no update".
    ///
    /// # Returns
    ///
    /// The number of pages whose version changed
    pub async fn monitor_pages(&mut self, pages: &[PageId]) -> usize {
        let mut updates = 0;

        for page_id in pages {
            if let Some(record) = self.source.fetch(page_id).await {
                if self.process_record(page_id, record) {
                    updates += 1;
                }
            }
        }

        updates
    }

    /// Stores a fetched record under the requested page id
    ///
    /// Returns true if the page's version changed.
    fn process_record(&mut self, page_id: &str, record: PageRecord) -> bool {
        if record.page_id != page_id {
            tracing::warn!(
                "Page {} reported id {}, storing it under the requested id",
                page_id,
                record.page_id
            );
        }

        self.graph.set_links(page_id, record.outgoing_links);
        self.versions
            .observe(page_id, &record.version_id, record.history)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn versions(&self) -> &VersionTracker {
        &self.versions
    }

    pub fn visited(&self) -> &HashSet<PageId> {
        &self.visited
    }
}
