//! Iterative link-analysis ranking
//!
//! Ranks are computed with the power method, updated in place: within one pass
//! a page's inbound sum reads whatever rank its linking pages currently hold,
//! including values already updated earlier in the same pass. Pages are visited
//! in graph insertion order, which makes intermediate values deterministic.
//!
//! Mass held by dangling pages is spread evenly over all pages every pass.
//! Links pointing at ids outside the graph still count towards the source's
//! out-degree; their share of rank is not redistributed.

use crate::config::RankConfig;
use crate::crawler::PageId;
use crate::state::GraphStore;
use std::collections::HashMap;

/// Rank score per page
pub type RankTable = HashMap<PageId, f64>;

/// Result of one rank computation
#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    /// Final rank per page in the graph
    pub ranks: RankTable,

    /// Number of passes performed
    pub iterations: u32,

    /// Whether the total change dropped below `tolerance * N`
    pub converged: bool,

    /// Sum of absolute rank changes during the last pass
    pub total_change: f64,
}

impl RankOutcome {
    fn empty() -> Self {
        Self {
            ranks: RankTable::new(),
            iterations: 0,
            converged: true,
            total_change: 0.0,
        }
    }
}

/// Link structure in index form, built once per computation
struct RankIndex {
    /// Number of listed outgoing links per page (duplicates and unknown targets included)
    out_degree: Vec<usize>,

    /// For each page, the distinct pages linking to it
    inbound: Vec<Vec<usize>>,

    /// Pages with no outgoing links
    dangling: Vec<usize>,
}

impl RankIndex {
    fn build(graph: &GraphStore) -> Self {
        let positions: HashMap<&str, usize> = graph
            .page_ids()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let n = graph.len();
        let mut out_degree = vec![0; n];
        let mut inbound: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut dangling = Vec::new();

        for (source, (_, links)) in graph.iter().enumerate() {
            out_degree[source] = links.len();
            if links.is_empty() {
                dangling.push(source);
                continue;
            }
            for target in links {
                if let Some(&t) = positions.get(target.as_str()) {
                    // A source contributes once per target, however often it lists it
                    if inbound[t].last() != Some(&source) {
                        inbound[t].push(source);
                    }
                }
            }
        }

        Self {
            out_degree,
            inbound,
            dangling,
        }
    }
}

/// Computes an importance score for every page of the graph
///
/// An empty graph yields an empty table. Hitting `max_iterations` without
/// converging is not an error: the last table is returned with
/// `converged == false` and a warning is logged.
pub fn compute_ranks(graph: &GraphStore, config: &RankConfig) -> RankOutcome {
    tracing::info!("Starting rank computation over {} pages", graph.len());

    if graph.is_empty() {
        tracing::warn!("Graph is empty, no ranks to compute");
        return RankOutcome::empty();
    }

    let n = graph.len();
    let nf = n as f64;
    let d = config.damping_factor;
    let index = RankIndex::build(graph);

    let mut ranks = vec![1.0 / nf; n];
    let base = (1.0 - d) / nf;
    let threshold = config.tolerance * nf;

    let mut iterations = 0;
    let mut converged = false;
    let mut total_change = 0.0;

    while iterations < config.max_iterations {
        iterations += 1;

        let dangling_sum: f64 = index.dangling.iter().map(|&p| ranks[p]).sum();
        let dangling_contribution = d * dangling_sum / nf;

        total_change = 0.0;
        for page in 0..n {
            let inbound_sum: f64 = index.inbound[page]
                .iter()
                .map(|&q| ranks[q] / index.out_degree[q] as f64)
                .sum();

            let new_rank = base + dangling_contribution + d * inbound_sum;
            total_change += (new_rank - ranks[page]).abs();
            ranks[page] = new_rank;
        }

        tracing::trace!("Rank iteration {}: total change {:e}", iterations, total_change);

        if total_change < threshold {
            converged = true;
            break;
        }
    }

    if converged {
        tracing::info!("Ranks converged after {} iterations", iterations);
    } else {
        tracing::warn!(
            "Ranks did not converge after {} iterations (total change {:e})",
            iterations,
            total_change
        );
    }

    let ranks = graph.page_ids().cloned().zip(ranks).collect();

    RankOutcome {
        ranks,
        iterations,
        converged,
        total_change,
    }
}

/// Returns the `n` highest ranked pages, highest first (ties by page id)
pub fn top_ranked(ranks: &RankTable, n: usize) -> Vec<(&PageId, f64)> {
    let mut entries: Vec<(&PageId, f64)> = ranks.iter().map(|(id, &r)| (id, r)).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(n);
    entries
}
