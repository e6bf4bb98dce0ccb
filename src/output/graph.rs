//! Graphviz rendering of the page graph
//!
//! This module writes the visited pages as a directed DOT graph. Node size
//! follows the page's rank relative to the top ranked page, node colour
//! follows how many versions the page has gone through.

use crate::output::traits::{OutputResult, ReportContext, ReportRenderer};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Node size of pages without a positive rank
const BASE_NODE_SIZE: f64 = 10.0;

/// Scale applied to the logarithm of the normalized rank
const RANK_SIZE_SCALE: f64 = 20.0;

/// Node size units per inch of Graphviz node width
const SIZE_PER_INCH: f64 = 20.0;

/// Fill colour for a page with `update_count` recorded versions
///
/// Static pages (at most one version) are blue, then yellow up to five
/// versions, orange up to ten and red beyond.
pub fn node_color(update_count: usize) -> &'static str {
    match update_count {
        0..=1 => "#3498db",
        2..=5 => "#f1c40f",
        6..=10 => "#e67e22",
        _ => "#e74c3c",
    }
}

/// Node size for a page of rank `rank` when the top rank is `max_rank`
///
/// Grows logarithmically from 10 (no rank) to about 56 (the top page).
pub fn node_size(rank: f64, max_rank: f64) -> f64 {
    if rank <= 0.0 || max_rank <= 0.0 {
        return BASE_NODE_SIZE;
    }

    let normalized = rank / max_rank;
    BASE_NODE_SIZE + (normalized * 9.0).ln_1p() * RANK_SIZE_SCALE
}

/// Formats the page graph as a DOT digraph
///
/// Only edges between visited pages are drawn, each (source, target) pair
/// once.
pub fn format_dot_graph(ctx: &ReportContext<'_>) -> String {
    let max_rank = ctx.ranks.values().copied().fold(0.0, f64::max);

    let mut dot = String::new();
    dot.push_str("digraph pages {\n");
    dot.push_str("  graph [label=\"Page Graph\", overlap=false];\n");
    dot.push_str("  node [shape=circle, style=filled, fontcolor=\"#333333\"];\n");
    dot.push_str("  edge [arrowsize=0.5];\n\n");

    for page_id in ctx.graph.page_ids() {
        let rank = ctx.ranks.get(page_id).copied().unwrap_or(0.0);
        let updates = ctx.versions.history(page_id).map_or(0, <[_]>::len);
        let width = node_size(rank, max_rank) / SIZE_PER_INCH;

        dot.push_str(&format!(
            "  \"{}\" [width={:.2}, fillcolor=\"{}\", tooltip=\"Rank: {:.6}\\nUpdates: {}\"];\n",
            escape(page_id),
            width,
            node_color(updates),
            rank,
            updates
        ));
    }
    dot.push('\n');

    for (page_id, links) in ctx.graph.iter() {
        let mut drawn: Vec<&str> = Vec::new();
        for link in links {
            if !ctx.graph.contains(link) || drawn.contains(&link.as_str()) {
                continue;
            }
            drawn.push(link);
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                escape(page_id),
                escape(link)
            ));
        }
    }

    dot.push_str("}\n");
    dot
}

fn escape(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renderer writing the DOT graph to a fixed path
#[derive(Debug, Clone)]
pub struct GraphReport {
    path: PathBuf,
}

impl GraphReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportRenderer for GraphReport {
    fn name(&self) -> &str {
        "graph"
    }

    fn render(&mut self, ctx: &ReportContext<'_>) -> OutputResult<()> {
        if ctx.graph.is_empty() {
            tracing::warn!("Graph is empty, skipping graph rendering");
            return Ok(());
        }

        let dot = format_dot_graph(ctx);
        let mut file = File::create(&self.path)?;
        file.write_all(dot.as_bytes())?;

        tracing::debug!("Graph written to {}", self.path.display());
        Ok(())
    }
}
