//! Markdown dashboard generation
//!
//! This module renders a human-readable dashboard of the monitored pages:
//! overview counts, the highest ranked pages and version activity.

use crate::output::traits::{OutputResult, ReportContext, ReportRenderer, ReportSummary};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes a markdown dashboard for a summary
///
/// # Arguments
///
/// * `summary` - The report summary
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the dashboard
/// * `Err(OutputError)` - Failed to write the dashboard
pub fn generate_markdown_summary(summary: &ReportSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a report summary as markdown
pub fn format_markdown_summary(summary: &ReportSummary) -> String {
    let mut md = String::new();

    md.push_str("# Pagewatch Dashboard\n\n");
    md.push_str(&format!("_Generated at {}_\n\n", summary.generated_at));
    if let Some(run_id) = summary.run_id {
        md.push_str(&format!("- **Run ID**: {}\n\n", run_id));
    }

    // Overview
    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Total Pages**: {}\n", summary.total_pages));
    md.push_str(&format!("- **Total Links**: {}\n", summary.total_links));
    md.push_str(&format!(
        "- **Dangling Pages**: {}\n",
        summary.dangling_pages
    ));
    md.push_str(&format!(
        "- **Priority Tiers**: high {} / medium {} / low {}\n\n",
        summary.high_pages, summary.medium_pages, summary.low_pages
    ));

    // Rank
    md.push_str("## Top Pages by Rank\n\n");
    match summary.top_page() {
        Some((page_id, rank)) => {
            md.push_str(&format!(
                "Most important page: **{}** (score {:.6})\n\n",
                page_id, rank
            ));
            md.push_str("| # | Page | Rank |\n");
            md.push_str("|---|------|------|\n");
            for (i, (page_id, rank)) in summary.top_ranked.iter().enumerate() {
                md.push_str(&format!("| {} | {} | {:.6} |\n", i + 1, page_id, rank));
            }
            md.push('\n');
        }
        None => md.push_str("No ranked pages yet.\n\n"),
    }

    // Activity
    md.push_str("## Activity\n\n");
    md.push_str(&format!(
        "- **Total Recorded Updates**: {}\n",
        summary.total_updates
    ));
    md.push_str(&format!(
        "- **Changes Observed This Run**: {}\n",
        summary.changes_observed
    ));
    if let Some((page_id, versions)) = summary.most_active_page() {
        md.push_str(&format!(
            "- **Most Active Page**: {} ({} versions)\n",
            page_id, versions
        ));
    }
    md.push('\n');

    if !summary.most_active.is_empty() {
        md.push_str("| Page | Versions |\n");
        md.push_str("|------|----------|\n");
        for (page_id, versions) in &summary.most_active {
            md.push_str(&format!("| {} | {} |\n", page_id, versions));
        }
        md.push('\n');
    }

    md
}

/// Renderer writing the markdown dashboard to a fixed path
#[derive(Debug, Clone)]
pub struct MarkdownReport {
    path: PathBuf,
    run_id: Option<i64>,
}

impl MarkdownReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            run_id: None,
        }
    }

    /// Tags every rendered dashboard with a run id
    pub fn with_run_id(mut self, run_id: i64) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportRenderer for MarkdownReport {
    fn name(&self) -> &str {
        "markdown"
    }

    fn render(&mut self, ctx: &ReportContext<'_>) -> OutputResult<()> {
        let mut summary = ReportSummary::from_context(ctx);
        summary.run_id = self.run_id;

        generate_markdown_summary(&summary, &self.path)?;
        tracing::debug!("Dashboard written to {}", self.path.display());
        Ok(())
    }
}
