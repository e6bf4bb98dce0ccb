//! Priority classification of visited pages by rank quantiles
//!
//! Pages at or above the 80th percentile of the positive ranks go to the high
//! tier, pages below the 30th percentile go to the low tier, everything else is
//! medium. Without enough data (no ranks, or fewer than three positive ranks)
//! every page is medium.

use crate::crawler::PageId;
use crate::rank::RankTable;
use crate::state::{PriorityTier, TierAssignment};
use std::collections::HashSet;

/// Quantile marking the lower bound of the high tier
pub const HIGH_QUANTILE: f64 = 0.80;

/// Quantile marking the upper (exclusive) bound of the low tier
pub const LOW_QUANTILE: f64 = 0.30;

/// Minimum number of positive ranks needed to compute quantiles
const MIN_POSITIVE_RANKS: usize = 3;

/// Partitions the visited pages into priority tiers
///
/// Visited pages missing from `ranks` are treated as rank 0. Within each tier
/// pages are ordered by rank, highest first, ties by page id.
pub fn classify(visited: &HashSet<PageId>, ranks: &RankTable) -> TierAssignment {
    let mut pages: Vec<(&PageId, f64)> = visited
        .iter()
        .map(|id| (id, ranks.get(id).copied().unwrap_or(0.0)))
        .collect();
    pages.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut tiers = TierAssignment::new();

    if ranks.is_empty() {
        tracing::warn!("No ranks available, placing all pages in the medium tier");
        return all_medium(pages, tiers);
    }

    let mut positive: Vec<f64> = pages.iter().map(|(_, r)| *r).filter(|r| *r > 0.0).collect();
    if positive.len() < MIN_POSITIVE_RANKS {
        tracing::warn!(
            "Only {} pages have a positive rank, placing all pages in the medium tier",
            positive.len()
        );
        return all_medium(pages, tiers);
    }

    positive.sort_by(f64::total_cmp);
    let q_high = quantile(&positive, HIGH_QUANTILE);
    let q_low = quantile(&positive, LOW_QUANTILE);

    for (page_id, rank) in pages {
        let tier = if rank >= q_high {
            PriorityTier::High
        } else if rank < q_low {
            PriorityTier::Low
        } else {
            PriorityTier::Medium
        };
        tiers.push(tier, page_id.clone());
    }

    let (high, medium, low) = tiers.counts();
    tracing::info!(
        "Monitoring priorities set: high {} pages, medium {} pages, low {} pages",
        high,
        medium,
        low
    );

    tiers
}

fn all_medium(pages: Vec<(&PageId, f64)>, mut tiers: TierAssignment) -> TierAssignment {
    for (page_id, _) in pages {
        tiers.push(PriorityTier::Medium, page_id.clone());
    }
    tiers
}

/// Linear-interpolation quantile of an ascending, non-empty slice
///
/// Position `q * (n - 1)` is interpolated between its neighbouring samples.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
