//! Rank module: link-analysis ranking and priority classification
//!
//! - `engine`: iterative rank computation over the graph store
//! - `classifier`: partition of visited pages into priority tiers by rank quantile

mod classifier;
mod engine;

pub use classifier::{classify, quantile, HIGH_QUANTILE, LOW_QUANTILE};
pub use engine::{compute_ranks, top_ranked, RankOutcome, RankTable};
