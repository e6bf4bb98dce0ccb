//! State module for the in-memory page model
//!
//! # Components
//!
//! - `GraphStore`: visited pages and their outgoing links, in discovery order
//! - `VersionTracker`: current version and version history per page
//! - `PriorityTier` / `TierAssignment`: monitoring priority of visited pages

mod graph;
mod tier;
mod versions;

// Re-export main types
pub use graph::GraphStore;
pub use tier::{PriorityTier, TierAssignment};
pub use versions::VersionTracker;
