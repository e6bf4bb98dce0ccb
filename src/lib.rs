//! Pagewatch: a rank-driven page collection monitor
//!
//! This crate discovers the link structure of a page collection by breadth-first
//! traversal, ranks the discovered pages by structural importance and then keeps
//! re-polling them at frequencies chosen by that importance, tracking how each
//! page's content version changes over time.

pub mod config;
pub mod crawler;
pub mod output;
pub mod rank;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Pagewatch operations
#[derive(Debug, Error)]
pub enum PagewatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No start page could be discovered at {base_url}")]
    NoStartPage { base_url: String },

    #[error("Discovery from start page {start} yielded an empty graph")]
    EmptyGraph { start: String },

    #[error("Startup was cancelled before monitoring began")]
    Cancelled,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PagewatchError {
    /// Returns true for the startup failures that abort the whole pipeline
    pub fn is_fatal_startup(&self) -> bool {
        matches!(self, Self::NoStartPage { .. } | Self::EmptyGraph { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Pagewatch operations
pub type Result<T> = std::result::Result<T, PagewatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{PageId, PageRecord, PageSource, VersionRecord};
pub use rank::{classify, compute_ranks, RankOutcome, RankTable};
pub use state::{GraphStore, PriorityTier, TierAssignment, VersionTracker};
