//! Configuration module for Pagewatch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use pagewatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagewatch.toml")).unwrap();
//! println!("Discovery will fetch at most {} pages", config.discovery.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DiscoveryConfig, MonitorConfig, OutputConfig, RankConfig, ServerConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
