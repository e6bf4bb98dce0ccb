//! Crawler module for page fetching and monitoring
//!
//! This module contains the core crawling logic, including:
//! - The page source contract and its HTTP implementation
//! - HTML parsing into page records
//! - Breadth-first discovery of the page collection
//! - The tiered monitoring scheduler

mod discovery;
mod fetcher;
mod parser;
mod scheduler;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use discovery::{Crawler, DiscoveryStats};
pub use fetcher::{build_http_client, FetchError, HttpPageSource};
pub use parser::{parse_page, parse_start_page};
pub use scheduler::{Monitor, MonitorState, SweepReport, TickReport};
pub use traits::{PageId, PageRecord, PageSource, VersionRecord};
