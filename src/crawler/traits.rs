//! Fetch collaborator contract and the records it produces
//!
//! The discovery crawler and the monitoring scheduler only ever talk to a
//! [`PageSource`]. The HTTP implementation lives in `fetcher.rs`; tests plug in
//! in-memory sources.

use serde::{Deserialize, Serialize};

/// Opaque page identifier, unique across every map in the crate
pub type PageId = String;

/// One entry of a page's version history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Version identifier as reported by the page
    pub version_id: String,

    /// Timestamp text as reported by the page (not interpreted)
    pub timestamp: String,
}

impl VersionRecord {
    pub fn new(version_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            version_id: version_id.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Structured content of a successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Page id reported by the page itself
    pub page_id: PageId,

    /// Current content version
    pub version_id: String,

    /// Full version history, oldest first
    pub history: Vec<VersionRecord>,

    /// Outgoing links in document order (duplicates preserved)
    pub outgoing_links: Vec<PageId>,
}

/// Source of page records
///
/// Every failure mode (network error, timeout, wrong content type, unparseable
/// markup) is reported the same way: `None`. Implementations log the cause.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Discovers the page the traversal should start from
    async fn find_start_page(&self) -> Option<PageId>;

    /// Fetches and parses a single page
    async fn fetch(&self, page_id: &str) -> Option<PageRecord>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    async fn find_start_page(&self) -> Option<PageId> {
        (**self).find_start_page().await
    }

    async fn fetch(&self, page_id: &str) -> Option<PageRecord> {
        (**self).fetch(page_id).await
    }
}
