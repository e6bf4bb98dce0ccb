//! In-memory page source for unit tests

use crate::crawler::{PageId, PageRecord, PageSource, VersionRecord};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Page source serving records from memory
///
/// Pages can be bumped to a new version between fetches, individual ids
/// can be made to fail, and a fetch can cancel a token.
#[derive(Debug, Default)]
pub struct MemorySource {
    start: Option<PageId>,
    pages: Mutex<HashMap<PageId, PageRecord>>,
    failing: Mutex<HashSet<PageId>>,
    fetches: Mutex<Vec<PageId>>,
    cancel_on: Mutex<Option<(PageId, CancellationToken)>>,
}

impl MemorySource {
    pub fn new(start: Option<&str>) -> Self {
        Self {
            start: start.map(str::to_string),
            ..Self::default()
        }
    }

    /// Builds a source from `(page, links)` pairs, each page at version `v1`
    pub fn from_graph(start: &str, edges: &[(&str, &[&str])]) -> Self {
        let source = Self::new(Some(start));
        for (page_id, links) in edges {
            source.insert(page_id, "v1", links);
        }
        source
    }

    pub fn insert(&self, page_id: &str, version_id: &str, links: &[&str]) {
        let record = PageRecord {
            page_id: page_id.to_string(),
            version_id: version_id.to_string(),
            history: vec![VersionRecord::new(version_id, "t0")],
            outgoing_links: links.iter().map(|l| l.to_string()).collect(),
        };
        self.insert_record(page_id, record);
    }

    /// Serves `record` for requests to `page_id`, whatever id it reports
    pub fn insert_record(&self, page_id: &str, record: PageRecord) {
        self.pages.lock().unwrap().insert(page_id.to_string(), record);
    }

    /// Moves a page to a new version, appending it to the page's history
    pub fn bump(&self, page_id: &str, version_id: &str) {
        let mut pages = self.pages.lock().unwrap();
        let record = pages.get_mut(page_id).unwrap();
        let timestamp = format!("t{}", record.history.len());
        record.version_id = version_id.to_string();
        record.history.push(VersionRecord::new(version_id, timestamp));
    }

    /// Replaces the outgoing links of a page
    pub fn relink(&self, page_id: &str, links: &[&str]) {
        let mut pages = self.pages.lock().unwrap();
        let record = pages.get_mut(page_id).unwrap();
        record.outgoing_links = links.iter().map(|l| l.to_string()).collect();
    }

    pub fn fail(&self, page_id: &str) {
        self.failing.lock().unwrap().insert(page_id.to_string());
    }

    pub fn recover(&self, page_id: &str) {
        self.failing.lock().unwrap().remove(page_id);
    }

    /// Cancels `token` while `page_id` is being fetched
    pub fn cancel_on_fetch(&self, page_id: &str, token: &CancellationToken) {
        *self.cancel_on.lock().unwrap() = Some((page_id.to_string(), token.clone()));
    }

    /// Every fetch attempt so far, in order
    pub fn fetches(&self) -> Vec<PageId> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, page_id: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|id| id.as_str() == page_id)
            .count()
    }
}

impl PageSource for MemorySource {
    async fn find_start_page(&self) -> Option<PageId> {
        self.start.clone()
    }

    async fn fetch(&self, page_id: &str) -> Option<PageRecord> {
        self.fetches.lock().unwrap().push(page_id.to_string());

        if let Some((trigger, token)) = self.cancel_on.lock().unwrap().as_ref() {
            if trigger == page_id {
                token.cancel();
            }
        }

        if self.failing.lock().unwrap().contains(page_id) {
            return None;
        }
        self.pages.lock().unwrap().get(page_id).cloned()
    }
}
