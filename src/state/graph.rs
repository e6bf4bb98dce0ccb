//! Graph store: page id -> ordered outgoing links
//!
//! Pages are kept in the order they were first inserted. That order is the
//! iteration order used by the rank engine, so rank computation is
//! deterministic for a given discovery sequence.

use crate::crawler::PageId;
use std::collections::HashMap;

/// Append-only mapping from visited pages to their outgoing links
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    /// Page ids in first-insertion order
    order: Vec<PageId>,

    /// Outgoing links per page
    links: HashMap<PageId, Vec<PageId>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a page or refreshes the outgoing links of an existing one
    ///
    /// A refreshed page keeps its original position in the iteration order.
    pub fn set_links(&mut self, page_id: &str, outgoing: Vec<PageId>) {
        match self.links.get_mut(page_id) {
            Some(existing) => *existing = outgoing,
            None => {
                self.order.push(page_id.to_string());
                self.links.insert(page_id.to_string(), outgoing);
            }
        }
    }

    /// Returns the outgoing links of a page, if the page is in the graph
    pub fn links(&self, page_id: &str) -> Option<&[PageId]> {
        self.links.get(page_id).map(Vec::as_slice)
    }

    pub fn contains(&self, page_id: &str) -> bool {
        self.links.contains_key(page_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates page ids in first-insertion order
    pub fn page_ids(&self) -> impl Iterator<Item = &PageId> + '_ {
        self.order.iter()
    }

    /// Iterates `(page, outgoing links)` pairs in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&PageId, &[PageId])> + '_ {
        self.order
            .iter()
            .map(move |id| (id, self.links.get(id).map(Vec::as_slice).unwrap_or(&[])))
    }

    /// Total number of outgoing link entries, duplicates included
    pub fn total_links(&self) -> usize {
        self.links.values().map(Vec::len).sum()
    }

    /// Pages without outgoing links, in first-insertion order
    pub fn dangling_pages(&self) -> Vec<&PageId> {
        self.iter()
            .filter(|(_, links)| links.is_empty())
            .map(|(id, _)| id)
            .collect()
    }
}

impl FromIterator<(PageId, Vec<PageId>)> for GraphStore {
    fn from_iter<I: IntoIterator<Item = (PageId, Vec<PageId>)>>(iter: I) -> Self {
        let mut graph = GraphStore::new();
        for (page_id, outgoing) in iter {
            graph.set_links(&page_id, outgoing);
        }
        graph
    }
}
