//! HTML parser for page records
//!
//! This module turns the markup served for a page into a [`PageRecord`]:
//! - Page id (`div.page-id`, text after the last `:`)
//! - Current version (`span.node-id b`)
//! - Version history (`details` block)
//! - Outgoing links (`table.files-table a.file-link`)

use crate::crawler::{PageId, PageRecord, VersionRecord};
use scraper::{ElementRef, Html, Selector};

/// Parses a page and extracts its record
///
/// # Extraction Rules
///
/// **Required:**
/// - `<div class="page-id">Page: ID</div>`: the id is the text after the last `:`
/// - `<span class="node-id"><b>VERSION</b></span>`
///
/// **Optional:**
/// - `<details>`: its last direct `<div>` child holds one `<div>` per version,
///   each reading `VERSION (TIMESTAMP)`; malformed entries are skipped
/// - `<table class="files-table">`: every `<a class="file-link">` is a link,
///   the target id being the last `/` segment of its `href`
///
/// # Arguments
///
/// * `html` - The HTML content to parse
///
/// # Returns
///
/// * `Ok(PageRecord)` - Successfully parsed page
/// * `Err(String)` - A required element is missing or empty
pub fn parse_page(html: &str) -> Result<PageRecord, String> {
    let document = Html::parse_document(html);

    let page_id = extract_page_id(&document)?;
    let version_id = extract_version_id(&document)?;
    let history = extract_history(&document);
    let outgoing_links = extract_links(&document);

    Ok(PageRecord {
        page_id,
        version_id,
        history,
        outgoing_links,
    })
}

/// Parses the root page and extracts the id of the page to start from
pub fn parse_start_page(html: &str) -> Result<PageId, String> {
    let document = Html::parse_document(html);
    extract_page_id(&document)
}

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("Invalid selector '{}': {}", css, e))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Extracts the page id from the `page-id` block
fn extract_page_id(document: &Html) -> Result<PageId, String> {
    let page_id_selector = selector("div.page-id")?;

    let element = document
        .select(&page_id_selector)
        .next()
        .ok_or_else(|| "Missing page-id element".to_string())?;

    let text = element_text(element);
    let page_id = text.rsplit(':').next().unwrap_or_default().trim();

    if page_id.is_empty() {
        return Err("Empty page id".to_string());
    }

    Ok(page_id.to_string())
}

/// Extracts the current version from the `node-id` block
fn extract_version_id(document: &Html) -> Result<String, String> {
    let version_selector = selector("span.node-id b")?;

    let version_id = document
        .select(&version_selector)
        .next()
        .map(|element| element_text(element).trim().to_string())
        .ok_or_else(|| "Missing node-id element".to_string())?;

    if version_id.is_empty() {
        return Err("Empty version id".to_string());
    }

    Ok(version_id)
}

/// Extracts the version history, oldest entry first
fn extract_history(document: &Html) -> Vec<VersionRecord> {
    let (Ok(details_selector), Ok(div_selector)) = (selector("details"), selector("div")) else {
        return Vec::new();
    };

    let Some(details) = document.select(&details_selector).next() else {
        return Vec::new();
    };

    // Only the last direct div child carries the entries
    let Some(entries) = details
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "div")
        .last()
    else {
        tracing::debug!("History block has no entry list");
        return Vec::new();
    };

    entries
        .select(&div_selector)
        .filter_map(|item| parse_history_entry(&element_text(item)))
        .collect()
}

/// Parses one `VERSION (TIMESTAMP)` history entry
fn parse_history_entry(text: &str) -> Option<VersionRecord> {
    let text = text.trim_matches(|c: char| c.is_whitespace() || c == '•');

    if !text.contains('(') || !text.contains(')') {
        return None;
    }

    let Some((version_id, timestamp)) = text.split_once(" (") else {
        tracing::debug!("Skipping malformed history entry '{}'", text);
        return None;
    };

    Some(VersionRecord::new(version_id, timestamp.trim_matches(')')))
}

/// Extracts outgoing link ids in document order, duplicates preserved
fn extract_links(document: &Html) -> Vec<PageId> {
    let (Ok(table_selector), Ok(link_selector)) =
        (selector("table.files-table"), selector("a.file-link"))
    else {
        return Vec::new();
    };

    let Some(table) = document.select(&table_selector).next() else {
        return Vec::new();
    };

    table
        .select(&link_selector)
        .filter_map(|link| {
            let href = link.value().attr("href").unwrap_or_default();
            href.rsplit('/')
                .next()
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
        })
        .collect()
}
