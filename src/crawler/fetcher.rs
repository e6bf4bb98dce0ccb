//! HTTP page source
//!
//! This module fetches pages from the page collection server:
//! - Building the HTTP client with the configured timeout and user agent
//! - GET requests for the root page and individual pages
//! - Status and Content-Type checks
//! - Error classification (logged, then collapsed to `None`)

use crate::config::ServerConfig;
use crate::crawler::parser::{parse_page, parse_start_page};
use crate::crawler::{PageId, PageRecord, PageSource};
use reqwest::Client;
use thiserror::Error;

/// Reasons a fetch can fail
///
/// These never leave the fetcher: every variant is logged and reported to
/// callers as a plain fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status code {0}")]
    Status(u16),

    #[error("Expected HTML, got Content-Type '{0}'")]
    ContentType(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to parse page: {0}")]
    Parse(String),
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The server configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ServerConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(config.request_timeout())
        .connect_timeout(config.request_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageSource`] backed by an HTTP server
///
/// The root URL serves the start page; every page id is served at
/// `<base-url>/<page id>`.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    base_url: String,
}

impl HttpPageSource {
    /// Creates a page source for the configured server
    pub fn new(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, &config.base_url))
    }

    /// Creates a page source reusing an existing client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL a page is served at
    pub fn page_url(&self, page_id: &str) -> String {
        format!("{}/{}", self.base_url, page_id)
    }

    /// Fetches an HTML document, checking status and Content-Type
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(FetchError::ContentType(content_type));
        }

        response.text().await.map_err(classify_error)
    }

    async fn try_find_start_page(&self) -> Result<PageId, FetchError> {
        let body = self.fetch_html(&self.base_url).await?;
        parse_start_page(&body).map_err(FetchError::Parse)
    }

    async fn try_fetch(&self, page_id: &str) -> Result<PageRecord, FetchError> {
        let body = self.fetch_html(&self.page_url(page_id)).await?;
        parse_page(&body).map_err(FetchError::Parse)
    }
}

impl PageSource for HttpPageSource {
    async fn find_start_page(&self) -> Option<PageId> {
        tracing::info!("Discovering start page from {}", self.base_url);

        match self.try_find_start_page().await {
            Ok(page_id) => {
                tracing::info!("Discovered start page: {}", page_id);
                Some(page_id)
            }
            Err(e) => {
                tracing::error!("Could not find start page at {}: {}", self.base_url, e);
                None
            }
        }
    }

    async fn fetch(&self, page_id: &str) -> Option<PageRecord> {
        match self.try_fetch(page_id).await {
            Ok(record) => {
                tracing::debug!(
                    "Fetched page {} ({} links, {} history entries)",
                    page_id,
                    record.outgoing_links.len(),
                    record.history.len()
                );
                Some(record)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch page {}: {}", page_id, e);
                None
            }
        }
    }
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(e)
    }
}
