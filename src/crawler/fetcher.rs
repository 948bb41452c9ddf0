//! HTTP fetcher for listing pages
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Building page URLs from the listing base URL
//! - Issuing one GET per page and classifying the response
//!
//! Nothing is retried here; a failed page ends the run.

use crate::config::{ListingConfig, UserAgentConfig};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// A page-level failure; terminal for the run
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("page {page} returned HTTP {status}")]
    Status { page: u32, status: u16 },

    /// Connection, timeout, TLS or body-read failure
    #[error("page {page} could not be fetched: {source}")]
    Transport {
        page: u32,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// The page number the failure happened on
    pub fn page(&self) -> u32 {
        match self {
            Self::Status { page, .. } | Self::Transport { page, .. } => *page,
        }
    }
}

/// The markup of one successfully fetched listing page
#[derive(Debug, Clone)]
pub struct RawPage {
    /// 1-based page number
    pub page: u32,
    /// URL the page was requested from
    pub url: String,
    /// Response body as text
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use discount_harvest::config::UserAgentConfig;
/// use discount_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "discount-harvest".to_string(),
///     crawler_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/bot".to_string(),
/// };
///
/// let client = build_http_client(&config, 30).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Format: CrawlerName/Version (+ContactURL)
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{})",
        config.crawler_name, config.crawler_version, config.contact_url
    )
}

/// Fetches listing pages one at a time
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    base_url: String,
}

impl PageFetcher {
    /// Creates a fetcher over an existing client
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds the client from configuration and wraps it
    pub fn from_config(
        listing: &ListingConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, listing.request_timeout_secs)?;
        Ok(Self::new(client, listing.base_url.clone()))
    }

    /// URL of the given 1-based page
    pub fn page_url(&self, page: u32) -> String {
        format!("{}{}", self.base_url, page)
    }

    /// Fetches one listing page
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | HTTP 2xx | `RawPage` with the body text |
    /// | Any other HTTP status | `FetchError::Status` |
    /// | Connect / timeout / TLS / body error | `FetchError::Transport` |
    pub async fn fetch(&self, page: u32) -> Result<RawPage, FetchError> {
        let url = self.page_url(page);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { page, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport { page, source })?;

        Ok(RawPage { page, url, body })
    }
}
