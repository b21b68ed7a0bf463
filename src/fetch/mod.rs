//! Outbound document fetching.
//!
//! The pipeline only depends on the [`Fetcher`] trait; [`HttpFetcher`] is the
//! production implementation on top of reqwest.

mod user_agent;

pub use user_agent::{resolve_user_agent, IMPERSONATE_USER_AGENTS, USER_AGENT};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::FetchSettings;
use crate::extract::DocumentHint;

pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Error types for document fetching.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("BusPlus HTTP {0}")]
    Status(u16),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

/// A fetched source document.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedDocument {
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
        }
    }

    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Document hint derived from the Content-Type header.
    pub fn hint(&self) -> DocumentHint {
        match self.content_type.as_deref() {
            Some(ct) if ct.contains("json") => DocumentHint::Json,
            Some(ct) if ct.contains("html") => DocumentHint::Html,
            _ => DocumentHint::Auto,
        }
    }
}

/// Source of raw documents for a constructed URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a document. Non-success statuses are returned, not raised.
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError>;
}

/// HTTP fetcher with browser-like headers and a request timeout.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    accept_language: String,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(settings.user_agent.as_deref());
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            accept_language: settings.accept_language.clone(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        debug!(
            url,
            status,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched source document"
        );

        Ok(FetchedDocument {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(FetchedDocument::html(200, "").is_success());
        assert!(FetchedDocument::html(204, "").is_success());
        assert!(!FetchedDocument::html(304, "").is_success());
        assert!(!FetchedDocument::html(503, "").is_success());
    }

    #[test]
    fn test_hint_from_content_type() {
        let mut doc = FetchedDocument::html(200, "");
        assert_eq!(doc.hint(), DocumentHint::Html);
        doc.content_type = Some("application/json".to_string());
        assert_eq!(doc.hint(), DocumentHint::Json);
        doc.content_type = None;
        assert_eq!(doc.hint(), DocumentHint::Auto);
    }

    #[test]
    fn test_status_error_message() {
        assert_eq!(FetchError::Status(503).to_string(), "BusPlus HTTP 503");
    }

    #[test]
    fn test_http_fetcher_builds_from_defaults() {
        assert!(HttpFetcher::new(&FetchSettings::default()).is_ok());
    }
}
