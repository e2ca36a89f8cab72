//! The feed-parsing collaborator: URL in, summary + entries out.
//!
//! The engine never touches wire formats itself. [`FeedSource`] is the seam:
//! production code uses [`HttpSource`] (reqwest + feed-rs), tests substitute
//! an in-memory implementation. Whatever the source, a fetch yields the same
//! [`FetchedFeed`] shape, so the merge algorithm behaves identically.

use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

use crate::feed::FeedSummary;
use crate::item::Entry;

/// Per-request timeout, matching what a user will tolerate for one feed.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Response body cap; a syndication feed has no business being larger.
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors from a single fetch attempt. Recorded on the feed and surfaced
/// through the refresh result stream; never fatal to sibling fetches.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed was created without a URL; nothing was attempted.
    #[error("feed has no URL")]
    NoUrl,
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the 30-second timeout
    #[error("request timed out")]
    Timeout,
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the 10MB size limit
    #[error("response too large")]
    TooLarge,
    /// Body could not be parsed as RSS, Atom or JSON Feed
    #[error("parse error: {0}")]
    Parse(String),
}

/// A successfully fetched and decoded feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedFeed {
    pub summary: FeedSummary,
    pub entries: Vec<Entry>,
}

/// Retrieves and decodes one feed by URL.
///
/// `async_trait` keeps the trait object-safe so the orchestrator can hold an
/// `Arc<dyn FeedSource>` shared across spawned fetch tasks.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedFeed, FetchError>;
}

/// Production source: HTTP via reqwest, decoding via feed-rs.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a caller-configured client (proxies, custom user agent).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<FetchedFeed, FetchError> {
        let response = tokio::time::timeout(FETCH_TIMEOUT, self.client.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited(response, MAX_FEED_SIZE).await?;
        tracing::debug!(url = %url, bytes = bytes.len(), "Fetched feed body");
        decode(&bytes)
    }
}

/// Reads a response body, refusing to buffer more than `limit` bytes.
async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, FetchError> {
    // Fast path: trust a Content-Length that already exceeds the limit.
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Decodes raw feed bytes into the collaborator shape.
///
/// Field mapping from feed-rs:
/// - identity: the entry `id` as-is (empty stays empty; the engine's
///   key-fallback handles it)
/// - link: first non-enclosure link
/// - published: `published`, else `updated`
/// - enclosures: media content URLs plus `rel="enclosure"` links
fn decode(bytes: &[u8]) -> Result<FetchedFeed, FetchError> {
    let parsed = feed_rs::parser::parse(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

    let summary = FeedSummary {
        title: parsed.title.map(|t| t.content).unwrap_or_default(),
        description: parsed.description.map(|t| t.content).unwrap_or_default(),
        link: parsed
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
    };

    let entries = parsed
        .entries
        .into_iter()
        .map(|entry| {
            let mut enclosures: Vec<String> = entry
                .media
                .iter()
                .flat_map(|m| m.content.iter())
                .filter_map(|c| c.url.as_ref().map(|u| u.to_string()))
                .collect();
            enclosures.extend(
                entry
                    .links
                    .iter()
                    .filter(|l| l.rel.as_deref() == Some("enclosure"))
                    .map(|l| l.href.clone()),
            );

            let link = entry
                .links
                .iter()
                .find(|l| l.rel.as_deref() != Some("enclosure"))
                .map(|l| l.href.clone())
                .unwrap_or_default();

            Entry {
                guid: entry.id,
                link,
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                description: entry.summary.map(|t| t.content).unwrap_or_default(),
                content: entry.content.and_then(|c| c.body).unwrap_or_default(),
                published: entry.published.or(entry.updated),
                enclosures,
            }
        })
        .collect();

    Ok(FetchedFeed { summary, entries })
}
