//! Concurrent refresh: fan a fetch-and-merge out over many feeds, report
//! each completion independently, close the result stream exactly once.
//!
//! One task per feed, results delivered over a channel sized to the feed
//! count so no producer ever blocks on a slow consumer. The channel closes
//! when the last task's sender drops; draining until `recv` returns `None`
//! is the completion signal. Results arrive in completion order — consumers
//! that need per-feed feedback must match by feed identity, not position.
//!
//! Background tasks never touch shared display state: they emit immutable
//! results onto the channel and mutate only their own feed, which they hold
//! exclusively for the in-memory merge.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::feed::FeedHandle;
use crate::source::{FeedSource, FetchError};

#[derive(Debug, Error)]
pub enum RefreshError {
    /// A refresh was requested over an empty feed set; nothing was started.
    #[error("no feeds to refresh")]
    NoFeeds,
}

/// Outcome of one feed's refresh. The handle identifies the feed; the
/// payload is the new-item count or the fetch error (which is also recorded
/// on the feed itself).
#[derive(Debug)]
pub struct RefreshResult {
    pub feed: FeedHandle,
    pub result: Result<usize, FetchError>,
}

impl RefreshResult {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fetches one feed and merges the result into it.
///
/// The write lock is taken only after the network call completes, so a
/// rendering layer can keep reading the feed while the fetch is in flight.
/// An empty URL fails without touching any state.
pub async fn refresh_feed(
    feed: &FeedHandle,
    source: &dyn FeedSource,
) -> Result<usize, FetchError> {
    let url = feed.url();
    if url.is_empty() {
        return Err(FetchError::NoUrl);
    }

    match source.fetch(&url).await {
        Ok(fetched) => {
            let added = feed.write().apply(fetched);
            tracing::debug!(url = %url, added = added, "Feed refreshed");
            Ok(added)
        }
        Err(e) => {
            feed.write().record_error(&e);
            tracing::debug!(url = %url, error = %e, "Feed refresh failed");
            Err(e)
        }
    }
}

/// Refreshes an arbitrary set of feeds concurrently.
///
/// Spawns exactly one task per feed and returns the result channel
/// immediately; the caller drains it to observe completions. One feed's
/// failure never aborts its siblings. There is no cancellation: a caller
/// that stops draining simply abandons the in-flight tasks, which finish
/// (or deliver into the buffered channel) on their own.
pub fn update_feeds(
    source: Arc<dyn FeedSource>,
    feeds: Vec<FeedHandle>,
) -> Result<mpsc::Receiver<RefreshResult>, RefreshError> {
    if feeds.is_empty() {
        return Err(RefreshError::NoFeeds);
    }

    let (tx, rx) = mpsc::channel(feeds.len());
    for feed in feeds {
        let tx = tx.clone();
        let source = Arc::clone(&source);
        tokio::spawn(async move {
            let result = refresh_feed(&feed, source.as_ref()).await;
            // Receiver dropped means the caller gave up on this refresh;
            // the feed itself was already updated above.
            let _ = tx.send(RefreshResult { feed, result }).await;
        });
    }
    // All remaining senders live in the spawned tasks; the channel closes
    // when the last one completes.
    drop(tx);

    Ok(rx)
}
