//! The collection of all subscribed feeds: ordered sequence, URL index,
//! category index, cross-feed navigation and bulk operations.
//!
//! Feed order is config-file order for the life of the run. The indices are
//! built at materialization time and only change through [`FeedList::
//! add_feeds`]; they are structurally immutable while a refresh is in
//! flight, so concurrent readers never race a rebuild.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::feed::{Feed, FeedHandle};
use crate::item::Item;
use crate::messages;
use crate::refresh::{update_feeds, RefreshError, RefreshResult};
use crate::source::FeedSource;

#[derive(Debug, Error)]
pub enum ListError {
    /// Category lookup with an empty name.
    #[error("no category given")]
    NoCategoryGiven,
}

/// All subscribed feeds plus the lookup indices over them.
#[derive(Debug, Default)]
pub struct FeedList {
    feeds: Vec<FeedHandle>,
    url_index: HashMap<String, FeedHandle>,
    // Ordered map so category enumeration is lexicographic for free.
    category_index: BTreeMap<String, Vec<FeedHandle>>,
}

impl FeedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materializes feeds from configuration, in config order. Duplicate
    /// URLs keep the first occurrence; later ones are logged and dropped
    /// (de-duplication lives here, not in [`FeedList::add_feeds`]).
    pub fn from_config(config: &Config) -> Self {
        let mut list = Self::new();
        for (category, urls) in &config.categories {
            for url in urls {
                if list.url_index.contains_key(url) {
                    tracing::warn!(url = %url, category = %category, "Duplicate feed URL in config, keeping first");
                    continue;
                }
                list.add_feeds([Feed::new(url.clone(), category.clone())]);
            }
        }
        tracing::info!(feeds = list.len(), categories = list.category_index.len(), "Materialized feed list");
        list
    }

    /// Appends feeds to the ordered sequence and registers them in both
    /// indices. Feeds with an empty category land in the reserved
    /// "Uncategorized" bucket.
    pub fn add_feeds(&mut self, feeds: impl IntoIterator<Item = Feed>) {
        for feed in feeds {
            let url = feed.url.clone();
            let bucket = if feed.category.is_empty() {
                messages::UNCATEGORIZED.to_string()
            } else {
                feed.category.clone()
            };

            let handle = FeedHandle::new(feed);
            self.url_index.insert(url, handle.clone());
            self.category_index.entry(bucket).or_default().push(handle.clone());
            self.feeds.push(handle);
        }
    }

    pub fn feeds(&self) -> &[FeedHandle] {
        &self.feeds
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Looks a feed up by URL.
    pub fn feed(&self, url: &str) -> Option<FeedHandle> {
        self.url_index.get(url).cloned()
    }

    /// The feeds in one category bucket. An unknown category yields an empty
    /// list; an empty name is an error.
    pub fn category(&self, name: &str) -> Result<Vec<FeedHandle>, ListError> {
        if name.is_empty() {
            return Err(ListError::NoCategoryGiven);
        }
        Ok(self.category_index.get(name).cloned().unwrap_or_default())
    }

    /// Every distinct category label, lexicographically sorted, with empty
    /// labels folded into "Uncategorized". Stable tab ordering falls out of
    /// the ordered index.
    pub fn categories(&self) -> Vec<String> {
        self.category_index.keys().cloned().collect()
    }

    pub fn mark_all_read(&self) {
        for feed in &self.feeds {
            feed.write().mark_all_read();
        }
    }

    /// Next feed with unread items, scanning forward from `from` (or from
    /// the start when `from` is None or absent). Does not wrap.
    pub fn next_unread_feed(&self, from: Option<&FeedHandle>) -> Option<(usize, FeedHandle)> {
        let start = match from.and_then(|f| self.position_of(f)) {
            Some(pos) => pos + 1,
            None => 0,
        };
        self.feeds
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, f)| f.read().has_unread())
            .map(|(i, f)| (i, f.clone()))
    }

    /// Backward counterpart of [`FeedList::next_unread_feed`]; also no wrap.
    pub fn prev_unread_feed(&self, from: Option<&FeedHandle>) -> Option<(usize, FeedHandle)> {
        let end = match from.and_then(|f| self.position_of(f)) {
            Some(pos) => pos,
            None => self.feeds.len(),
        };
        self.feeds[..end]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, f)| f.read().has_unread())
            .map(|(i, f)| (i, f.clone()))
    }

    /// All bookmarked items across all feeds, in list-then-sequence order.
    /// A derived view: bookmarking is a flag on the item, and this projects
    /// the flagged items out on demand.
    pub fn bookmarked(&self) -> Vec<Item> {
        self.feeds
            .iter()
            .flat_map(|f| {
                f.read()
                    .items
                    .iter()
                    .filter(|i| i.bookmark)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Refreshes every feed concurrently; see [`update_feeds`] for the
    /// delivery contract.
    pub fn update_all(
        &self,
        source: Arc<dyn FeedSource>,
    ) -> Result<mpsc::Receiver<RefreshResult>, RefreshError> {
        update_feeds(source, self.feeds.clone())
    }

    fn position_of(&self, handle: &FeedHandle) -> Option<usize> {
        self.feeds.iter().position(|f| f.same_feed(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Entry;

    fn config(pairs: &[(&str, &[&str])]) -> Config {
        Config {
            categories: pairs
                .iter()
                .map(|(c, urls)| {
                    (
                        c.to_string(),
                        urls.iter().map(|u| u.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    fn push_item(feed: &FeedHandle, guid: &str, read: bool) {
        let mut item = Item::new(Entry {
            guid: guid.into(),
            title: guid.into(),
            ..Entry::default()
        });
        item.read = read;
        feed.write().items.push(item);
    }

    #[test]
    fn test_from_config_seven_feeds_two_categories() {
        let urls: Vec<String> = (1..=6).map(|i| format!("https://go.example/{}", i)).collect();
        let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        let cfg = config(&[
            ("golang", &url_refs),
            ("jobs", &["https://jobs.example/feed"]),
        ]);

        let list = FeedList::from_config(&cfg);
        assert_eq!(list.len(), 7);
        assert_eq!(list.categories(), vec!["golang", "jobs"]);

        let golang = list.category("golang").unwrap();
        assert_eq!(golang.len(), 6);
        for feed in &golang {
            assert_eq!(feed.read().category, "golang");
        }
    }

    #[test]
    fn test_from_config_dedups_urls_keeping_first() {
        let cfg = config(&[
            ("a", &["https://x.example/feed"]),
            ("b", &["https://x.example/feed"]),
        ]);
        let list = FeedList::from_config(&cfg);
        assert_eq!(list.len(), 1);
        assert_eq!(list.feeds()[0].read().category, "a");
    }

    #[test]
    fn test_empty_category_lookup_is_error() {
        let list = FeedList::from_config(&config(&[("a", &["https://x.example"])]));
        assert!(matches!(list.category(""), Err(ListError::NoCategoryGiven)));
    }

    #[test]
    fn test_unknown_category_is_empty_not_error() {
        let list = FeedList::from_config(&config(&[("a", &["https://x.example"])]));
        assert!(list.category("nope").unwrap().is_empty());
    }

    #[test]
    fn test_empty_category_folds_into_uncategorized() {
        let mut list = FeedList::new();
        list.add_feeds([Feed::new("https://x.example", ""), Feed::new("https://y.example", "zeta")]);
        assert_eq!(list.categories(), vec!["Uncategorized", "zeta"]);
        assert_eq!(list.category("Uncategorized").unwrap().len(), 1);
    }

    #[test]
    fn test_every_feed_reachable_from_both_indices() {
        let cfg = config(&[
            ("a", &["https://one.example", "https://two.example"]),
            ("b", &["https://three.example"]),
        ]);
        let list = FeedList::from_config(&cfg);

        for handle in list.feeds() {
            let url = handle.url();
            let by_url = list.feed(&url).unwrap();
            assert!(by_url.same_feed(handle));

            let bucket = list.category(&handle.read().category).unwrap();
            assert_eq!(
                bucket.iter().filter(|f| f.same_feed(handle)).count(),
                1,
                "feed must appear in exactly one category bucket slot"
            );
        }
    }

    #[test]
    fn test_mark_all_read_covers_every_feed() {
        let list = FeedList::from_config(&config(&[(
            "a",
            &["https://one.example", "https://two.example"],
        )]));
        for feed in list.feeds() {
            push_item(feed, "x", false);
        }

        list.mark_all_read();
        for feed in list.feeds() {
            assert!(!feed.read().has_unread());
        }
    }

    #[test]
    fn test_next_unread_feed_skips_read_and_does_not_wrap() {
        let list = FeedList::from_config(&config(&[(
            "a",
            &["https://1.example", "https://2.example", "https://3.example"],
        )]));
        let feeds = list.feeds().to_vec();
        push_item(&feeds[0], "a", false);
        push_item(&feeds[1], "b", true);
        push_item(&feeds[2], "c", false);

        let (i, f) = list.next_unread_feed(None).unwrap();
        assert_eq!(i, 0);
        assert!(f.same_feed(&feeds[0]));

        let (i, f) = list.next_unread_feed(Some(&feeds[0])).unwrap();
        assert_eq!(i, 2);
        assert!(f.same_feed(&feeds[2]));

        // No wrap: from the last feed there is nothing ahead.
        assert!(list.next_unread_feed(Some(&feeds[2])).is_none());
    }

    #[test]
    fn test_prev_unread_feed_scans_backward_without_wrap() {
        let list = FeedList::from_config(&config(&[(
            "a",
            &["https://1.example", "https://2.example", "https://3.example"],
        )]));
        let feeds = list.feeds().to_vec();
        push_item(&feeds[0], "a", false);
        push_item(&feeds[1], "b", true);
        push_item(&feeds[2], "c", false);

        let (i, f) = list.prev_unread_feed(None).unwrap();
        assert_eq!(i, 2);
        assert!(f.same_feed(&feeds[2]));

        let (i, f) = list.prev_unread_feed(Some(&feeds[2])).unwrap();
        assert_eq!(i, 0);
        assert!(f.same_feed(&feeds[0]));

        assert!(list.prev_unread_feed(Some(&feeds[0])).is_none());
    }

    #[test]
    fn test_bookmarked_projects_flagged_items() {
        let list = FeedList::from_config(&config(&[(
            "a",
            &["https://1.example", "https://2.example"],
        )]));
        let feeds = list.feeds().to_vec();
        push_item(&feeds[0], "keep", false);
        push_item(&feeds[1], "skip", false);
        feeds[0].write().items[0].toggle_bookmark();

        let marked = list.bookmarked();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].key(), "keep");
    }
}
