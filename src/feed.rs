//! One subscribed source and the merge/sort/navigation algorithms over its
//! own items.
//!
//! A [`Feed`] owns its entire local state: identity (URL), the user-assigned
//! category, the last fetch error, the upstream summary, and the append-only
//! item sequence. The merge algorithm is the heart of the engine: it is what
//! lets a refresh run any number of times without duplicating items or
//! touching read flags the user already set.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::item::{Entry, Item};
use crate::messages;
use crate::source::FetchedFeed;
use crate::util::clean;

/// Upstream metadata for a feed, absent until the first successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedSummary {
    pub title: String,
    pub description: String,
    pub link: String,
}

/// A subscribed feed: URL, category, last fetch status, and owned items.
///
/// Invariants maintained by [`Feed::apply`]:
/// - no two items share an identity key
/// - items are in descending publish-time order, undated items last,
///   ties and undated runs in stable (insertion) order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub url: String,
    pub category: String,
    /// Last fetch error; empty string means the last fetch succeeded (or no
    /// fetch has happened yet).
    #[serde(default)]
    pub error: String,
    pub summary: Option<FeedSummary>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Feed {
    /// A feed as materialized from configuration: URL and category only.
    pub fn new(url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// Applies a successful fetch: replaces the summary, merges the new
    /// entries, re-sorts, and clears the error. Returns the number of items
    /// created by the merge.
    pub fn apply(&mut self, fetched: FetchedFeed) -> usize {
        self.summary = Some(fetched.summary);
        let added = self.merge(fetched.entries);
        self.sort_by_date();
        self.error.clear();
        added
    }

    /// Records a failed fetch. Items and summary stay untouched so the user
    /// keeps whatever state the last successful fetch produced.
    pub fn record_error(&mut self, err: &impl std::fmt::Display) {
        self.error = err.to_string();
    }

    /// Merges newly fetched entries into the item sequence.
    ///
    /// Entries whose identity key is already present (from an earlier fetch
    /// or earlier in this batch) are discarded; the rest are appended as
    /// unread items. Existing items are never recreated or mutated, which is
    /// what preserves read/bookmark state across refreshes and retains items
    /// that have rolled off the upstream feed.
    fn merge(&mut self, entries: Vec<Entry>) -> usize {
        let mut existing: HashSet<String> =
            self.items.iter().map(|i| i.key().to_owned()).collect();

        let mut added = 0;
        for entry in entries {
            let item = Item::new(entry);
            if existing.contains(item.key()) {
                continue;
            }
            existing.insert(item.key().to_owned());
            self.items.push(item);
            added += 1;
        }
        added
    }

    /// Sorts items newest-first. Undated items sort after all dated ones;
    /// the sort is stable, so ties and undated runs keep insertion order.
    pub fn sort_by_date(&mut self) {
        self.items
            .sort_by(|a, b| match (a.entry.published, b.entry.published) {
                (Some(ta), Some(tb)) => tb.cmp(&ta),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
    }

    pub fn has_unread(&self) -> bool {
        self.items.iter().any(|i| !i.read)
    }

    /// Idempotent; a fully-read feed is left as is.
    pub fn mark_all_read(&mut self) {
        for item in &mut self.items {
            item.read = true;
        }
    }

    /// Sanitized feed title (the URL until the first successful fetch),
    /// decorated with the unread mark when unread items exist.
    pub fn title(&self) -> String {
        let title = match &self.summary {
            Some(s) if !s.title.is_empty() => clean(&s.title),
            _ => self.url.clone(),
        };

        if self.has_unread() {
            format!("{} {}", messages::UNREAD_MARK, title)
        } else {
            title
        }
    }

    /// Sanitized upstream description; empty before the first fetch.
    pub fn description(&self) -> String {
        match &self.summary {
            Some(s) => clean(&s.description),
            None => String::new(),
        }
    }

    /// One-line status for the feed row. Precedence, highest first: the
    /// stored fetch error; the title of the unread item found scanning from
    /// the end of the sequence (else the newest item when all are read); the
    /// upstream description; the not-loaded sentinel.
    pub fn latest(&self) -> String {
        if !self.error.is_empty() {
            return self.error.clone();
        }
        if !self.items.is_empty() {
            let mut pick = &self.items[0];
            for item in self.items.iter().rev() {
                if !item.read {
                    pick = item;
                }
            }
            return clean(&pick.entry.title);
        }
        if self.summary.is_some() {
            return self.description();
        }
        messages::FEED_NOT_LOADED.to_string()
    }

    /// Position of an item in the sequence, matched by identity key.
    pub fn position_of(&self, item: &Item) -> Option<usize> {
        self.items.iter().position(|i| i.key() == item.key())
    }

    /// The item after `current` in sequence order, or None when `current` is
    /// last or not a member.
    pub fn next_after(&self, current: &Item) -> Option<(usize, &Item)> {
        let pos = self.position_of(current)?;
        let next = pos.checked_add(1)?;
        self.items.get(next).map(|i| (next, i))
    }

    /// The item before `current` in sequence order, or None when `current`
    /// is first or not a member.
    pub fn prev_before(&self, current: &Item) -> Option<(usize, &Item)> {
        let pos = self.position_of(current)?;
        let prev = pos.checked_sub(1)?;
        self.items.get(prev).map(|i| (prev, i))
    }

    /// First unread item strictly after `from` (from the start when `from`
    /// is None or not a member), with its position for cursor placement.
    pub fn next_unread(&self, from: Option<&Item>) -> Option<(usize, &Item)> {
        let start = match from.and_then(|i| self.position_of(i)) {
            Some(pos) => pos + 1,
            None => 0,
        };
        self.items
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, i)| !i.read)
    }

    /// First unread item strictly before `from` (from the end when `from` is
    /// None or not a member), scanning backwards.
    pub fn prev_unread(&self, from: Option<&Item>) -> Option<(usize, &Item)> {
        let end = match from.and_then(|i| self.position_of(i)) {
            Some(pos) => pos,
            None => self.items.len(),
        };
        self.items[..end]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, i)| !i.read)
    }
}

/// Shared handle to a feed.
///
/// The refresh orchestrator, the list indices, and a rendering layer all
/// reference the same feed; `Arc<RwLock>` mirrors that sharing. Locks are
/// held only for in-memory work, never across an await. A poisoned lock is
/// recovered rather than propagated: feed state has no invariants a panicked
/// reader could have broken mid-write that the next fetch would not repair.
#[derive(Debug, Clone)]
pub struct FeedHandle(Arc<RwLock<Feed>>);

impl FeedHandle {
    pub fn new(feed: Feed) -> Self {
        Self(Arc::new(RwLock::new(feed)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Feed> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Feed> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The feed's URL, cloned out so no lock is held by the caller.
    pub fn url(&self) -> String {
        self.read().url.clone()
    }

    /// True when both handles point at the same underlying feed.
    pub fn same_feed(&self, other: &FeedHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
