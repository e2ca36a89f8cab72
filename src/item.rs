//! A single feed entry plus the locally-owned read/bookmark state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::messages;
use crate::util::clean;

/// One entry as surfaced by the feed-parsing collaborator.
///
/// The engine imposes no wire-format constraint beyond this shape; RSS, Atom
/// or JSON Feed all reduce to it. Every field survives the cache round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub guid: String,
    pub link: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub enclosures: Vec<String>,
}

/// A feed entry with local state layered on top.
///
/// Created once per unique identity the first time the entry is observed in a
/// fetch response; mutated only by explicit user actions, never by a later
/// fetch; never deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub entry: Entry,
    pub read: bool,
    #[serde(default)]
    pub bookmark: bool,
}

impl Item {
    /// Wraps a freshly fetched entry; new items always start unread.
    pub fn new(entry: Entry) -> Self {
        Self {
            entry,
            read: false,
            bookmark: false,
        }
    }

    /// Identity key used for de-duplication across fetches: the GUID when
    /// non-empty, otherwise the link. Both empty yields the degenerate `""`
    /// key, under which all such entries collapse to one item.
    pub fn key(&self) -> &str {
        if self.entry.guid.is_empty() {
            &self.entry.link
        } else {
            &self.entry.guid
        }
    }

    /// The link to open for this item, falling back to the first enclosure
    /// URL (podcast-style feeds often carry no `<link>`).
    pub fn link(&self) -> &str {
        if !self.entry.link.is_empty() {
            return &self.entry.link;
        }
        self.entry
            .enclosures
            .first()
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Sanitized title, decorated with the bookmark and unread marks.
    pub fn title(&self) -> String {
        let mut title = clean(&self.entry.title);
        if self.bookmark {
            title = format!("{} {}", messages::BOOKMARK_MARK, title);
        }
        if !self.read {
            title = format!("{} {}", messages::UNREAD_MARK, title);
        }
        title
    }

    /// Sanitized description, falling back to the content body when the
    /// description is empty.
    pub fn description(&self) -> String {
        clean(self.body())
    }

    /// Raw body text: the description, else the content.
    pub fn body(&self) -> &str {
        if self.entry.description.is_empty() {
            &self.entry.content
        } else {
            &self.entry.description
        }
    }

    pub fn toggle_read(&mut self) {
        self.read = !self.read;
    }

    /// Idempotent; marking an already-read item is a no-op.
    pub fn mark_read(&mut self) {
        self.read = true;
    }

    pub fn toggle_bookmark(&mut self) {
        self.bookmark = !self.bookmark;
    }
}
