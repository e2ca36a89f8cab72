//! Durable persistence: serialize the whole list, restore it by merging
//! state back into a freshly config-loaded list.
//!
//! The snapshot is plain JSON over byte sinks/sources; where the bytes live
//! is the caller's concern. The merge direction matters: the config is the
//! source of truth for *which* feeds exist, the snapshot only for their
//! *state*. Restore decodes the entire stream before touching anything, so
//! a corrupt snapshot can never leave the live list half-overwritten.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::Feed;
use crate::list::FeedList;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot stream is structurally invalid. The live list is
    /// guaranteed untouched when this is returned.
    #[error("cache is not a valid snapshot: {0}")]
    Decode(#[from] serde_json::Error),
}

/// On-disk shape: every feed with every item and flag.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    feeds: Vec<Feed>,
}

impl FeedList {
    /// Serializes the full list — every feed, item, and flag — losslessly.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            feeds: self.feeds().iter().map(|h| h.read().clone()).collect(),
        };
        serde_json::to_writer(writer, &snapshot)?;
        Ok(())
    }

    /// Restores a snapshot into this (config-loaded) list, merging by URL.
    ///
    /// For each decoded feed with a live counterpart, the live feed takes the
    /// snapshot's error, summary and item sequence (read and bookmark flags
    /// included) while keeping its config-assigned URL and category. Feeds
    /// only in the snapshot are dropped; feeds only in the live config keep
    /// their fresh empty state. An empty snapshot merges nothing and is not
    /// an error.
    pub fn restore<R: Read>(&self, reader: R) -> Result<(), StoreError> {
        let snapshot: Snapshot = serde_json::from_reader(reader)?;

        let mut matched = 0usize;
        let mut dropped = 0usize;
        for decoded in snapshot.feeds {
            match self.feed(&decoded.url) {
                Some(handle) => {
                    let mut live = handle.write();
                    live.error = decoded.error;
                    live.summary = decoded.summary;
                    live.items = decoded.items;
                    matched += 1;
                }
                None => dropped += 1,
            }
        }
        tracing::debug!(matched = matched, dropped = dropped, "Restored cached feed state");
        Ok(())
    }
}
