//! skiff — a personal feed aggregator engine.
//!
//! The engine fetches syndication feeds, merges new items into locally
//! persisted read/bookmark state, organizes feeds into categories, and
//! exposes the navigation primitives a presentation layer needs. Rendering,
//! key handling and feed-format details live elsewhere: the wire format is
//! behind [`source::FeedSource`], display text behind [`util::clean`].
//!
//! Typical cycle:
//!
//! ```ignore
//! let config = Config::load(&config_path)?;
//! let list = FeedList::from_config(&config);
//! list.restore(File::open(&cache_path)?)?;          // first run: skip
//! let mut rx = list.update_all(Arc::new(HttpSource::new()))?;
//! while let Some(done) = rx.recv().await { /* per-feed feedback */ }
//! list.save(File::create(&cache_path)?)?;
//! ```

pub mod config;
pub mod feed;
pub mod item;
pub mod list;
pub mod messages;
pub mod refresh;
pub mod rows;
pub mod source;
pub mod store;
pub mod util;

pub use config::{Config, ConfigError};
pub use feed::{Feed, FeedHandle, FeedSummary};
pub use item::{Entry, Item};
pub use list::{FeedList, ListError};
pub use refresh::{refresh_feed, update_feeds, RefreshError, RefreshResult};
pub use rows::ListRow;
pub use source::{FeedSource, FetchError, FetchedFeed, HttpSource};
pub use store::StoreError;
