//! User-visible strings and list decorations.
//!
//! Kept as compile-time constants in one place so the presentation layer and
//! the engine agree on wording without any process-wide mutable state.

/// Status line for a feed that has never been fetched successfully.
pub const FEED_NOT_LOADED: &str = "Feed not loaded yet";

/// Prefix rendered before the title of an unread item or a feed with
/// unread items.
pub const UNREAD_MARK: &str = "+";

/// Prefix rendered before the title of a bookmarked item.
pub const BOOKMARK_MARK: &str = "*";

/// Bucket label for feeds whose config entry carries no category.
pub const UNCATEGORIZED: &str = "Uncategorized";
