//! One capability interface for the two list-row variants.
//!
//! A presentation layer shows two kinds of rows — a feed in the feed list,
//! an item inside a feed — through the same three operations. No inheritance
//! needed: two small types, one trait.

use crate::feed::Feed;
use crate::item::Item;

/// What a list renderer needs from a row: a title line, a description line,
/// and the text its substring filter should match against.
pub trait ListRow {
    fn row_title(&self) -> String;
    fn row_description(&self) -> String;
    fn filter_text(&self) -> String {
        format!("{} {}", self.row_title(), self.row_description())
    }
}

impl ListRow for Feed {
    fn row_title(&self) -> String {
        self.title()
    }

    fn row_description(&self) -> String {
        self.latest()
    }
}

impl ListRow for Item {
    fn row_title(&self) -> String {
        self.title()
    }

    fn row_description(&self) -> String {
        self.description()
    }
}
