//! Plain-text rendering of feed-supplied HTML.
//!
//! Feeds routinely ship HTML fragments in titles and descriptions. List rows
//! are single-line, so everything funnels through [`clean`]: tags stripped,
//! entities decoded, whitespace collapsed to single spaces.

use html2text::render::text_renderer::TrivialDecorator;

/// Render width handed to html2text. Irrelevant for the final output since
/// line breaks are collapsed afterwards, but must be wide enough that words
/// are not hyphenated mid-token.
const RENDER_WIDTH: usize = 200;

/// Strips markup from a feed-supplied string and normalizes whitespace.
///
/// The result is a single line: no tags, no entities, no newlines, runs of
/// whitespace folded to one space, leading/trailing whitespace removed.
/// `TrivialDecorator` keeps the output free of link footnotes and emphasis
/// markers; if rendering fails the input is passed through unsanitized
/// rather than dropped.
pub fn clean(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let rendered = html2text::config::with_decorator(TrivialDecorator::new())
        .string_from_read(input.as_bytes(), RENDER_WIDTH)
        .unwrap_or_else(|_| input.to_string());
    normalize_spaces(&rendered)
}

/// Collapses all whitespace (including CR/LF) into single spaces.
pub fn normalize_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
