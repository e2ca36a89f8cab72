//! Small shared utilities.

mod text;

pub use text::{clean, normalize_spaces};
