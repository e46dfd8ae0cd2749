//! Incremental search over rendered diff lines.
//!
//! [`SearchEngine`] tracks the query and which lines match; [`highlight`]
//! marks occurrences inside escaped lines without changing their width.

mod engine;
pub mod highlight;

pub use engine::SearchEngine;
pub use highlight::{apply_highlight, find_query_ranges, merge_ranges, RuneRange};
