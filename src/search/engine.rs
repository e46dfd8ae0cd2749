use std::borrow::Cow;

use super::highlight::{apply_highlight, find_query_ranges};
use crate::core::strip;

/// Search session over a list of rendered lines.
///
/// Matches are always derived from the query and the current content and
/// are recomputed whenever either changes.
#[derive(Debug, Default, Clone)]
pub struct SearchEngine {
    query: String,
    matches: Vec<usize>,
    index: usize,
    active: bool,
    content: Vec<String>,
}

impl SearchEngine {
    /// Inactive engine with an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the search input. The previous query is kept and rescanned.
    pub fn activate(&mut self) {
        self.active = true;
        self.index = 0;
        self.recompute();
    }

    /// Close the search input. Query and matches stay for `n`/`N`.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Whether the search input is open.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replace the query and rescan from the first match.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.index = 0;
        self.recompute();
    }

    /// Append a character to the query.
    pub fn push_char(&mut self, c: char) {
        let mut q = std::mem::take(&mut self.query);
        q.push(c);
        self.set_query(q);
    }

    /// Delete the last character of the query.
    pub fn pop_char(&mut self) {
        let mut q = std::mem::take(&mut self.query);
        q.pop();
        self.set_query(q);
    }

    /// Replace the searched lines. The current match index is kept when it
    /// is still in range.
    pub fn set_content(&mut self, lines: Vec<String>) {
        self.content = lines;
        self.recompute();
    }

    /// Searched lines, unhighlighted.
    pub fn content(&self) -> &[String] {
        &self.content
    }

    fn recompute(&mut self) {
        if self.query.is_empty() {
            self.matches.clear();
            self.index = 0;
            return;
        }
        let needle = self.query.to_lowercase();
        self.matches = self
            .content
            .iter()
            .enumerate()
            .filter(|(_, line)| strip(line).to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        if self.index >= self.matches.len() {
            self.index = 0;
        }
    }

    /// Advance to the next match, wrapping around.
    pub fn next(&mut self) {
        if !self.matches.is_empty() {
            self.index = (self.index + 1) % self.matches.len();
        }
    }

    /// Go back to the previous match, wrapping around.
    pub fn previous(&mut self) {
        if !self.matches.is_empty() {
            self.index = (self.index + self.matches.len() - 1) % self.matches.len();
        }
    }

    /// Line indices that contain the query.
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    /// Number of matching lines.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Zero-based position of the current match in [`Self::matches`].
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Line index of the current match.
    pub fn current_line(&self) -> Option<usize> {
        self.matches.get(self.index).copied()
    }

    /// Line `idx` of the content with matches marked.
    pub fn highlighted(&self, idx: usize) -> Option<Cow<'_, str>> {
        let line = self.content.get(idx)?;
        if self.query.is_empty() || self.matches.binary_search(&idx).is_err() {
            return Some(Cow::Borrowed(line));
        }
        let ranges = find_query_ranges(line, &self.query);
        if ranges.is_empty() {
            return Some(Cow::Borrowed(line));
        }
        let current = self.current_line() == Some(idx);
        Some(Cow::Owned(apply_highlight(line, &ranges, current)))
    }

    /// Status line for the overlay.
    pub fn status(&self) -> String {
        if self.query.is_empty() {
            "Type to search (esc: close, enter: finish typing)".to_string()
        } else if self.matches.is_empty() {
            "No matches (esc: close)".to_string()
        } else {
            format!(
                "Match {} of {}  (Enter/↓: next, ↑: prev, Esc: close)",
                self.index + 1,
                self.matches.len()
            )
        }
    }
}
