//! Match highlighting inside escaped lines.

use crate::core::{is_reset, strip, tokens, Token};

/// Marker opening an ordinary match: black on bright white.
pub const MATCH_START: &str = "\x1b[30;107m";
/// Marker opening the current match: black on yellow.
pub const CURRENT_MATCH_START: &str = "\x1b[30;43m";
/// Marker closing a match.
pub const MATCH_END: &str = "\x1b[0m";

/// Half-open rune interval `[start, end)` into a stripped line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RuneRange {
    /// First rune inside the range.
    pub start: usize,
    /// First rune past the range.
    pub end: usize,
}

impl RuneRange {
    /// New range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

fn fold(c: char) -> char {
    // Keep one rune per rune so positions line up with the stripped text.
    c.to_lowercase().next().unwrap_or(c)
}

/// Every case-insensitive occurrence of `query` in the stripped form of
/// `line`, merged.
#[must_use]
pub fn find_query_ranges(line: &str, query: &str) -> Vec<RuneRange> {
    let hay: Vec<char> = strip(line).chars().map(fold).collect();
    let needle: Vec<char> = query.chars().map(fold).collect();
    if needle.is_empty() || needle.len() > hay.len() {
        return Vec::new();
    }

    let ranges = hay
        .windows(needle.len())
        .enumerate()
        .filter(|(_, w)| *w == needle.as_slice())
        .map(|(i, _)| RuneRange::new(i, i + needle.len()))
        .collect();
    merge_ranges(ranges)
}

/// Sort and merge overlapping or touching ranges.
#[must_use]
pub fn merge_ranges(mut ranges: Vec<RuneRange>) -> Vec<RuneRange> {
    if ranges.len() <= 1 {
        return ranges;
    }
    ranges.sort();

    let mut merged: Vec<RuneRange> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match merged.last_mut() {
            Some(cur) if r.start <= cur.end => cur.end = cur.end.max(r.end),
            _ => merged.push(r),
        }
    }
    merged
}

/// Wrap the runes covered by `ranges` in match markers.
///
/// Existing escapes are copied through verbatim. When a match closes, the
/// styling that was active before it is re-emitted, and an escape met inside
/// a match is followed by the match marker again, so the markers nest inside
/// any pre-existing styling. Visual width is unchanged.
#[must_use]
pub fn apply_highlight(line: &str, ranges: &[RuneRange], current: bool) -> String {
    if ranges.is_empty() {
        return line.to_string();
    }
    let start_seq = if current {
        CURRENT_MATCH_START
    } else {
        MATCH_START
    };

    let mut out = String::with_capacity(line.len() + ranges.len() * 16);
    let mut active: Vec<&str> = Vec::new();
    let mut next = 0usize;
    let mut in_match = false;
    let mut pos = 0usize;

    for tok in tokens(line) {
        match tok {
            Token::Escape(seq) => {
                out.push_str(seq);
                if is_reset(seq) {
                    active.clear();
                } else {
                    active.push(seq);
                }
                if in_match {
                    out.push_str(start_seq);
                }
            }
            Token::Char(ch) => {
                if in_match && pos >= ranges[next].end {
                    out.push_str(MATCH_END);
                    active.iter().for_each(|s| out.push_str(s));
                    in_match = false;
                    next += 1;
                }
                while !in_match && next < ranges.len() && pos >= ranges[next].end {
                    next += 1;
                }
                if !in_match && next < ranges.len() && pos == ranges[next].start {
                    out.push_str(start_seq);
                    in_match = true;
                }
                out.push(ch);
                pos += 1;
            }
        }
    }

    if in_match {
        out.push_str(MATCH_END);
        active.iter().for_each(|s| out.push_str(s));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::visual_width;

    #[test]
    fn finds_case_insensitive_occurrences() {
        let ranges = find_query_ranges("Foo foo FOO", "foo");
        assert_eq!(
            ranges,
            vec![
                RuneRange::new(0, 3),
                RuneRange::new(4, 7),
                RuneRange::new(8, 11)
            ]
        );
    }

    #[test]
    fn overlapping_occurrences_merge() {
        assert_eq!(find_query_ranges("aaaa", "aa"), vec![RuneRange::new(0, 4)]);
    }

    #[test]
    fn ranges_use_stripped_positions() {
        let line = "\x1b[31mab\x1b[0mcd";
        assert_eq!(find_query_ranges(line, "bc"), vec![RuneRange::new(1, 3)]);
    }

    #[test]
    fn empty_or_long_query_finds_nothing() {
        assert!(find_query_ranges("abc", "").is_empty());
        assert!(find_query_ranges("ab", "abc").is_empty());
    }

    #[test]
    fn merge_adjacent_and_unsorted() {
        let merged = merge_ranges(vec![
            RuneRange::new(5, 7),
            RuneRange::new(0, 2),
            RuneRange::new(2, 3),
        ]);
        assert_eq!(merged, vec![RuneRange::new(0, 3), RuneRange::new(5, 7)]);
    }

    #[test]
    fn highlight_plain_line() {
        let out = apply_highlight("hello world", &[RuneRange::new(6, 11)], false);
        assert_eq!(out, format!("hello {MATCH_START}world{MATCH_END}"));
    }

    #[test]
    fn highlight_current_uses_distinct_marker() {
        let out = apply_highlight("abc", &[RuneRange::new(0, 1)], true);
        assert_eq!(out, format!("{CURRENT_MATCH_START}a{MATCH_END}bc"));
    }

    #[test]
    fn highlight_restores_outer_style() {
        let line = "\x1b[32mgreen text\x1b[0m";
        let out = apply_highlight(line, &[RuneRange::new(0, 5)], false);
        assert_eq!(
            out,
            format!("\x1b[32m{MATCH_START}green{MATCH_END}\x1b[32m text\x1b[0m")
        );
        assert_eq!(visual_width(&out), visual_width(line));
    }

    #[test]
    fn highlight_survives_inner_reset() {
        let line = "ab\x1b[0mcd";
        let out = apply_highlight(line, &[RuneRange::new(1, 3)], false);
        assert_eq!(
            out,
            format!("a{MATCH_START}b\x1b[0m{MATCH_START}c{MATCH_END}d")
        );
    }
}
