//! Width and styling properties of the escape-aware text helpers.

use diffium::core::{pad, slice, strip, truncate, visual_width, wrap};
use diffium::search::{apply_highlight, find_query_ranges};
use proptest::prelude::*;

/// Text interleaved with SGR sequences, including resets.
fn styled() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        4 => "[a-zA-Z0-9 äé→]{1,6}",
        1 => Just("\x1b[31m".to_string()),
        1 => Just("\x1b[1;34m".to_string()),
        1 => Just("\x1b[0m".to_string()),
    ];
    prop::collection::vec(segment, 0..12).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn slice_takes_the_requested_columns(s in styled(), start in 0usize..40, width in 0usize..40) {
        let out = slice(&s, start, width);
        let expected: String = strip(&s).chars().skip(start).take(width).collect();
        prop_assert_eq!(visual_width(&out), expected.chars().count());
        prop_assert_eq!(strip(&out), expected);
    }

    #[test]
    fn pad_reaches_width_without_losing_text(s in styled(), width in 0usize..60) {
        let out = pad(&s, width);
        prop_assert_eq!(visual_width(&out), visual_width(&s).max(width));
        prop_assert!(strip(&out).starts_with(&strip(&s)));
    }

    #[test]
    fn truncate_never_exceeds_width(s in styled(), width in 0usize..30) {
        let out = truncate(&s, width, "…");
        prop_assert!(visual_width(&out) <= width);
        if visual_width(&s) <= width {
            prop_assert_eq!(out, s);
        }
    }

    #[test]
    fn wrap_splits_without_dropping_text(s in styled(), width in 1usize..20) {
        let lines = wrap(&s, width);
        prop_assert!(!lines.is_empty());
        for line in &lines {
            prop_assert!(visual_width(line) <= width);
        }
        let joined: String = lines.iter().map(|l| strip(l)).collect();
        prop_assert_eq!(joined, strip(&s));
    }

    #[test]
    fn highlight_keeps_visible_text(s in styled(), from in 0usize..20, len in 1usize..5, current: bool) {
        let plain = strip(&s);
        let query: String = plain.chars().skip(from).take(len).collect();
        let ranges = find_query_ranges(&s, &query);
        if !query.is_empty() {
            prop_assert!(!ranges.is_empty());
        }
        let out = apply_highlight(&s, &ranges, current);
        prop_assert_eq!(strip(&out), plain);
        prop_assert_eq!(visual_width(&out), visual_width(&s));
    }
}
