//! Unified diff → paired display rows.

use std::collections::VecDeque;

/// Semantic type of a display row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// Unchanged line, identical on both sides.
    Context,
    /// Line only present on the new side.
    Add,
    /// Line only present on the old side.
    Del,
    /// A deletion paired with the addition that followed it.
    Replace,
    /// `@@ ... @@` hunk header.
    Hunk,
    /// File-level header (`diff --git`, `index`, `---`, `+++`).
    Meta,
}

/// One display line-pair of a file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Old-side text without the diff marker.
    pub left: String,
    /// New-side text without the diff marker.
    pub right: String,
    /// Row kind.
    pub kind: RowKind,
    /// Header text for `Hunk` and `Meta` rows.
    pub meta: String,
}

impl Row {
    fn context(text: &str) -> Self {
        Self {
            left: text.to_string(),
            right: text.to_string(),
            kind: RowKind::Context,
            meta: String::new(),
        }
    }

    fn del(text: &str) -> Self {
        Self {
            left: text.to_string(),
            right: String::new(),
            kind: RowKind::Del,
            meta: String::new(),
        }
    }

    fn add(text: &str) -> Self {
        Self {
            left: String::new(),
            right: text.to_string(),
            kind: RowKind::Add,
            meta: String::new(),
        }
    }

    fn replace(old: &str, new: &str) -> Self {
        Self {
            left: old.to_string(),
            right: new.to_string(),
            kind: RowKind::Replace,
            meta: String::new(),
        }
    }

    fn header(kind: RowKind, line: &str) -> Self {
        Self {
            left: String::new(),
            right: String::new(),
            kind,
            meta: line.to_string(),
        }
    }
}

fn flush(rows: &mut Vec<Row>, pending: &mut VecDeque<&str>) {
    rows.extend(pending.drain(..).map(Row::del));
}

/// Header prefixes recognized anywhere in the input, hunks included.
const META_PREFIXES: [&str; 4] = ["diff --git ", "index ", "--- ", "+++ "];
const HUNK_HEADER: &str = "@@ ";

/// Build display rows from the unified diff of a single file.
///
/// Deletions are buffered and paired first-in first-out with the additions
/// that follow them; leftovers are flushed as `Del` rows at the next context
/// line, header or end of input. This is a local approximation: a hunk that
/// interleaves independent edits can pair unrelated lines.
///
/// Never fails. Header lines become `Meta` rows wherever they appear, so a
/// removed line that reads `-- x` shows as a header. Other lines before the
/// first hunk are ignored, as are unrecognized prefixes such as
/// `\ No newline`.
///
/// # Examples
///
/// ```
/// use diffium::core::{build_rows, RowKind};
///
/// let rows = build_rows("@@ -1 +1 @@\n-old\n+new\n");
/// assert_eq!(rows[1].kind, RowKind::Replace);
/// assert_eq!(rows[1].left, "old");
/// assert_eq!(rows[1].right, "new");
/// ```
#[must_use]
pub fn build_rows(unified: &str) -> Vec<Row> {
    let mut rows = Vec::with_capacity(256);
    let mut pending: VecDeque<&str> = VecDeque::new();
    let mut in_hunk = false;

    for line in unified.lines() {
        if META_PREFIXES.iter().any(|p| line.starts_with(p)) {
            flush(&mut rows, &mut pending);
            rows.push(Row::header(RowKind::Meta, line));
            continue;
        }

        if line.starts_with(HUNK_HEADER) {
            flush(&mut rows, &mut pending);
            rows.push(Row::header(RowKind::Hunk, line));
            in_hunk = true;
            continue;
        }

        if !in_hunk {
            continue;
        }

        let Some(marker) = line.chars().next() else {
            flush(&mut rows, &mut pending);
            rows.push(Row::context(""));
            continue;
        };
        let text = &line[marker.len_utf8()..];

        match marker {
            ' ' => {
                flush(&mut rows, &mut pending);
                rows.push(Row::context(text));
            }
            '-' => pending.push_back(text),
            '+' => match pending.pop_front() {
                Some(old) => rows.push(Row::replace(old, text)),
                None => rows.push(Row::add(text)),
            },
            _ => {}
        }
    }

    flush(&mut rows, &mut pending);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(rows: &[Row]) -> Vec<RowKind> {
        rows.iter().map(|r| r.kind).collect()
    }

    fn count(rows: &[Row], kind: RowKind) -> usize {
        rows.iter().filter(|r| r.kind == kind).count()
    }

    #[test]
    fn simple_replace_and_add() {
        let unified = "diff --git a/a.txt b/a.txt
--- a/a.txt
+++ b/a.txt
@@ -1,3 +1,4 @@
 line1
-line2
+line2 changed
 line3
+line4";

        let rows = build_rows(unified);
        assert_eq!(count(&rows, RowKind::Meta), 3);
        assert_eq!(count(&rows, RowKind::Hunk), 1);
        assert_eq!(count(&rows, RowKind::Replace), 1);
        assert_eq!(count(&rows, RowKind::Add), 1);
        assert_eq!(count(&rows, RowKind::Context), 2);

        let replace = rows.iter().find(|r| r.kind == RowKind::Replace).unwrap();
        assert_eq!(replace.left, "line2");
        assert_eq!(replace.right, "line2 changed");
    }

    #[test]
    fn deletion_only_hunk() {
        let rows = build_rows("@@ -1,2 +0,0 @@\n-old1\n-old2");
        assert_eq!(kinds(&rows), vec![RowKind::Hunk, RowKind::Del, RowKind::Del]);
        assert_eq!(rows[1].left, "old1");
        assert_eq!(rows[2].left, "old2");
    }

    #[test]
    fn more_additions_than_deletions() {
        let rows = build_rows("@@ -1,2 +1,3 @@\n-a\n-b\n+x\n+y\n+z");
        assert_eq!(
            kinds(&rows),
            vec![
                RowKind::Hunk,
                RowKind::Replace,
                RowKind::Replace,
                RowKind::Add
            ]
        );
        assert_eq!((rows[1].left.as_str(), rows[1].right.as_str()), ("a", "x"));
        assert_eq!((rows[2].left.as_str(), rows[2].right.as_str()), ("b", "y"));
    }

    #[test]
    fn interleaved_edits_pair_fifo() {
        let rows = build_rows("@@ -1,2 +1,2 @@\n-a\n+x\n-b\n+y");
        assert_eq!(count(&rows, RowKind::Replace), 2);
        assert_eq!(rows[2].left, "b");
        assert_eq!(rows[2].right, "y");
    }

    #[test]
    fn leftover_deletions_flush_at_context() {
        let rows = build_rows("@@ -1,3 +1,2 @@\n-a\n-b\n+x\n same");
        assert_eq!(
            kinds(&rows),
            vec![
                RowKind::Hunk,
                RowKind::Replace,
                RowKind::Del,
                RowKind::Context
            ]
        );
        assert_eq!(rows[2].left, "b");
    }

    #[test]
    fn leftover_deletions_flush_at_next_hunk() {
        let rows = build_rows("@@ -1 +0,0 @@\n-a\n@@ -5 +4 @@\n ctx");
        assert_eq!(
            kinds(&rows),
            vec![RowKind::Hunk, RowKind::Del, RowKind::Hunk, RowKind::Context]
        );
    }

    #[test]
    fn blank_line_in_hunk_is_empty_context() {
        let rows = build_rows("@@ -1,2 +1,2 @@\n\n ctx");
        assert_eq!(rows[1], Row::context(""));
    }

    #[test]
    fn content_before_hunk_is_ignored() {
        let rows = build_rows("similarity index 90%\n+stray\n@@ -1 +1 @@\n+real");
        assert_eq!(kinds(&rows), vec![RowKind::Hunk, RowKind::Add]);
        assert_eq!(rows[1].right, "real");
    }

    #[test]
    fn header_prefixes_inside_hunk_are_meta() {
        let rows = build_rows("@@ -1,2 +1,2 @@\n-gone\n--- a/x\n+++ b/x\nindex 1..2");
        assert_eq!(
            kinds(&rows),
            vec![
                RowKind::Hunk,
                RowKind::Del,
                RowKind::Meta,
                RowKind::Meta,
                RowKind::Meta
            ]
        );
        assert_eq!(rows[2].meta, "--- a/x");
        assert_eq!(rows[3].meta, "+++ b/x");
    }

    #[test]
    fn hunk_header_needs_trailing_space() {
        let rows = build_rows("@@@ -1 +1 @@@\n+x\n@@ -1 +1 @@\n+y");
        assert_eq!(kinds(&rows), vec![RowKind::Hunk, RowKind::Add]);
        assert_eq!(rows[1].right, "y");
    }

    #[test]
    fn unknown_prefixes_are_skipped() {
        let rows = build_rows("@@ -1 +1 @@\n-a\n\\ No newline at end of file\n+b");
        assert_eq!(kinds(&rows), vec![RowKind::Hunk, RowKind::Replace]);
    }

    #[test]
    fn hunk_row_keeps_header_text() {
        let rows = build_rows("@@ -10,2 +10,3 @@ fn main() {");
        assert_eq!(rows[0].meta, "@@ -10,2 +10,3 @@ fn main() {");
    }

    #[test]
    fn empty_input() {
        assert!(build_rows("").is_empty());
    }
}
