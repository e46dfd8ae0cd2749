//! Escape-aware terminal text.
//!
//! Every string handled by the renderer may carry embedded control sequences
//! (SGR colors, OSC hyperlinks, ...). These sequences occupy zero columns, so
//! byte length and rune count both overstate the visual width. The helpers here
//! operate on a token stream of `(escape | rune)` and never split a sequence.
//!
//! - `CSI`: `ESC [` ... final byte in `0x40..=0x7e`
//! - `OSC`: `ESC ]` ... `BEL`
//! - `DCS`/`SOS`/`PM`/`APC`: `ESC P|X|^|_` ... `ESC` (plus an optional `\`)
//! - anything else: `ESC` and the following character
//!
//! Width is measured in runes, one column per visible `char`.

use std::borrow::Cow;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// Tab stop width used when expanding raw diff text.
pub const TAB_WIDTH: usize = 4;

/// One unit of an escaped string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A complete control sequence, zero columns wide.
    Escape(&'a str),
    /// A visible rune, one column wide.
    Char(char),
}

/// Return the byte index just past the escape sequence starting at `start`.
///
/// `start` must point at an `ESC` byte. Unterminated sequences run to the end
/// of the input; a lone trailing `ESC` is a one-byte sequence.
#[must_use]
pub fn consume_escape(s: &str, start: usize) -> usize {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut j = start + 1;
    let Some(&kind) = bytes.get(j) else {
        return len;
    };

    match kind {
        b'[' => {
            j += 1;
            while j < len {
                let c = bytes[j];
                j += 1;
                if (0x40..=0x7e).contains(&c) {
                    break;
                }
            }
        }
        b']' => {
            j += 1;
            while j < len && bytes[j] != BEL {
                j += 1;
            }
            if j < len {
                j += 1;
            }
        }
        b'P' | b'X' | b'^' | b'_' => {
            j += 1;
            while j < len {
                let c = bytes[j];
                j += 1;
                if c == ESC {
                    if bytes.get(j) == Some(&b'\\') {
                        j += 1;
                    }
                    break;
                }
            }
        }
        _ => {
            j += s[j..].chars().next().map_or(1, char::len_utf8);
        }
    }

    j
}

/// Iterator over the tokens of an escaped string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let ch = self.s[self.pos..].chars().next()?;
        if ch == '\x1b' {
            let end = consume_escape(self.s, self.pos);
            let seq = &self.s[self.pos..end];
            self.pos = end;
            Some(Token::Escape(seq))
        } else {
            self.pos += ch.len_utf8();
            Some(Token::Char(ch))
        }
    }
}

/// Tokenize an escaped string.
pub fn tokens(s: &str) -> Tokens<'_> {
    Tokens { s, pos: 0 }
}

/// Whether a sequence resets all SGR attributes.
pub fn is_reset(seq: &str) -> bool {
    seq == "\x1b[0m" || seq == "\x1b[m"
}

/// Remove every escape sequence.
#[must_use]
pub fn strip(s: &str) -> String {
    tokens(s)
        .filter_map(|t| match t {
            Token::Char(ch) => Some(ch),
            Token::Escape(_) => None,
        })
        .collect()
}

/// Number of visible runes.
#[must_use]
pub fn visual_width(s: &str) -> usize {
    tokens(s)
        .filter(|t| matches!(t, Token::Char(_)))
        .count()
}

/// Escapes seen so far that still affect styling. A reset drops everything
/// before it.
#[derive(Debug, Default)]
struct ActiveEscapes<'a> {
    seqs: Vec<&'a str>,
}

impl<'a> ActiveEscapes<'a> {
    fn push(&mut self, seq: &'a str) {
        if is_reset(seq) {
            self.seqs.clear();
        } else {
            self.seqs.push(seq);
        }
    }

    fn write_to(&self, out: &mut String) {
        for seq in &self.seqs {
            out.push_str(seq);
        }
    }
}

/// Visual substring covering columns `[start, start + width)`.
///
/// Escapes that precede the window are re-emitted in front of its first rune
/// so the visible text keeps its styling. Escapes after the window are dropped.
#[must_use]
pub fn slice(s: &str, start: usize, width: usize) -> String {
    let end = start.saturating_add(width);
    let mut out = String::new();
    let mut carried = ActiveEscapes::default();
    let mut entered = false;
    let mut col = 0usize;

    for tok in tokens(s) {
        match tok {
            Token::Escape(seq) => {
                if col < start {
                    carried.push(seq);
                } else if col < end {
                    if !entered {
                        carried.write_to(&mut out);
                        entered = true;
                    }
                    out.push_str(seq);
                }
            }
            Token::Char(ch) => {
                if col >= end {
                    break;
                }
                if col >= start {
                    if !entered {
                        carried.write_to(&mut out);
                        entered = true;
                    }
                    out.push(ch);
                }
                col += 1;
            }
        }
    }

    out
}

/// Append spaces until the visual width reaches `width`.
#[must_use]
pub fn pad(s: &str, width: usize) -> String {
    let current = visual_width(s);
    if current >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + width - current);
    out.push_str(s);
    out.extend(std::iter::repeat(' ').take(width - current));
    out
}

/// Pad to exactly `width`, truncating with `…` when the text is wider.
#[must_use]
pub fn fit(s: &str, width: usize) -> String {
    if visual_width(s) > width {
        truncate(s, width, "…")
    } else {
        pad(s, width)
    }
}

/// Cut to at most `width` columns, ending with `tail` when something was cut.
#[must_use]
pub fn truncate(s: &str, width: usize, tail: &str) -> String {
    if visual_width(s) <= width {
        return s.to_string();
    }
    let tail_width = visual_width(tail);
    if tail_width >= width {
        return slice(tail, 0, width);
    }
    let mut out = slice(s, 0, width - tail_width);
    out.push_str(tail);
    out
}

/// Hard-wrap at `width` columns.
///
/// Styling active at a break is re-emitted at the start of the continuation
/// line. Always returns at least one line; a zero width returns the input
/// unchanged.
#[must_use]
pub fn wrap(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut active = ActiveEscapes::default();
    let mut col = 0usize;

    for tok in tokens(s) {
        match tok {
            Token::Escape(seq) => {
                current.push_str(seq);
                active.push(seq);
            }
            Token::Char(ch) => {
                if col == width {
                    lines.push(std::mem::take(&mut current));
                    active.write_to(&mut current);
                    col = 0;
                }
                current.push(ch);
                col += 1;
            }
        }
    }

    lines.push(current);
    lines
}

/// Make raw file text safe to embed: tabs expand to the next stop and other
/// control characters (including `ESC`) become `U+FFFD`.
pub fn sanitize(raw: &str) -> Cow<'_, str> {
    if !raw.chars().any(char::is_control) {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len() + 8);
    let mut col = 0usize;
    for ch in raw.chars() {
        match ch {
            '\t' => {
                let n = TAB_WIDTH - col % TAB_WIDTH;
                out.extend(std::iter::repeat(' ').take(n));
                col += n;
            }
            c if c.is_control() => {
                out.push('\u{FFFD}');
                col += 1;
            }
            c => {
                out.push(c);
                col += 1;
            }
        }
    }
    Cow::Owned(out)
}
