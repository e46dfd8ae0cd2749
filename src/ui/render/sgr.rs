//! Bridge between escaped strings and ratatui spans.
//!
//! Pane content is composed as escaped text so that slicing, wrapping and
//! search highlighting all work on one representation. Only SGR sequences
//! survive the conversion; every other escape is dropped.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::{tokens, Token};

/// Wrap `text` in the SGR codes for `style`, followed by a reset.
pub fn paint(text: &str, style: Style) -> String {
    let mut codes: Vec<String> = Vec::new();
    let mods = style.add_modifier;
    for (modifier, code) in [
        (Modifier::BOLD, "1"),
        (Modifier::DIM, "2"),
        (Modifier::ITALIC, "3"),
        (Modifier::UNDERLINED, "4"),
        (Modifier::REVERSED, "7"),
        (Modifier::CROSSED_OUT, "9"),
    ] {
        if mods.contains(modifier) {
            codes.push(code.to_string());
        }
    }
    if let Some(fg) = style.fg {
        codes.push(color_code(fg, false));
    }
    if let Some(bg) = style.bg {
        codes.push(color_code(bg, true));
    }
    if codes.is_empty() {
        return text.to_string();
    }
    format!("\x1b[{}m{text}\x1b[0m", codes.join(";"))
}

/// Faint text.
pub fn faint(text: &str) -> String {
    paint(text, Style::new().add_modifier(Modifier::DIM))
}

/// Bold text.
pub fn bold(text: &str) -> String {
    paint(text, Style::new().add_modifier(Modifier::BOLD))
}

/// Foreground-colored text.
pub fn fg(text: &str, color: Color) -> String {
    paint(text, Style::new().fg(color))
}

const BASIC: [Color; 8] = [
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::Gray,
];

const BRIGHT: [Color; 8] = [
    Color::DarkGray,
    Color::LightRed,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightBlue,
    Color::LightMagenta,
    Color::LightCyan,
    Color::White,
];

fn color_code(color: Color, background: bool) -> String {
    let base = if background { 40 } else { 30 };
    if color == Color::Reset {
        return (base + 9).to_string();
    }
    if let Some(i) = BASIC.iter().position(|&c| c == color) {
        return (base + i).to_string();
    }
    if let Some(i) = BRIGHT.iter().position(|&c| c == color) {
        return (base + 60 + i).to_string();
    }
    let ext = base + 8;
    match color {
        Color::Indexed(n) => format!("{ext};5;{n}"),
        Color::Rgb(r, g, b) => format!("{ext};2;{r};{g};{b}"),
        _ => (base + 9).to_string(),
    }
}

/// Convert an escaped string into a styled line.
pub fn to_line(s: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut style = Style::default();
    let mut text = String::new();

    for tok in tokens(s) {
        match tok {
            Token::Char(ch) => text.push(ch),
            Token::Escape(seq) => {
                let Some(params) = seq
                    .strip_prefix("\x1b[")
                    .and_then(|rest| rest.strip_suffix('m'))
                else {
                    continue;
                };
                if !text.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut text), style));
                }
                style = apply_sgr(style, params);
            }
        }
    }
    if !text.is_empty() {
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

fn apply_sgr(mut style: Style, params: &str) -> Style {
    let codes: Vec<u16> = params
        .split(';')
        .map(|p| p.parse().unwrap_or(0))
        .collect();
    let mut i = 0;
    while i < codes.len() {
        let code = codes[i];
        match code {
            0 => style = Style::default(),
            1 => style = style.add_modifier(Modifier::BOLD),
            2 => style = style.add_modifier(Modifier::DIM),
            3 => style = style.add_modifier(Modifier::ITALIC),
            4 => style = style.add_modifier(Modifier::UNDERLINED),
            7 => style = style.add_modifier(Modifier::REVERSED),
            9 => style = style.add_modifier(Modifier::CROSSED_OUT),
            22 => style = style.remove_modifier(Modifier::BOLD | Modifier::DIM),
            23 => style = style.remove_modifier(Modifier::ITALIC),
            24 => style = style.remove_modifier(Modifier::UNDERLINED),
            27 => style = style.remove_modifier(Modifier::REVERSED),
            29 => style = style.remove_modifier(Modifier::CROSSED_OUT),
            30..=37 => style.fg = Some(BASIC[usize::from(code - 30)]),
            39 => style.fg = None,
            40..=47 => style.bg = Some(BASIC[usize::from(code - 40)]),
            49 => style.bg = None,
            90..=97 => style.fg = Some(BRIGHT[usize::from(code - 90)]),
            100..=107 => style.bg = Some(BRIGHT[usize::from(code - 100)]),
            38 | 48 => {
                let (color, used) = extended_color(&codes[i + 1..]);
                if let Some(color) = color {
                    if code == 38 {
                        style.fg = Some(color);
                    } else {
                        style.bg = Some(color);
                    }
                }
                i += used;
            }
            _ => {}
        }
        i += 1;
    }
    style
}

/// Parse the arguments after a `38`/`48` code. Returns the color and how many
/// arguments were consumed.
fn extended_color(args: &[u16]) -> (Option<Color>, usize) {
    match args {
        [5, n, ..] => (u8::try_from(*n).ok().map(Color::Indexed), 2),
        [2, r, g, b, ..] => {
            let rgb = (u8::try_from(*r), u8::try_from(*g), u8::try_from(*b));
            match rgb {
                (Ok(r), Ok(g), Ok(b)) => (Some(Color::Rgb(r, g, b)), 4),
                _ => (None, 4),
            }
        }
        [] => (None, 0),
        _ => (None, 1),
    }
}
