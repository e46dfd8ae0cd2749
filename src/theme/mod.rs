//! Color themes for diffium.

use ratatui::style::Color;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Colors used by the diff view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Theme {
    pub add: Color,
    pub del: Color,
    pub meta: Color,
    pub divider: Color,
    pub add_bg: Color,
    pub del_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// JSON theme file format. Every color is optional; empty or unparsable
/// values keep the base color.
///
/// ```json
/// { "defs": { "green": "#50fa7b" }, "addColor": "green", "delColor": "196" }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ThemeJson {
    #[serde(default)]
    pub defs: HashMap<String, String>,
    pub add_color: Option<String>,
    pub del_color: Option<String>,
    pub meta_color: Option<String>,
    pub divider_color: Option<String>,
    pub add_bg_color: Option<String>,
    pub del_bg_color: Option<String>,
}

impl Theme {
    /// Resolve the theme for a repository.
    ///
    /// The base is the user theme `<config>/diffium/themes/<name>.json` merged
    /// over the builtin palette of the same name (`dark` for unknown names).
    /// `<root>/.diffium/theme.json` is then merged over the base. Missing or
    /// broken files are skipped silently.
    pub fn load(root: &Path, name: &str) -> Self {
        let mut theme = Self::builtin(name);
        if let Some(json) = user_themes_dir().and_then(|d| read_json(&d.join(format!("{name}.json"))))
        {
            theme = theme.merged(&json);
        }
        if let Some(json) = read_json(&root.join(".diffium").join("theme.json")) {
            theme = theme.merged(&json);
        }
        theme
    }

    /// Builtin palette by name.
    pub fn builtin(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Default palette for dark terminals.
    pub fn dark() -> Self {
        Self {
            add: Color::Indexed(34),
            del: Color::Indexed(196),
            meta: Color::Indexed(63),
            divider: Color::Indexed(240),
            add_bg: Color::Indexed(235),
            del_bg: Color::Indexed(235),
        }
    }

    /// Palette for light terminals.
    pub fn light() -> Self {
        Self {
            add: Color::Indexed(22),
            del: Color::Indexed(9),
            meta: Color::Indexed(27),
            divider: Color::Indexed(244),
            add_bg: Color::Indexed(255),
            del_bg: Color::Indexed(255),
        }
    }

    /// Apply the colors set in `json` over this theme.
    #[must_use]
    pub fn merged(self, json: &ThemeJson) -> Self {
        let pick = |value: &Option<String>, fallback: Color| {
            value
                .as_deref()
                .map_or(fallback, |v| resolve_color(v, &json.defs, fallback))
        };
        Self {
            add: pick(&json.add_color, self.add),
            del: pick(&json.del_color, self.del),
            meta: pick(&json.meta_color, self.meta),
            divider: pick(&json.divider_color, self.divider),
            add_bg: pick(&json.add_bg_color, self.add_bg),
            del_bg: pick(&json.del_bg_color, self.del_bg),
        }
    }
}

/// Get user themes directory (~/.config/diffium/themes/).
fn user_themes_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("diffium").join("themes"))
}

fn read_json(path: &Path) -> Option<ThemeJson> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(json) => Some(json),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring unparsable theme");
            None
        }
    }
}

/// Parse a hex color string to Color.
fn parse_hex(s: &str) -> Option<Color> {
    let s = s.strip_prefix('#')?;
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;

    Some(Color::Rgb(r, g, b))
}

/// `"34"` is a 256-color index, `"#rrggbb"` is truecolor.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.starts_with('#') {
        parse_hex(s)
    } else {
        s.parse::<u8>().ok().map(Color::Indexed)
    }
}

/// Resolve a color value, looking through `defs` for named colors.
fn resolve_color(value: &str, defs: &HashMap<String, String>, fallback: Color) -> Color {
    parse_color(value)
        .or_else(|| defs.get(value.trim()).and_then(|d| parse_color(d)))
        .unwrap_or(fallback)
}
