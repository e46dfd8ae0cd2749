//! UI preferences persisted in the repository's local git config.

use super::repo::{run, RepoError, RepoRoot};

const KEY_WRAP: &str = "diffium.wrap";
const KEY_SIDE_BY_SIDE: &str = "diffium.sideBySide";
const KEY_LEFT_WIDTH: &str = "diffium.leftWidth";

/// Saved preferences. `None` means the key is absent, which is not the same
/// as a stored `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prefs {
    /// Line wrap in the diff pane.
    pub wrap: Option<bool>,
    /// Side-by-side rendering.
    pub side_by_side: Option<bool>,
    /// Width of the file list in columns.
    pub left_width: Option<u16>,
}

impl Prefs {
    /// Read all preference keys. Missing or unreadable keys stay `None`.
    pub fn load(root: &RepoRoot) -> Self {
        Self {
            wrap: get(root, KEY_WRAP).map(|v| parse_bool(&v)),
            side_by_side: get(root, KEY_SIDE_BY_SIDE).map(|v| parse_bool(&v)),
            left_width: get(root, KEY_LEFT_WIDTH).and_then(|v| parse_width(&v)),
        }
    }
}

/// A single preference write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefChange {
    /// Store the wrap flag.
    Wrap(bool),
    /// Store the side-by-side flag.
    SideBySide(bool),
    /// Store the left pane width.
    LeftWidth(u16),
}

impl PrefChange {
    /// Write this preference to the local config.
    pub fn save(self, root: &RepoRoot) -> Result<(), RepoError> {
        match self {
            Self::Wrap(v) => set(root, KEY_WRAP, bool_str(v)),
            Self::SideBySide(v) => set(root, KEY_SIDE_BY_SIDE, bool_str(v)),
            Self::LeftWidth(0) => Err(RepoError::EmptyInput("left width")),
            Self::LeftWidth(w) => set(root, KEY_LEFT_WIDTH, &w.to_string()),
        }
    }
}

fn get(root: &RepoRoot, key: &str) -> Option<String> {
    run(root, &["config", "--get", key])
        .ok()
        .map(|s| s.trim().to_string())
}

fn set(root: &RepoRoot, key: &str, value: &str) -> Result<(), RepoError> {
    run(root, &["config", "--local", key, value]).map(drop)
}

/// `1`, `true`, `yes` and `on` (any case) are true; everything else is false.
pub fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_width(s: &str) -> Option<u16> {
    s.trim().parse::<u16>().ok().filter(|w| *w > 0)
}

fn bool_str(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}
