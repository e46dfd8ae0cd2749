//! Core primitives for diffium (no TUI dependencies).

mod prefs;
mod repo;
mod rows;
mod text;

pub use prefs::*;
pub use repo::*;
pub use rows::*;
pub use text::*;
