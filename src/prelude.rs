//! Common re-exports for convenient importing.
//!
//! # Example
//!
//! ```rust,ignore
//! use diffium::prelude::*;
//! ```

pub use crate::core::{
    build_rows, DiffMode, FileChange, Prefs, RepoError, RepoRoot, Row, RowKind,
};
pub use crate::search::SearchEngine;
pub use crate::theme::Theme;
pub use crate::ui::{App, Command, Msg};
