//! diffium - a diff-first terminal browser for uncommitted git changes.
//!
//! Lists changed files next to a paired diff view and drives common
//! repository chores (commit & push, uncommit, branch switch, pull,
//! reset/clean, revert) through small confirmation wizards.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use diffium::prelude::*;
//!
//! let repo = RepoRoot::discover(std::path::Path::new("."))?;
//! let files = diffium::core::list_changed_files(&repo)?;
//! ```

#![deny(missing_docs)]

pub mod core;
pub mod logging;
pub mod prelude;
pub mod search;
pub mod theme;
pub mod ui;
