//! Terminal UI using ratatui.

mod app;
mod input;
pub mod msg;
pub mod render;
mod text_input;
pub mod wizards;
mod worker;

pub use app::{App, UiState, Viewport, STATUS_TIMEOUT, TICK_INTERVAL};
pub use input::translate;
pub use msg::{Command, GitTask, Msg, WizardMsg};
pub use render::render;
pub use wizards::{Flow, Wizard, WizardKind};
pub use worker::{execute, spawn_worker, Worker};
