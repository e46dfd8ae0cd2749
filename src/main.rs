//! diffium - a diff-first terminal browser for git changes.

use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::{debug, info};

use diffium::core::RepoRoot;
use diffium::theme::Theme;
use diffium::ui::{render, spawn_worker, translate, App, Msg, Worker};

/// Diff-first TUI for git changes.
#[derive(Parser, Debug)]
#[command(name = "diffium", version, about)]
struct Cli {
    /// Path to the repository (any directory inside it)
    #[arg(short = 'r', long = "repo", global = true, default_value = ".")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the TUI and watch for changes
    Watch {
        /// Color theme: 'dark' or 'light', or a user theme name
        #[arg(long, default_value = "dark")]
        theme: String,
    },
}

/// RAII guard for terminal state. Restores terminal on drop (including panic).
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
        let _ = io::stdout().flush();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = diffium::logging::init() {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    let Commands::Watch { theme } = cli.command;
    let repo = match RepoRoot::discover(&cli.repo) {
        Ok(repo) => repo,
        Err(_) => {
            eprintln!("Error: not a git repo: {}", cli.repo.display());
            return ExitCode::from(1);
        }
    };

    match run_tui(repo, &theme) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Run the TUI application.
fn run_tui(repo: RepoRoot, theme_name: &str) -> Result<()> {
    // Set panic hook to ensure terminal cleanup
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
        let _ = io::stdout().flush();
        default_hook(info);
    }));

    info!(repo = %repo.as_str(), theme = theme_name, "starting");
    let theme = Theme::load(repo.path(), theme_name);
    let (mut app, startup) = App::new(theme);
    let worker = spawn_worker(repo);
    worker.dispatch(startup);

    let _guard = TerminalGuard::new().context("Failed to set up terminal")?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Seed the layout; crossterm only reports later size changes.
    let size = terminal.size().context("Failed to read terminal size")?;
    worker.dispatch(app.update(Msg::Resize {
        width: size.width,
        height: size.height,
    }));

    run_loop(&mut terminal, &mut app, &worker)
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, worker: &Worker) -> Result<()> {
    loop {
        while let Ok(msg) = worker.response_rx.try_recv() {
            worker.dispatch(app.update(msg));
        }

        if app.ui.dirty {
            terminal.draw(|frame| render(frame, app))?;
            app.ui.dirty = false;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Some(msg) = translate(event::read()?) {
                worker.dispatch(app.update(msg));
            }
        }

        if app.should_quit {
            debug!("quit requested");
            break;
        }
    }

    Ok(())
}
