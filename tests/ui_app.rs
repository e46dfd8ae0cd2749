use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use diffium::core::{build_rows, strip, DiffMode, FileChange, PrefChange, Prefs, RepoError};
use diffium::theme::Theme;
use diffium::ui::{
    render, App, Command, GitTask, Msg, WizardKind, WizardMsg, STATUS_TIMEOUT, TICK_INTERVAL,
};
use ratatui::backend::TestBackend;
use ratatui::style::Color;
use ratatui::Terminal;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

const WIDTH: u16 = 120;
const HEIGHT: u16 = 40;

static ENV_GUARD: Mutex<()> = Mutex::new(());

/// Points HOME and XDG_CONFIG_HOME at a scratch directory for the test.
struct TestEnv {
    _guard: MutexGuard<'static, ()>,
    prev_home: Option<String>,
    prev_xdg: Option<String>,
    home_dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let guard = ENV_GUARD
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        let prev_home = std::env::var("HOME").ok();
        let prev_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        let home_dir = TempDir::new().unwrap();
        std::env::set_var("HOME", home_dir.path());
        std::env::set_var("XDG_CONFIG_HOME", home_dir.path());
        Self {
            _guard: guard,
            prev_home,
            prev_xdg,
            home_dir,
        }
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        if let Some(prev) = &self.prev_home {
            std::env::set_var("HOME", prev);
        } else {
            std::env::remove_var("HOME");
        }

        if let Some(prev) = &self.prev_xdg {
            std::env::set_var("XDG_CONFIG_HOME", prev);
        } else {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }
}

fn key(c: char) -> Msg {
    Msg::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn code(code: KeyCode) -> Msg {
    Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn ctrl(c: char) -> Msg {
    Msg::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

fn unstaged(path: &str) -> FileChange {
    let mut f = FileChange::new(path);
    f.unstaged = true;
    f
}

fn staged(path: &str) -> FileChange {
    let mut f = FileChange::new(path);
    f.staged = true;
    f
}

/// Sized app with no files.
fn sized_app() -> App {
    let (mut app, _) = App::new(Theme::default());
    app.update(Msg::Resize {
        width: WIDTH,
        height: HEIGHT,
    });
    app
}

/// Sized app listing `paths` as unstaged changes.
fn app_with(paths: &[&str]) -> App {
    let mut app = sized_app();
    let files = paths.iter().map(|p| unstaged(p)).collect();
    app.update(Msg::FilesLoaded(Ok(files)));
    app
}

fn overlay(app: &App) -> Vec<String> {
    app.overlay_lines(usize::from(WIDTH))
        .iter()
        .map(|l| strip(l))
        .collect()
}

fn diff_of(lines: usize, needle_at: usize) -> String {
    let mut diff = format!("diff --git a/a.txt b/a.txt\n@@ -1,{lines} +1,{lines} @@\n");
    for i in 0..lines {
        if i == needle_at {
            diff.push_str(&format!(" line {i} needle\n"));
        } else {
            diff.push_str(&format!(" line {i}\n"));
        }
    }
    diff
}

#[test]
fn startup_requests_initial_loads() {
    let (app, cmd) = App::new(Theme::default());
    assert_eq!(
        cmd.leaves(),
        vec![
            &Command::LoadPrefs,
            &Command::LoadFiles(DiffMode::Head),
            &Command::LoadLastCommit,
            &Command::LoadCurrentBranch,
            &Command::TickAfter(TICK_INTERVAL),
        ]
    );
    assert!(app.files.is_empty());
    assert!(!app.viewport.is_sized());
}

#[test]
fn tick_reloads_and_reschedules() {
    let mut app = sized_app();
    let cmd = app.update(Msg::Tick);
    assert!(cmd.contains(|c| *c == Command::LoadFiles(DiffMode::Head)));
    assert!(cmd.contains(|c| *c == Command::LoadCurrentBranch));
    assert!(cmd.contains(|c| *c == Command::TickAfter(TICK_INTERVAL)));
}

#[test]
fn files_loaded_selects_first_and_loads_its_diff() {
    let mut app = sized_app();
    let cmd = app.update(Msg::FilesLoaded(Ok(vec![unstaged("b.txt"), unstaged("a.txt")])));
    assert_eq!(app.files[0].path, "a.txt");
    assert_eq!(
        cmd,
        Command::LoadDiff {
            path: "a.txt".into(),
            mode: DiffMode::Head
        }
    );
    assert!(app.ui.last_refresh.is_some());
}

#[test]
fn refresh_keeps_selection_by_path() {
    let mut app = app_with(&["a.txt", "b.txt", "c.txt"]);
    app.update(key('j'));
    assert_eq!(app.selected_file().unwrap().path, "b.txt");

    app.update(Msg::FilesLoaded(Ok(vec![
        unstaged("0.txt"),
        unstaged("a.txt"),
        unstaged("b.txt"),
        unstaged("c.txt"),
    ])));
    assert_eq!(app.selected, 2);
    assert_eq!(app.selected_file().unwrap().path, "b.txt");

    // Selected path vanished: fall back to the top.
    app.update(Msg::FilesLoaded(Ok(vec![unstaged("a.txt")])));
    assert_eq!(app.selected, 0);
}

#[test]
fn empty_file_list_clears_rows() {
    let mut app = app_with(&["a.txt"]);
    app.update(Msg::DiffLoaded {
        path: "a.txt".into(),
        result: Ok(build_rows("@@ -1 +1 @@\n-x\n+y\n")),
    });
    assert!(app.rows.is_some());

    let cmd = app.update(Msg::FilesLoaded(Ok(Vec::new())));
    assert!(cmd.is_none());
    assert!(app.rows.is_none());
    assert_eq!(app.left_lines(10), ["No changes detected"]);
}

/// Sequence carried by the status clear timer in `cmd`.
fn clear_timer(cmd: &Command) -> Option<u64> {
    cmd.leaves().into_iter().find_map(|c| match c {
        Command::ClearStatusAfter { delay, seq } if *delay == STATUS_TIMEOUT => Some(*seq),
        _ => None,
    })
}

#[test]
fn status_error_keeps_previous_files() {
    let mut app = app_with(&["a.txt"]);
    let cmd = app.update(Msg::FilesLoaded(Err(RepoError::NotARepo)));
    assert_eq!(app.files.len(), 1);
    assert_eq!(
        app.ui.status.as_deref(),
        Some("status error: not inside a git repository")
    );
    let seq = clear_timer(&cmd).expect("status error schedules a clear");
    app.update(Msg::ClearStatus(seq));
    assert!(app.ui.status.is_none());
}

#[test]
fn older_clear_timer_keeps_newer_status() {
    let mut app = app_with(&["a.txt"]);
    let first = app.update(Msg::FilesLoaded(Err(RepoError::NotARepo)));
    let second = app.update(Msg::DiffLoaded {
        path: "a.txt".into(),
        result: Err(RepoError::InvalidUtf8),
    });
    let (first, second) = (clear_timer(&first).unwrap(), clear_timer(&second).unwrap());
    assert_ne!(first, second);

    app.update(Msg::ClearStatus(first));
    assert_eq!(
        app.ui.status.as_deref(),
        Some("diff error: invalid utf-8 in git output")
    );
    app.update(Msg::ClearStatus(second));
    assert!(app.ui.status.is_none());
}

#[test]
fn stale_diff_is_discarded() {
    let mut app = app_with(&["a.txt", "b.txt"]);
    app.update(Msg::DiffLoaded {
        path: "b.txt".into(),
        result: Ok(build_rows("@@ -1 +1 @@\n-x\n+y\n")),
    });
    assert!(app.rows.is_none());

    app.update(Msg::DiffLoaded {
        path: "a.txt".into(),
        result: Ok(build_rows("@@ -1 +1 @@\n-x\n+y\n")),
    });
    assert!(app.rows.is_some());
}

#[test]
fn diff_error_sets_status() {
    let mut app = app_with(&["a.txt"]);
    let cmd = app.update(Msg::DiffLoaded {
        path: "a.txt".into(),
        result: Err(RepoError::InvalidUtf8),
    });
    assert!(app.rows.is_none());
    assert_eq!(
        app.ui.status.as_deref(),
        Some("diff error: invalid utf-8 in git output")
    );
    assert!(clear_timer(&cmd).is_some());
}

#[test]
fn numeric_prefix_moves_by_count() {
    let paths: Vec<String> = (0..10).map(|i| format!("f{i}.txt")).collect();
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    let mut app = app_with(&refs);

    app.update(key('3'));
    assert_eq!(app.ui.key_buffer, "3");
    let cmd = app.update(key('j'));
    assert_eq!(app.selected, 3);
    assert!(app.ui.key_buffer.is_empty());
    assert_eq!(
        cmd,
        Command::LoadDiff {
            path: "f3.txt".into(),
            mode: DiffMode::Head
        }
    );

    app.update(key('9'));
    app.update(key('9'));
    app.update(key('j'));
    assert_eq!(app.selected, 9, "clamped to the last file");

    app.update(key('5'));
    app.update(key('g'));
    assert!(app.ui.key_buffer.is_empty());
    assert_eq!(app.selected, 0);

    app.update(key('G'));
    assert_eq!(app.selected, 9);
}

#[test]
fn help_swallows_keys_until_closed() {
    let mut app = app_with(&["a.txt", "b.txt"]);
    app.update(key('h'));
    assert!(app.ui.show_help);
    assert!(overlay(&app)[1].starts_with("Help"));

    let cmd = app.update(key('j'));
    assert!(cmd.is_none());
    assert_eq!(app.selected, 0);
    app.update(key('c'));
    assert!(app.wizard_kind().is_none());

    app.update(code(KeyCode::Esc));
    assert!(!app.ui.show_help);
    assert!(!app.should_quit);

    app.update(key('h'));
    app.update(key('q'));
    assert!(app.should_quit);
}

#[test]
fn wizard_takes_keys_before_search() {
    let mut app = app_with(&["a.txt"]);
    app.update(key('c'));
    assert_eq!(app.wizard_kind(), Some(WizardKind::Commit));

    app.update(key('/'));
    assert!(!app.search_active());
    app.update(key('q'));
    assert!(!app.should_quit);

    app.update(code(KeyCode::Esc));
    assert!(app.wizard_kind().is_none());
}

#[test]
fn search_keeps_query_after_escape() {
    let mut app = app_with(&["a.txt"]);
    app.update(key('/'));
    assert!(app.search_active());
    for c in "abc".chars() {
        app.update(key(c));
    }
    assert_eq!(app.search.query(), "abc");
    // Typing is not interpreted as global keys.
    assert!(app.wizard_kind().is_none());

    app.update(code(KeyCode::Esc));
    assert!(!app.search_active());
    assert_eq!(app.search.query(), "abc");

    app.update(key('/'));
    assert_eq!(app.search_input.value(), "abc");
    app.update(ctrl('c'));
    assert!(app.should_quit);
}

#[test]
fn search_recenters_on_match() {
    let mut app = sized_app();
    app.update(Msg::Resize {
        width: WIDTH,
        height: 20,
    });
    app.update(Msg::FilesLoaded(Ok(vec![unstaged("a.txt")])));
    app.update(Msg::DiffLoaded {
        path: "a.txt".into(),
        result: Ok(build_rows(&diff_of(60, 50))),
    });
    // One hunk separator line, then sixty context lines.
    assert_eq!(app.right_content().len(), 61);

    app.update(key('/'));
    for c in "needle".chars() {
        app.update(key(c));
    }
    assert_eq!(app.search.current_line(), Some(51));

    // 20 rows minus bars, rules and the three search lines.
    let height = app.viewport.content_height;
    assert_eq!(height, 13);
    assert_eq!(app.viewport.v_offset, 51 - height / 2);
    assert!(overlay(&app).last().unwrap().starts_with("Match 1 of 1"));
}

#[test]
fn scroll_is_clamped_to_content() {
    let mut app = app_with(&["a.txt"]);
    app.update(Msg::DiffLoaded {
        path: "a.txt".into(),
        result: Ok(build_rows(&diff_of(100, 0))),
    });
    let height = app.viewport.content_height;
    assert_eq!(height, usize::from(HEIGHT) - 4);

    app.update(code(KeyCode::PageDown));
    assert_eq!(app.viewport.v_offset, height);
    for _ in 0..10 {
        app.update(code(KeyCode::PageDown));
    }
    assert_eq!(app.viewport.v_offset, 101 - height);

    app.update(ctrl('y'));
    assert_eq!(app.viewport.v_offset, 100 - height);
    app.update(key('K'));
    assert_eq!(app.viewport.v_offset, 100 - height - height / 2);
}

#[test]
fn horizontal_scroll_disabled_in_wrap_mode() {
    let mut app = app_with(&["a.txt"]);
    app.update(key('}'));
    app.update(code(KeyCode::Right));
    assert_eq!(app.viewport.x_offset, 8);
    app.update(key('{'));
    assert_eq!(app.viewport.x_offset, 4);

    let cmd = app.update(key('w'));
    assert_eq!(cmd, Command::SavePref(PrefChange::Wrap(true)));
    assert_eq!(app.viewport.x_offset, 0);
    app.update(key('}'));
    assert_eq!(app.viewport.x_offset, 0);
}

#[test]
fn toggles_persist_preferences() {
    let mut app = app_with(&["a.txt"]);
    assert_eq!(
        app.update(key('s')),
        Command::SavePref(PrefChange::SideBySide(true))
    );
    assert!(app.viewport.side_by_side);

    let cmd = app.update(key('t'));
    assert_eq!(cmd, Command::LoadFiles(DiffMode::Staged));
    assert_eq!(app.mode, DiffMode::Staged);
    assert!(app.rows.is_none());
}

#[test]
fn left_pane_width_is_clamped_and_saved() {
    let mut app = app_with(&["a.txt"]);
    assert_eq!(app.viewport.left_width, WIDTH / 3);

    let cmd = app.update(key('>'));
    assert_eq!(cmd, Command::SavePref(PrefChange::LeftWidth(WIDTH / 3 + 2)));

    for _ in 0..40 {
        app.update(key('<'));
    }
    assert_eq!(app.viewport.left_width, 20);
    for _ in 0..100 {
        app.update(key('L'));
    }
    assert_eq!(app.viewport.left_width, WIDTH - 20);
}

#[test]
fn saved_preferences_apply_on_load() {
    let mut app = sized_app();
    app.update(Msg::PrefsLoaded(Prefs {
        wrap: Some(true),
        side_by_side: Some(true),
        left_width: Some(500),
    }));
    assert!(app.viewport.wrap);
    assert!(app.viewport.side_by_side);
    assert_eq!(app.viewport.left_width, WIDTH - 20);

    let (mut early, _) = App::new(Theme::default());
    early.update(Msg::PrefsLoaded(Prefs {
        left_width: Some(30),
        ..Prefs::default()
    }));
    early.update(Msg::Resize {
        width: WIDTH,
        height: HEIGHT,
    });
    assert_eq!(early.viewport.left_width, 30);
}

#[test]
fn uncommit_confirms_only_files_in_last_commit() {
    let mut app = sized_app();
    app.update(Msg::FilesLoaded(Ok(vec![unstaged("a.txt"), staged("b.txt")])));

    let cmd = app.update(key('u'));
    assert_eq!(cmd, Command::Git(GitTask::FilesInLastCommit));
    assert_eq!(app.wizard_kind(), Some(WizardKind::Uncommit));

    app.update(Msg::Wizard(WizardMsg::UncommitEligible(Ok(vec![
        "b.txt".into()
    ]))));
    app.update(code(KeyCode::Enter));
    assert_eq!(
        overlay(&app)[2],
        "Selected: 2  Eligible to uncommit: 1  Ignored: 1"
    );

    let cmd = app.update(key('y'));
    assert_eq!(
        cmd,
        Command::Git(GitTask::Uncommit {
            paths: vec!["b.txt".into()]
        })
    );

    let cmd = app.update(Msg::Wizard(WizardMsg::UncommitDone(Ok(()))));
    assert!(app.wizard_kind().is_none());
    assert!(cmd.contains(|c| *c == Command::LoadFiles(DiffMode::Head)));
    assert!(cmd.contains(|c| *c == Command::LoadLastCommit));
}

#[test]
fn branch_switch_reports_status() {
    let mut app = app_with(&["a.txt"]);
    assert_eq!(
        app.update(key('b')),
        Command::Git(GitTask::ListBranches)
    );

    let cmd = app.update(Msg::Wizard(WizardMsg::BranchDone {
        name: "dev".into(),
        created: true,
        result: Ok(()),
    }));
    assert!(app.wizard_kind().is_none());
    assert_eq!(
        app.ui.status.as_deref(),
        Some("Created and switched to branch 'dev'")
    );
    assert!(clear_timer(&cmd).is_some());
    assert!(cmd.contains(|c| *c == Command::LoadCurrentBranch));
}

#[test]
fn pull_wizard_stays_open_after_completion() {
    let mut app = app_with(&["a.txt"]);
    assert!(app.update(key('p')).is_none());
    assert_eq!(app.wizard_kind(), Some(WizardKind::Pull));

    let cmd = app.update(Msg::Wizard(WizardMsg::PullDone(
        diffium::core::PullOutput {
            output: "Already up to date.\n".into(),
            error: None,
        },
    )));
    assert_eq!(app.wizard_kind(), Some(WizardKind::Pull));
    assert!(cmd.contains(|c| *c == Command::LoadCurrentBranch));
}

#[test]
fn results_for_closed_wizard_still_refresh() {
    let mut app = app_with(&["a.txt"]);
    app.update(key('c'));
    app.update(code(KeyCode::Esc));

    let cmd = app.update(Msg::Wizard(WizardMsg::CommitDone(Ok(()))));
    assert!(app.wizard_kind().is_none());
    assert!(cmd.contains(|c| *c == Command::LoadFiles(DiffMode::Head)));
    assert!(cmd.contains(|c| *c == Command::LoadLastCommit));

    // A data message with no wizard to receive it does nothing.
    let cmd = app.update(Msg::Wizard(WizardMsg::Branches(Err(RepoError::NotARepo))));
    assert!(cmd.is_none());
}

#[test]
fn render_draws_bars_and_panes() {
    let mut app = app_with(&["a.txt"]);
    app.update(Msg::CurrentBranch(Ok("main".into())));
    app.update(Msg::LastCommit(Ok("abc123 initial".into())));
    app.update(Msg::DiffLoaded {
        path: "a.txt".into(),
        result: Ok(build_rows("@@ -1 +1 @@\n-old text\n+new text\n")),
    });

    let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
    terminal.draw(|frame| render(frame, &app)).unwrap();

    let screen: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(screen.contains("Changes | a.txt (M) [HEAD]"));
    assert!(screen.contains("main"));
    assert!(screen.contains("> M a.txt"));
    assert!(screen.contains("- old text"));
    assert!(screen.contains("+ new text"));
    assert!(screen.contains("last: abc123 initial"));
}

#[test]
fn render_before_first_resize_shows_loading() {
    let (app, _) = App::new(Theme::default());
    let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
    terminal.draw(|frame| render(frame, &app)).unwrap();

    let screen: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(screen.contains("Loading..."));
}

#[test]
fn theme_files_layer_over_builtin() {
    let env = TestEnv::new();
    let themes = env.home_dir.path().join("diffium").join("themes");
    std::fs::create_dir_all(&themes).unwrap();
    std::fs::write(
        themes.join("light.json"),
        r##"{ "defs": { "mint": "#00ff80" }, "addColor": "mint" }"##,
    )
    .unwrap();

    let repo = TempDir::new().unwrap();
    std::fs::create_dir(repo.path().join(".diffium")).unwrap();
    std::fs::write(
        repo.path().join(".diffium").join("theme.json"),
        r#"{ "delColor": "201" }"#,
    )
    .unwrap();

    let theme = Theme::load(repo.path(), "light");
    assert_eq!(theme.add, Color::Rgb(0, 255, 128));
    assert_eq!(theme.del, Color::Indexed(201));
    assert_eq!(theme.meta, Theme::light().meta);

    // Broken files are skipped.
    std::fs::write(repo.path().join(".diffium").join("theme.json"), "{ nope").unwrap();
    assert_eq!(Theme::load(repo.path(), "light").del, Theme::light().del);
}
