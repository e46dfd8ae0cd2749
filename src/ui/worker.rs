//! Background execution of controller commands.
//!
//! A dispatcher thread receives [`Command`]s and runs every leaf on its own
//! short-lived thread, so a slow push never delays a file list refresh.
//! Each leaf posts its result [`Msg`] on the response channel.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::core::{
    build_rows, checkout, checkout_new, clean_preview, commit, current_branch, files_in_last_commit,
    get_diff, last_commit_summary, list_branches, list_changed_files, log, pull, push,
    reset_and_clean, revert, stage_files, uncommit_files, Prefs, RepoRoot,
};

use super::msg::{Command, GitTask, Msg, WizardMsg};

/// Arguments for the revert wizard's commit list.
const RECENT_COMMITS: &[&str] = &["--oneline", "-n", "20"];

/// Handle to the dispatcher thread. Dropping it stops the dispatcher.
pub struct Worker {
    request_tx: Option<Sender<Command>>,
    /// Results, one message per finished leaf command.
    pub response_rx: Receiver<Msg>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("request_tx", &self.request_tx)
            .field("response_rx", &self.response_rx)
            .field("handle", &self.handle.as_ref().map(|_| "..."))
            .finish()
    }
}

/// Start the dispatcher for `repo`.
pub fn spawn_worker(repo: RepoRoot) -> Worker {
    let (request_tx, request_rx) = mpsc::channel::<Command>();
    let (response_tx, response_rx) = mpsc::channel::<Msg>();

    let handle = thread::spawn(move || dispatch_loop(repo, request_rx, response_tx));

    Worker {
        request_tx: Some(request_tx),
        response_rx,
        handle: Some(handle),
    }
}

impl Worker {
    /// Queue a command. Empty commands are dropped here.
    pub fn dispatch(&self, cmd: Command) {
        if cmd.is_none() {
            return;
        }
        if let Some(tx) = &self.request_tx {
            if tx.send(cmd).is_err() {
                warn!("worker dispatcher is gone; command dropped");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the request channel ends the dispatch loop.
        self.request_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn dispatch_loop(repo: RepoRoot, request_rx: Receiver<Command>, response_tx: Sender<Msg>) {
    while let Ok(cmd) = request_rx.recv() {
        for leaf in cmd.into_leaves() {
            debug!(?leaf, "dispatching");
            let repo = repo.clone();
            let tx = response_tx.clone();
            thread::spawn(move || {
                if let Some(msg) = execute(&repo, leaf) {
                    // The receiver is gone only during shutdown.
                    let _ = tx.send(msg);
                }
            });
        }
    }
}

/// Run one leaf command to completion and build its result message.
///
/// Blocks for as long as git (or a timer) takes. Preference writes and
/// empty commands produce no message.
pub fn execute(repo: &RepoRoot, cmd: Command) -> Option<Msg> {
    let msg = match cmd {
        Command::None => return None,
        Command::Batch(items) => {
            warn!(count = items.len(), "batch reached execute; run its leaves instead");
            return None;
        }
        Command::LoadFiles(mode) => Msg::FilesLoaded(list_changed_files(repo).map(|mut files| {
            files.retain(|f| mode.includes(f));
            files
        })),
        Command::LoadDiff { path, mode } => {
            let result = get_diff(repo, &path, mode).map(|text| build_rows(&text));
            Msg::DiffLoaded { path, result }
        }
        Command::LoadLastCommit => Msg::LastCommit(last_commit_summary(repo)),
        Command::LoadCurrentBranch => Msg::CurrentBranch(current_branch(repo)),
        Command::LoadPrefs => Msg::PrefsLoaded(Prefs::load(repo)),
        Command::SavePref(change) => {
            if let Err(e) = change.save(repo) {
                warn!(?change, error = %e, "failed to save preference");
            }
            return None;
        }
        Command::TickAfter(delay) => {
            thread::sleep(delay);
            Msg::Tick
        }
        Command::ClearStatusAfter { delay, seq } => {
            thread::sleep(delay);
            Msg::ClearStatus(seq)
        }
        Command::Git(task) => Msg::Wizard(run_task(repo, task)),
    };
    Some(msg)
}

fn run_task(repo: &RepoRoot, task: GitTask) -> WizardMsg {
    match task {
        GitTask::StageCommitPush { paths, message } => WizardMsg::CommitDone(
            stage_files(repo, &paths)
                .and_then(|()| commit(repo, &message))
                .and_then(|()| push(repo)),
        ),
        GitTask::FilesInLastCommit => WizardMsg::UncommitEligible(files_in_last_commit(repo)),
        GitTask::Uncommit { paths } => WizardMsg::UncommitDone(uncommit_files(repo, &paths)),
        GitTask::ListBranches => WizardMsg::Branches(list_branches(repo)),
        GitTask::Checkout { name } => WizardMsg::BranchDone {
            result: checkout(repo, &name),
            name,
            created: false,
        },
        GitTask::CheckoutNew { name } => WizardMsg::BranchDone {
            result: checkout_new(repo, &name),
            name,
            created: true,
        },
        GitTask::CleanPreview { include_ignored } => WizardMsg::CleanPreview {
            include_ignored,
            result: clean_preview(repo, include_ignored),
        },
        GitTask::ResetClean(plan) => WizardMsg::ResetCleanDone(reset_and_clean(repo, plan)),
        GitTask::Pull => WizardMsg::PullDone(pull(repo)),
        GitTask::RecentCommits => WizardMsg::Commits(log(repo, RECENT_COMMITS)),
        GitTask::Revert { sha, message } => WizardMsg::RevertDone(
            revert(repo, &sha, &message).and_then(|()| push(repo)),
        ),
    }
}
