//! Messages delivered to the controller and the deferred work it requests.
//!
//! The controller never performs git work itself. It returns a [`Command`];
//! the worker executes it on another thread and posts one [`Msg`] back per
//! leaf command. Preference writes are the exception and post nothing.

use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::core::{
    BranchList, DiffMode, FileChange, PrefChange, Prefs, PullOutput, RepoError, ResetCleanPlan, Row,
};

use super::wizards::WizardKind;

/// Input to [`super::App::update`].
#[derive(Debug)]
pub enum Msg {
    /// Key press.
    Key(KeyEvent),
    /// Terminal size changed.
    Resize {
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
    /// Periodic refresh timer fired.
    Tick,
    /// Transient status timer fired for the status with this sequence.
    ClearStatus(u64),
    /// Changed file list for the current diff mode.
    FilesLoaded(Result<Vec<FileChange>, RepoError>),
    /// Display rows for one file.
    DiffLoaded {
        /// File the rows belong to.
        path: String,
        /// Rows, or the failure.
        result: Result<Vec<Row>, RepoError>,
    },
    /// `<short sha> <subject>` of HEAD.
    LastCommit(Result<String, RepoError>),
    /// Checked-out branch name.
    CurrentBranch(Result<String, RepoError>),
    /// Saved preferences, read once at startup.
    PrefsLoaded(Prefs),
    /// Result addressed to a wizard.
    Wizard(WizardMsg),
}

/// Completion of a [`GitTask`].
#[derive(Debug)]
#[allow(missing_docs)]
pub enum WizardMsg {
    CommitDone(Result<(), RepoError>),
    UncommitEligible(Result<Vec<String>, RepoError>),
    UncommitDone(Result<(), RepoError>),
    Branches(Result<BranchList, RepoError>),
    BranchDone {
        name: String,
        created: bool,
        result: Result<(), RepoError>,
    },
    /// Dry-run clean output for the given `-x` choice.
    CleanPreview {
        include_ignored: bool,
        result: Result<Vec<String>, RepoError>,
    },
    ResetCleanDone(Result<(), RepoError>),
    PullDone(PullOutput),
    Commits(Result<Vec<String>, RepoError>),
    RevertDone(Result<(), RepoError>),
}

impl WizardMsg {
    /// Wizard that requested the work.
    pub fn kind(&self) -> WizardKind {
        match self {
            Self::CommitDone(_) => WizardKind::Commit,
            Self::UncommitEligible(_) | Self::UncommitDone(_) => WizardKind::Uncommit,
            Self::Branches(_) | Self::BranchDone { .. } => WizardKind::Branch,
            Self::CleanPreview { .. } | Self::ResetCleanDone(_) => WizardKind::ResetClean,
            Self::PullDone(_) => WizardKind::Pull,
            Self::Commits(_) | Self::RevertDone(_) => WizardKind::Revert,
        }
    }

    /// Whether this message ends a mutating operation (as opposed to
    /// delivering data for a step).
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Self::CommitDone(_)
                | Self::UncommitDone(_)
                | Self::BranchDone { .. }
                | Self::ResetCleanDone(_)
                | Self::PullDone(_)
                | Self::RevertDone(_)
        )
    }
}

/// Repository work requested by a wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GitTask {
    /// Stage, commit, then push.
    StageCommitPush { paths: Vec<String>, message: String },
    FilesInLastCommit,
    Uncommit { paths: Vec<String> },
    ListBranches,
    Checkout { name: String },
    CheckoutNew { name: String },
    CleanPreview { include_ignored: bool },
    ResetClean(ResetCleanPlan),
    Pull,
    /// Last 20 commits, one line each.
    RecentCommits,
    /// Revert, commit with `message`, then push.
    Revert { sha: String, message: String },
}

/// Deferred work returned by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Command {
    /// Nothing to do.
    #[default]
    None,
    /// Several independent commands.
    Batch(Vec<Command>),
    /// List changed files for a mode.
    LoadFiles(DiffMode),
    /// Load and pair the diff of one file.
    LoadDiff {
        /// File path.
        path: String,
        /// Diff mode.
        mode: DiffMode,
    },
    /// Fetch the HEAD summary.
    LoadLastCommit,
    /// Fetch the branch name.
    LoadCurrentBranch,
    /// Read saved preferences.
    LoadPrefs,
    /// Persist one preference; failures are logged only.
    SavePref(PrefChange),
    /// Post [`Msg::Tick`] after a delay.
    TickAfter(Duration),
    /// Post [`Msg::ClearStatus`] after a delay.
    ClearStatusAfter {
        /// Time the status stays visible.
        delay: Duration,
        /// Sequence of the status being timed.
        seq: u64,
    },
    /// Run a wizard task.
    Git(GitTask),
}

impl Command {
    /// Combine commands, dropping empty ones.
    pub fn batch(commands: impl IntoIterator<Item = Command>) -> Self {
        let mut out: Vec<Command> = commands.into_iter().filter(|c| !c.is_none()).collect();
        match out.len() {
            0 => Self::None,
            1 => out.remove(0),
            _ => Self::Batch(out),
        }
    }

    /// Whether this is [`Command::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Leaf commands in order, with batches flattened.
    pub fn leaves(&self) -> Vec<&Command> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Command>) {
        match self {
            Self::None => {}
            Self::Batch(items) => items.iter().for_each(|c| c.collect_leaves(out)),
            leaf => out.push(leaf),
        }
    }

    /// Owned leaves, consuming the command.
    pub fn into_leaves(self) -> Vec<Command> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(items) => items.into_iter().flat_map(Command::into_leaves).collect(),
            leaf => vec![leaf],
        }
    }

    /// Whether any leaf satisfies `pred`.
    pub fn contains(&self, pred: impl Fn(&Command) -> bool) -> bool {
        self.leaves().into_iter().any(pred)
    }
}
