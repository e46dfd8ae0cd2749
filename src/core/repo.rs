//! Git repository discovery and working-tree operations.
//!
//! Everything here shells out to the `git` binary and blocks until it exits.
//! The UI only calls these from worker threads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepoError {
    /// Path is not inside a git repository.
    #[error("not inside a git repository")]
    NotARepo,
    /// Git command exited unsuccessfully.
    #[error("git {command}: {message}")]
    GitError {
        /// Subcommand line that failed (without the `git` prefix).
        command: String,
        /// Trimmed error output of the failed command.
        message: String,
    },
    /// I/O error spawning git.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Git output contained invalid UTF-8.
    #[error("invalid utf-8 in git output")]
    InvalidUtf8,
    /// HEAD has no parent, so the last commit cannot be rewritten.
    #[error("no parent commit (cannot uncommit from initial commit)")]
    NoParentCommit,
    /// A required text argument was blank.
    #[error("empty {0}")]
    EmptyInput(&'static str),
}

/// Canonicalized path to a git repository root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRoot(PathBuf);

impl RepoRoot {
    /// Discover the git repository containing the given path.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use diffium::core::RepoRoot;
    /// use std::path::Path;
    ///
    /// let repo = RepoRoot::discover(Path::new(".")).expect("not in a git repo");
    /// println!("Repo at: {}", repo.path().display());
    /// ```
    #[must_use = "this returns a Result that should be checked"]
    pub fn discover(path: &Path) -> Result<Self, RepoError> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()
            .map_err(|_| RepoError::NotARepo)?;

        if !output.status.success() {
            return Err(RepoError::NotARepo);
        }

        let root = std::str::from_utf8(&output.stdout)
            .map_err(|_| RepoError::InvalidUtf8)?
            .trim();
        if root.is_empty() {
            return Err(RepoError::NotARepo);
        }

        let canonical = PathBuf::from(root)
            .canonicalize()
            .map_err(|_| RepoError::NotARepo)?;

        Ok(Self(canonical))
    }

    /// Get the repository root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Get the repository root as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("")
    }
}

/// Which side of the working tree a diff is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    /// Working tree against HEAD.
    #[default]
    Head,
    /// Index against HEAD.
    Staged,
}

impl DiffMode {
    /// Short uppercase label for the title bar.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Staged => "STAGED",
        }
    }

    /// The other mode.
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Head => Self::Staged,
            Self::Staged => Self::Head,
        }
    }

    /// Whether a changed file belongs in the list for this mode.
    #[must_use]
    pub fn includes(self, file: &FileChange) -> bool {
        match self {
            Self::Head => file.unstaged || file.untracked,
            Self::Staged => file.staged,
        }
    }
}

/// A changed file with its status flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChange {
    /// Path relative to the repository root.
    pub path: String,
    /// Has changes in the index.
    pub staged: bool,
    /// Has working-tree changes not yet staged.
    pub unstaged: bool,
    /// Not tracked by git.
    pub untracked: bool,
    /// Deleted in the index or working tree.
    pub deleted: bool,
    /// Git reports the content as binary.
    pub binary: bool,
}

impl FileChange {
    /// New change record with every flag cleared.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Status letters in the order `D`, `U`, `S`, `M`, or `-` when none apply.
    #[must_use]
    pub fn status_label(&self) -> String {
        let mut label = String::new();
        if self.deleted {
            label.push('D');
        }
        if self.untracked {
            label.push('U');
        }
        if self.staged {
            label.push('S');
        }
        if self.unstaged {
            label.push('M');
        }
        if label.is_empty() {
            label.push('-');
        }
        label
    }
}

/// Local branches and the checked-out one (`HEAD` when detached).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchList {
    /// Sorted local branch names.
    pub names: Vec<String>,
    /// Current branch.
    pub current: String,
}

/// Result of `git pull`. Output is kept even when the pull failed.
#[derive(Debug)]
pub struct PullOutput {
    /// Combined stdout and stderr.
    pub output: String,
    /// Failure, if any.
    pub error: Option<RepoError>,
}

/// Destructive cleanup actions, run in the order reset then clean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetCleanPlan {
    /// `git reset --hard`.
    pub reset: bool,
    /// `git clean -d -f`.
    pub clean: bool,
    /// Add `-x` to the clean.
    pub include_ignored: bool,
}

impl ResetCleanPlan {
    /// Whether the plan does nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.reset && !self.clean
    }

    /// Command lines the plan will run.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.reset {
            out.push("git reset --hard".to_string());
        }
        if self.clean {
            let mut cmd = "git clean -d -f".to_string();
            if self.include_ignored {
                cmd.push_str(" -x");
            }
            out.push(cmd);
        }
        out
    }
}

fn git(root: &RepoRoot, args: &[&str]) -> Result<Output, RepoError> {
    Ok(Command::new("git")
        .args(args)
        .current_dir(root.path())
        .output()?)
}

fn failure(args: &[&str], output: &Output) -> RepoError {
    let mut message = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if message.is_empty() {
        message = String::from_utf8_lossy(&output.stdout).trim().to_string();
    }
    if message.is_empty() {
        message = output.status.to_string();
    }
    RepoError::GitError {
        command: args.join(" "),
        message,
    }
}

/// Run git and return stdout, failing on a non-zero exit.
pub(crate) fn run(root: &RepoRoot, args: &[&str]) -> Result<String, RepoError> {
    let output = git(root, args)?;
    if !output.status.success() {
        return Err(failure(args, &output));
    }
    String::from_utf8(output.stdout).map_err(|_| RepoError::InvalidUtf8)
}

fn with_paths<'a>(prefix: &[&'a str], paths: &'a [String]) -> Vec<&'a str> {
    let mut args = prefix.to_vec();
    args.extend(paths.iter().map(String::as_str));
    args
}

/// Trimmed, non-empty output lines.
fn lines(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn names(root: &RepoRoot, args: &[&str]) -> Result<Vec<String>, RepoError> {
    run(root, args).map(|out| lines(&out))
}

/// `--numstat` reports `-\t-\t<path>` for binary content.
fn numstat_is_binary(out: &str) -> bool {
    out.lines().any(|line| {
        let mut parts = line.trim().split('\t');
        matches!(
            (parts.next(), parts.next()),
            (Some("-"), _) | (_, Some("-"))
        )
    })
}

fn is_binary(root: &RepoRoot, file: &FileChange) -> bool {
    let args = if file.untracked {
        ["diff", "--numstat", "--no-index", "/dev/null", file.path.as_str()]
    } else {
        ["diff", "--numstat", "HEAD", "--", file.path.as_str()]
    };
    // --no-index exits 1 when the files differ; only the output matters.
    git(root, &args)
        .map(|o| numstat_is_binary(&String::from_utf8_lossy(&o.stdout)))
        .unwrap_or(false)
}

fn is_tracked(root: &RepoRoot, path: &str) -> bool {
    git(root, &["ls-files", "--error-unmatch", "--", path])
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Present in the working tree but absent from the index.
fn is_untracked_on_disk(root: &RepoRoot, path: &str) -> bool {
    root.path().join(path).exists() && !is_tracked(root, path)
}

/// List changed files (staged, unstaged, untracked), sorted by path.
#[must_use = "this returns a Result that should be checked"]
pub fn list_changed_files(root: &RepoRoot) -> Result<Vec<FileChange>, RepoError> {
    let unstaged = names(root, &["diff", "--name-only", "--diff-filter=ACDMRTUXB"])?;
    let staged = names(
        root,
        &["diff", "--name-only", "--cached", "--diff-filter=ACDMRTUXB"],
    )?;
    let untracked = names(root, &["ls-files", "--others", "--exclude-standard"])?;
    let deleted_unstaged = names(root, &["ls-files", "-d"]).unwrap_or_default();
    let deleted_staged =
        names(root, &["diff", "--cached", "--name-only", "--diff-filter=D"]).unwrap_or_default();

    let mut by_path: BTreeMap<String, FileChange> = BTreeMap::new();
    let mut mark = |paths: Vec<String>, apply: fn(&mut FileChange)| {
        for path in paths {
            let entry = by_path
                .entry(path.clone())
                .or_insert_with(|| FileChange::new(path));
            apply(entry);
        }
    };
    mark(unstaged, |f| f.unstaged = true);
    mark(staged, |f| f.staged = true);
    mark(untracked, |f| f.untracked = true);
    mark(deleted_unstaged, |f| {
        f.deleted = true;
        f.unstaged = true;
    });
    mark(deleted_staged, |f| {
        f.deleted = true;
        f.staged = true;
    });

    let mut files: Vec<FileChange> = by_path.into_values().collect();
    for file in &mut files {
        file.binary = is_binary(root, file);
    }
    Ok(files)
}

/// Unified diff of one file.
///
/// [`DiffMode::Staged`] always compares the index with HEAD, so a staged
/// removal shows its deleted lines and an untracked file yields an empty
/// diff. In [`DiffMode::Head`] a file that exists on disk but is unknown to
/// the index is diffed against `/dev/null`.
#[must_use = "this returns a Result that should be checked"]
pub fn get_diff(root: &RepoRoot, path: &str, mode: DiffMode) -> Result<String, RepoError> {
    let args: Vec<&str> = match mode {
        DiffMode::Staged => vec!["diff", "--no-color", "--text", "--cached", "HEAD", "--", path],
        DiffMode::Head if is_untracked_on_disk(root, path) => {
            vec!["diff", "--no-color", "--no-index", "--text", "/dev/null", path]
        }
        DiffMode::Head => vec!["diff", "--no-color", "--text", "HEAD", "--", path],
    };

    let output = git(root, &args)?;
    if !output.status.success() && output.stdout.is_empty() {
        return Err(failure(&args, &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Stage the given paths, deletions included. No-op for an empty list.
pub fn stage_files(root: &RepoRoot, paths: &[String]) -> Result<(), RepoError> {
    if paths.is_empty() {
        return Ok(());
    }
    run(root, &with_paths(&["add", "-A", "--"], paths)).map(drop)
}

/// Commit the index with `message`.
pub fn commit(root: &RepoRoot, message: &str) -> Result<(), RepoError> {
    if message.trim().is_empty() {
        return Err(RepoError::EmptyInput("commit message"));
    }
    run(root, &["commit", "-m", message]).map(drop)
}

/// Push the current branch. When a plain `git push` is refused, retry with
/// `-u` against the first remote (or `origin`).
pub fn push(root: &RepoRoot) -> Result<(), RepoError> {
    let err = match run(root, &["push"]) {
        Ok(_) => return Ok(()),
        Err(err) => err,
    };
    let Ok(branch) = current_branch(root) else {
        return Err(err);
    };
    let remote = run(root, &["remote"])
        .ok()
        .and_then(|out| out.split_whitespace().next().map(str::to_string))
        .unwrap_or_else(|| "origin".to_string());
    tracing::debug!(%remote, %branch, "retrying push with upstream");
    run(root, &["push", "-u", remote.as_str(), branch.as_str()]).map(drop)
}

/// `git pull`, keeping the output on failure.
pub fn pull(root: &RepoRoot) -> PullOutput {
    let args = ["pull"];
    match git(root, &args) {
        Ok(out) => {
            let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&out.stderr));
            let error = (!out.status.success()).then(|| failure(&args, &out));
            PullOutput {
                output: text,
                error,
            }
        }
        Err(err) => PullOutput {
            output: String::new(),
            error: Some(err),
        },
    }
}

/// Local branches and the current branch.
#[must_use = "this returns a Result that should be checked"]
pub fn list_branches(root: &RepoRoot) -> Result<BranchList, RepoError> {
    let current = current_branch(root)?;
    let mut names = names(
        root,
        &["for-each-ref", "--format=%(refname:short)", "refs/heads"],
    )?;
    names.sort();
    Ok(BranchList { names, current })
}

/// Switch to an existing branch.
pub fn checkout(root: &RepoRoot, name: &str) -> Result<(), RepoError> {
    if name.trim().is_empty() {
        return Err(RepoError::EmptyInput("branch name"));
    }
    run(root, &["checkout", name]).map(drop)
}

/// Create a branch at HEAD and switch to it.
pub fn checkout_new(root: &RepoRoot, name: &str) -> Result<(), RepoError> {
    if name.trim().is_empty() {
        return Err(RepoError::EmptyInput("branch name"));
    }
    run(root, &["checkout", "-b", name]).map(drop)
}

/// Dry run of `git clean`, one line per path it would remove.
#[must_use = "this returns a Result that should be checked"]
pub fn clean_preview(root: &RepoRoot, include_ignored: bool) -> Result<Vec<String>, RepoError> {
    let mut args = vec!["clean", "-d", "-n"];
    if include_ignored {
        args.push("-x");
    }
    names(root, &args)
}

/// `git reset --hard`.
pub fn reset_hard(root: &RepoRoot) -> Result<(), RepoError> {
    run(root, &["reset", "--hard"]).map(drop)
}

/// Remove untracked files and directories.
pub fn clean(root: &RepoRoot, include_ignored: bool) -> Result<(), RepoError> {
    let mut args = vec!["clean", "-d", "-f"];
    if include_ignored {
        args.push("-x");
    }
    run(root, &args).map(drop)
}

/// Run the selected parts of `plan`, stopping at the first failure.
pub fn reset_and_clean(root: &RepoRoot, plan: ResetCleanPlan) -> Result<(), RepoError> {
    if plan.reset {
        reset_hard(root)?;
    }
    if plan.clean {
        clean(root, plan.include_ignored)?;
    }
    Ok(())
}

fn require_parent(root: &RepoRoot) -> Result<(), RepoError> {
    if git(root, &["rev-parse", "--verify", "HEAD^"])?.status.success() {
        Ok(())
    } else {
        Err(RepoError::NoParentCommit)
    }
}

/// Paths touched by HEAD relative to its first parent, sorted.
#[must_use = "this returns a Result that should be checked"]
pub fn files_in_last_commit(root: &RepoRoot) -> Result<Vec<String>, RepoError> {
    require_parent(root)?;
    let mut paths = names(
        root,
        &["diff-tree", "--no-commit-id", "--name-only", "-r", "HEAD"],
    )?;
    paths.sort();
    Ok(paths)
}

/// Drop `paths` from the last commit. Their index entries go back to HEAD^
/// and the commit is amended; the working tree keeps the changes.
pub fn uncommit_files(root: &RepoRoot, paths: &[String]) -> Result<(), RepoError> {
    if paths.is_empty() {
        return Ok(());
    }
    require_parent(root)?;
    run(root, &with_paths(&["reset", "-q", "HEAD^", "--"], paths))?;
    run(root, &["commit", "--amend", "--no-edit"]).map(drop)
}

/// Short hash and subject of HEAD.
#[must_use = "this returns a Result that should be checked"]
pub fn last_commit_summary(root: &RepoRoot) -> Result<String, RepoError> {
    run(root, &["log", "-1", "--pretty=format:%h %s"]).map(|s| s.trim().to_string())
}

/// Current branch name, `HEAD` when detached.
#[must_use = "this returns a Result that should be checked"]
pub fn current_branch(root: &RepoRoot) -> Result<String, RepoError> {
    run(root, &["rev-parse", "--abbrev-ref", "HEAD"]).map(|s| s.trim().to_string())
}

/// `git log <args>` as trimmed non-empty lines.
#[must_use = "this returns a Result that should be checked"]
pub fn log(root: &RepoRoot, args: &[&str]) -> Result<Vec<String>, RepoError> {
    let mut full = vec!["log"];
    full.extend_from_slice(args);
    names(root, &full)
}

/// Revert `sha` into the index and commit it with `message`.
pub fn revert(root: &RepoRoot, sha: &str, message: &str) -> Result<(), RepoError> {
    if sha.trim().is_empty() {
        return Err(RepoError::EmptyInput("commit"));
    }
    if message.trim().is_empty() {
        return Err(RepoError::EmptyInput("commit message"));
    }
    run(root, &["revert", "--no-commit", sha])?;
    commit(root, message)
}
