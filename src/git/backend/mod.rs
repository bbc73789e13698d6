// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitQuery (read)  --> GixBackend   (pure Rust gix, sync)
//! mutations/reads  --> ShellBackend (git CLI, async, cancellable)
//! ```
//!
//! Every shell invocation runs with `GIT_TERMINAL_PROMPT=0`,
//! `GCM_INTERACTIVE=never` and `GIT_MERGE_AUTOEDIT=no` so git never waits on
//! the terminal.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::core::process::builder::{ProcessBuilder, ProcessFlags, ProcessOutput};
use crate::error::{GitError, GixError, GmashResult};

/// Environment applied to every git child process.
const GIT_ENV: [(&str, &str); 3] = [
    ("GIT_TERMINAL_PROMPT", "0"),
    ("GCM_INTERACTIVE", "never"),
    ("GIT_MERGE_AUTOEDIT", "no"),
];

// --- Query Trait (Read-only operations) ---

/// Read-only git query operations.
///
/// Implementors inspect repository state without modifying it.
pub trait GitQuery {
    /// Resolve the root of the work tree containing `path`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if discovery fails or the repository is bare.
    fn work_dir(path: &Path) -> GmashResult<PathBuf>;

    /// Get current branch name (None if HEAD is detached).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or head resolution fails.
    fn current_branch(path: &Path) -> GmashResult<Option<String>>;

    /// Check whether any index entry lives below the `/`-separated `prefix`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or index access fails.
    fn has_tracked_under(repo_path: &Path, prefix: &str) -> GmashResult<bool>;
}

// --- GixBackend Implementation (Pure Rust) ---

/// Pure Rust git backend using gix.
///
/// Read-only, no subprocess.
pub struct GixBackend;

fn discover(path: &Path) -> Result<gix::Repository, GitError> {
    gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))
}

impl GitQuery for GixBackend {
    fn work_dir(path: &Path) -> GmashResult<PathBuf> {
        let repo = discover(path)?;
        let workdir = repo
            .workdir()
            .ok_or(GitError::Gix(GixError::BareRepository))?;
        Ok(std::fs::canonicalize(workdir)?)
    }

    fn current_branch(path: &Path) -> GmashResult<Option<String>> {
        let repo = discover(path)?;
        let head = repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        Ok(head.map(|name| name.shorten().to_string()))
    }

    fn has_tracked_under(repo_path: &Path, prefix: &str) -> GmashResult<bool> {
        let repo = discover(repo_path)?;
        let index = repo
            .index_or_empty()
            .map_err(|e| GitError::Gix(GixError::Index(e)))?;
        let needle = format!("{}/", prefix.trim_end_matches('/'));
        Ok(index
            .entries()
            .iter()
            .any(|entry| entry.path(&index).starts_with(needle.as_bytes())))
    }
}

// --- ShellBackend Implementation (Git CLI) ---

/// Shell-based git backend using the git CLI.
///
/// Holds the executable, the working directory and the cancellation token
/// shared with the Ctrl-C handler. Cloning is cheap; [`ShellBackend::in_dir`]
/// retargets the same runner at another directory (e.g. a temporary
/// worktree) and [`ShellBackend::detached`] produces a runner that ignores
/// cancellation, for cleanup.
#[derive(Debug, Clone)]
pub struct ShellBackend {
    program: PathBuf,
    cwd: PathBuf,
    cancel: CancellationToken,
}

impl ShellBackend {
    #[must_use]
    pub fn new(
        program: impl Into<PathBuf>,
        cwd: impl Into<PathBuf>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            program: program.into(),
            cwd: cwd.into(),
            cancel,
        }
    }

    /// Same runner, different working directory.
    #[must_use]
    pub fn in_dir(&self, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: self.program.clone(),
            cwd: cwd.into(),
            cancel: self.cancel.clone(),
        }
    }

    /// Same runner with a fresh token that is never cancelled.
    #[must_use]
    pub fn detached(&self) -> Self {
        Self {
            program: self.program.clone(),
            cwd: self.cwd.clone(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    fn command(&self, args: &[&str]) -> ProcessBuilder {
        GIT_ENV
            .iter()
            .fold(ProcessBuilder::new(&self.program), |builder, (k, v)| {
                builder.env(*k, *v)
            })
            .args(args)
            .cwd(&self.cwd)
            .flag(ProcessFlags::ALLOW_FAILURE)
            .capture_output()
            .name("git")
    }

    /// Run git and return the raw output regardless of exit code.
    ///
    /// # Errors
    ///
    /// Returns `GitError::Interrupted` if the token fires while git runs, or a
    /// process error if git cannot be spawned.
    pub async fn output(&self, args: &[&str]) -> GmashResult<ProcessOutput> {
        let output = self
            .command(args)
            .run_with_cancellation(&self.cancel)
            .await?;
        if output.is_interrupted() {
            return Err(GitError::Interrupted {
                command: format_command(args),
            }
            .into());
        }
        Ok(output)
    }

    /// Execute a git command that must succeed; returns trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns `GitError::CommandFailed` carrying git's stderr on a non-zero
    /// exit, plus the errors of [`ShellBackend::output`].
    pub async fn git_command(&self, args: &[&str]) -> GmashResult<String> {
        let output = self.output(args).await?;
        if !output.success() {
            return Err(command_failed(args, &output).into());
        }
        Ok(output.stdout().trim().to_string())
    }

    /// Run a git predicate: exit 0 is `true`, exit 1 is `false`.
    ///
    /// # Errors
    ///
    /// Any other exit code is a `GitError::CommandFailed`.
    pub async fn check(&self, args: &[&str]) -> GmashResult<bool> {
        let output = self.output(args).await?;
        match output.exit_code() {
            0 => Ok(true),
            1 => Ok(false),
            _ => Err(command_failed(args, &output).into()),
        }
    }

    /// Synchronous variant of [`ShellBackend::git_command`] for `Drop` paths
    /// where no runtime is available.
    ///
    /// # Errors
    ///
    /// Returns `GitError::CommandFailed` if git fails to run or exits non-zero.
    pub fn git_command_blocking(&self, args: &[&str]) -> GmashResult<String> {
        use std::process::Command;

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.cwd)
            .envs(GIT_ENV)
            .output()
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format_command(args),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn format_command(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

/// Merge conflicts report on stdout, most other failures on stderr.
pub(crate) fn command_failed(args: &[&str], output: &ProcessOutput) -> GitError {
    let message = if output.stderr().trim().is_empty() {
        output.stdout().trim()
    } else {
        output.stderr().trim()
    };
    GitError::CommandFailed {
        command: format_command(args),
        message: message.to_string(),
    }
}
