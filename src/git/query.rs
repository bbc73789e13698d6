// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git query operations.
//!
//! ```text
//! free functions --> GixBackend   --> .git/ (no subprocess)
//! ShellBackend::* --> git CLI     (remotes, diffs, ignore rules, network)
//! ```
//!
//! Gix covers discovery and the index; everything that needs git's own
//! config resolution, revision syntax or the network goes through the CLI.

use std::path::{Path, PathBuf};

use crate::error::GmashResult;

use super::backend::{GitQuery, GixBackend, ShellBackend};

/// Resolve the work tree root containing `path`.
///
/// # Errors
///
/// Returns a `GitError` if discovery fails or the repository is bare.
pub fn work_dir(path: &Path) -> GmashResult<PathBuf> {
    GixBackend::work_dir(path)
}

/// Get current branch name (None if HEAD is detached).
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or head resolution fails.
pub fn current_branch(path: &Path) -> GmashResult<Option<String>> {
    GixBackend::current_branch(path)
}

/// Check whether anything below `prefix` is in the index.
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or index access fails.
pub fn has_tracked_under(repo_path: &Path, prefix: &str) -> GmashResult<bool> {
    GixBackend::has_tracked_under(repo_path, prefix)
}

/// Parses `git config --get-regexp` output into `(remote, url)` pairs.
pub(crate) fn parse_remote_urls(listing: &str) -> Vec<(String, String)> {
    listing
        .lines()
        .filter_map(|line| {
            let (key, url) = line.split_once(' ')?;
            let name = key.strip_prefix("remote.")?.strip_suffix(".url")?;
            Some((name.to_string(), url.trim().to_string()))
        })
        .collect()
}

impl ShellBackend {
    /// True when the working tree differs from the index.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn has_unstaged_changes(&self) -> GmashResult<bool> {
        Ok(!self.check(&["diff", "--quiet"]).await?)
    }

    /// True when the index differs from HEAD.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn has_staged_changes(&self) -> GmashResult<bool> {
        Ok(!self.check(&["diff", "--cached", "--quiet"]).await?)
    }

    /// Configured remote aliases.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn remotes(&self) -> GmashResult<Vec<String>> {
        let listing = self.git_command(&["remote"]).await?;
        Ok(listing.lines().map(str::to_string).collect())
    }

    /// Whether `alias` is a configured remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn remote_exists(&self, alias: &str) -> GmashResult<bool> {
        Ok(self.remotes().await?.iter().any(|r| r == alias))
    }

    /// Every `(remote, url)` pair from the repository config.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn remote_urls(&self) -> GmashResult<Vec<(String, String)>> {
        let output = self
            .output(&["config", "--get-regexp", r"^remote\..*\.url$"])
            .await?;
        // exit 1: no remote has a url
        Ok(parse_remote_urls(output.stdout()))
    }

    /// Whether git's ignore rules exclude `path`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn is_ignored(&self, path: &str) -> GmashResult<bool> {
        self.check(&["check-ignore", "-q", path]).await
    }

    /// Contacts `url` with `ls-remote --heads`; `Err` carries git's message.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` only if git cannot be run at all.
    pub async fn ls_remote_heads(&self, url: &str) -> GmashResult<Result<(), String>> {
        let output = self.output(&["ls-remote", "--heads", url]).await?;
        if output.success() {
            Ok(Ok(()))
        } else {
            Ok(Err(output.stderr().trim().to_string()))
        }
    }

    /// The commit HEAD points at (None on an unborn branch).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn head(&self) -> GmashResult<Option<String>> {
        let output = self
            .output(&["rev-parse", "--verify", "-q", "HEAD"])
            .await?;
        Ok(output
            .success()
            .then(|| output.stdout().trim().to_string()))
    }

    /// Whether the tree at `HEAD:<prefix>` equals the tree of `rev`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if either side cannot be resolved.
    pub async fn prefix_matches(&self, prefix: &str, rev: &str) -> GmashResult<bool> {
        let head_tree = format!("HEAD:{prefix}");
        self.check(&["diff", "--quiet", &head_tree, rev]).await
    }

    /// Best common ancestor of two commits (None for unrelated histories).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if either revision is invalid.
    pub async fn merge_base(&self, a: &str, b: &str) -> GmashResult<Option<String>> {
        let output = self.output(&["merge-base", a, b]).await?;
        match output.exit_code() {
            0 => Ok(Some(output.stdout().trim().to_string())),
            1 => Ok(None),
            _ => Err(super::backend::command_failed(&["merge-base", a, b], &output).into()),
        }
    }

    /// Whether a local branch named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn branch_exists(&self, name: &str) -> GmashResult<bool> {
        let reference = format!("refs/heads/{name}");
        self.check(&["show-ref", "--verify", "--quiet", &reference])
            .await
    }

    /// Whether the current branch tracks an upstream.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git cannot be run.
    pub async fn has_upstream(&self) -> GmashResult<bool> {
        let output = self
            .output(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])
            .await?;
        Ok(output.success())
    }

    /// Paths of every registered worktree, main one first.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn worktrees(&self) -> GmashResult<Vec<PathBuf>> {
        let listing = self
            .git_command(&["worktree", "list", "--porcelain"])
            .await?;
        Ok(listing
            .lines()
            .filter_map(|line| line.strip_prefix("worktree "))
            .map(PathBuf::from)
            .collect())
    }
}
