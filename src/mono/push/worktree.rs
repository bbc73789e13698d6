// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Scoped temporary worktree for the three-way sync.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{GmashResult, GuardError};
use crate::git::ShellBackend;

/// A detached worktree plus the temporary branch created inside it.
///
/// Call [`SyncWorktree::release`] on every path once acquired. If the value
/// is dropped without being released (panic, early return) the same cleanup
/// runs synchronously.
#[derive(Debug)]
pub struct SyncWorktree {
    /// Rooted at the monorepo, never cancelled.
    cleanup: ShellBackend,
    /// Rooted at the worktree, shares the caller's cancellation.
    git: ShellBackend,
    path: PathBuf,
    branch: String,
    released: bool,
    // Dropped after the worktree is gone.
    _dir: Option<TempDir>,
}

impl SyncWorktree {
    /// Check out HEAD detached at `path`; `dir` owns it when temporary.
    ///
    /// # Errors
    ///
    /// Returns `GuardError::TempBranchExists` if `branch` is already a local
    /// branch, or the `GitError` of `git worktree add`.
    pub async fn acquire(
        git: &ShellBackend,
        path: PathBuf,
        dir: Option<TempDir>,
        branch: &str,
    ) -> GmashResult<Self> {
        if git.branch_exists(branch).await? {
            return Err(GuardError::TempBranchExists {
                branch: branch.to_string(),
            }
            .into());
        }
        git.worktree_add_detached(&path, "HEAD").await?;
        debug!(path = %path.display(), branch, "sync worktree created");

        Ok(Self {
            cleanup: git.detached(),
            git: git.in_dir(&path),
            path,
            branch: branch.to_string(),
            released: false,
            _dir: dir,
        })
    }

    #[must_use]
    pub const fn git(&self) -> &ShellBackend {
        &self.git
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Remove the worktree and the temporary branch, then prune.
    ///
    /// Runs even after an interrupt. Failures are logged, not returned.
    pub async fn release(mut self) {
        self.released = true;
        let git = &self.cleanup;

        if let Err(e) = git.worktree_remove(&self.path).await {
            warn!(path = %self.path.display(), error = %e, "failed to remove sync worktree");
        }
        match git.branch_exists(&self.branch).await {
            Ok(true) => {
                if let Err(e) = git.delete_branch(&self.branch).await {
                    warn!(branch = %self.branch, error = %e, "failed to delete sync branch");
                }
            }
            Ok(false) => {}
            Err(e) => warn!(branch = %self.branch, error = %e, "failed to query sync branch"),
        }
        if let Err(e) = git.worktree_prune().await {
            warn!(error = %e, "git worktree prune failed");
        }
        debug!(branch = %self.branch, "sync worktree released");
    }
}

impl Drop for SyncWorktree {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!(path = %self.path.display(), "sync worktree dropped without release, cleaning up");
        let path = self.path.to_string_lossy().into_owned();
        let steps: [&[&str]; 3] = [
            &["worktree", "remove", "--force", &path],
            &["branch", "-D", &self.branch],
            &["worktree", "prune"],
        ];
        for args in steps {
            if let Err(e) = self.cleanup.git_command_blocking(args) {
                debug!(error = %e, "cleanup step failed");
            }
        }
    }
}
