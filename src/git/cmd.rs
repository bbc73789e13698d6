// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git command operations using the shell backend.
//!
//! ```text
//! cmd.rs --> ShellBackend --> git (subtree, worktree, merge, push)
//! ```

use std::path::Path;

use tracing::debug;

use crate::error::GmashResult;

use super::backend::{ShellBackend, command_failed};

/// Outcome of a command that may stop on merge conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    Merged,
    /// Conflicts were found and the merge was aborted.
    Conflicted,
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl ShellBackend {
    /// Run a merging command; on conflicts abort the merge and report it.
    async fn merging(&self, args: &[&str]) -> GmashResult<MergeStatus> {
        let output = self.output(args).await?;
        if output.success() {
            return Ok(MergeStatus::Merged);
        }
        if self.check(&["rev-parse", "-q", "--verify", "MERGE_HEAD"]).await? {
            debug!("aborting conflicted merge");
            self.detached().output(&["merge", "--abort"]).await.ok();
            let text = format!("{}\n{}", output.stdout(), output.stderr());
            if text.contains("CONFLICT") || text.contains("Automatic merge failed") {
                return Ok(MergeStatus::Conflicted);
            }
        }
        Err(command_failed(args, &output).into())
    }

    /// Clone `url` into `dest`, running from `dest`'s parent.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the clone fails.
    pub async fn clone_into(&self, url: &str, dest: &Path) -> GmashResult<()> {
        self.git_command(&["clone", "--quiet", url, &path_arg(dest)])
            .await?;
        Ok(())
    }

    /// Checkout a branch, tag, or commit.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the checkout fails.
    pub async fn checkout(&self, what: &str) -> GmashResult<()> {
        self.git_command(&["-c", "advice.detachedHead=false", "checkout", "-q", what])
            .await?;
        Ok(())
    }

    /// Fetch a single branch; the result lands in `FETCH_HEAD` and `<remote>/<branch>`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the fetch fails.
    pub async fn fetch(&self, remote: &str, branch: &str) -> GmashResult<()> {
        self.git_command(&["fetch", "--quiet", remote, branch])
            .await?;
        Ok(())
    }

    /// Add a remote, optionally fetching it straight away.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote cannot be added or fetched.
    pub async fn add_remote(&self, name: &str, url: &str, fetch: bool) -> GmashResult<()> {
        let mut args = vec!["remote", "add"];
        if fetch {
            args.push("-f");
        }
        args.extend([name, url]);
        self.git_command(&args).await?;
        Ok(())
    }

    /// Remove a remote and its tracking refs.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote does not exist.
    pub async fn remove_remote(&self, name: &str) -> GmashResult<()> {
        self.git_command(&["remote", "remove", name]).await?;
        Ok(())
    }

    /// `git subtree add`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git refuses the subtree.
    pub async fn subtree_add(
        &self,
        prefix: &str,
        url: &str,
        branch: &str,
        squash: bool,
        message: &str,
    ) -> GmashResult<()> {
        let prefix_arg = format!("--prefix={prefix}");
        let mut args = vec!["subtree", "add", prefix_arg.as_str(), url, branch];
        if squash {
            args.push("--squash");
        }
        args.extend(["-m", message]);
        self.git_command(&args).await?;
        Ok(())
    }

    /// `git subtree pull`; conflicts abort the merge.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` on any failure other than a conflict.
    pub async fn subtree_pull(
        &self,
        prefix: &str,
        remote: &str,
        branch: &str,
        squash: bool,
        message: &str,
    ) -> GmashResult<MergeStatus> {
        let prefix_arg = format!("--prefix={prefix}");
        let mut args = vec!["subtree", "pull", prefix_arg.as_str(), remote, branch];
        if squash {
            args.push("--squash");
        }
        args.extend(["-m", message]);
        self.merging(&args).await
    }

    /// `git subtree split --branch=<branch> [--rejoin]`.
    ///
    /// git refuses to rejoin a squashed subtree, so callers pass `rejoin`
    /// only for subtrees imported with full history.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the split fails.
    pub async fn subtree_split(
        &self,
        prefix: &str,
        branch: &str,
        rejoin: bool,
    ) -> GmashResult<String> {
        let prefix_arg = format!("--prefix={prefix}");
        let branch_arg = format!("--branch={branch}");
        let mut args = vec!["subtree", "split", prefix_arg.as_str(), branch_arg.as_str()];
        if rejoin {
            args.push("--rejoin");
        }
        self.git_command(&args).await
    }

    /// Merge `rev` into the current branch.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` on any failure other than a conflict.
    pub async fn merge(
        &self,
        rev: &str,
        allow_unrelated: bool,
        message: &str,
    ) -> GmashResult<MergeStatus> {
        let mut args = vec!["merge", "--no-edit"];
        if allow_unrelated {
            args.push("--allow-unrelated-histories");
        }
        args.extend(["-m", message, rev]);
        self.merging(&args).await
    }

    /// Merge `rev` with the subtree strategy, shifting it under its prefix.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` on any failure other than a conflict.
    pub async fn merge_subtree(
        &self,
        rev: &str,
        allow_unrelated: bool,
        message: &str,
    ) -> GmashResult<MergeStatus> {
        let mut args = vec!["merge", "--no-edit", "-s", "subtree"];
        if allow_unrelated {
            args.push("--allow-unrelated-histories");
        }
        args.extend(["-m", message, rev]);
        self.merging(&args).await
    }

    /// Push a refspec to a remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote rejects the push.
    pub async fn push(&self, remote: &str, refspec: &str) -> GmashResult<()> {
        self.git_command(&["push", "--quiet", remote, refspec])
            .await?;
        Ok(())
    }

    /// Bring the current branch up to date with its upstream and push it.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if either step fails.
    pub async fn publish_current_branch(&self) -> GmashResult<()> {
        self.git_command(&["pull", "--no-rebase", "--quiet"])
            .await?;
        self.git_command(&["push", "--quiet"]).await?;
        Ok(())
    }

    /// `git worktree add --detach <path> <rev>`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the worktree cannot be created.
    pub async fn worktree_add_detached(&self, path: &Path, rev: &str) -> GmashResult<()> {
        self.git_command(&["worktree", "add", "--detach", "--quiet", &path_arg(path), rev])
            .await?;
        Ok(())
    }

    /// `git worktree remove --force <path>`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the worktree is unknown.
    pub async fn worktree_remove(&self, path: &Path) -> GmashResult<()> {
        self.git_command(&["worktree", "remove", "--force", &path_arg(path)])
            .await?;
        Ok(())
    }

    /// Drop administrative entries for worktrees that no longer exist.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn worktree_prune(&self) -> GmashResult<()> {
        self.git_command(&["worktree", "prune"]).await?;
        Ok(())
    }

    /// Force-delete a local branch.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch does not exist or is checked out.
    pub async fn delete_branch(&self, name: &str) -> GmashResult<()> {
        self.git_command(&["branch", "-D", name]).await?;
        Ok(())
    }

    /// Stage paths.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn add(&self, paths: &[&str]) -> GmashResult<()> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        self.git_command(&args).await?;
        Ok(())
    }

    /// Remove tracked content under `path` from index and disk.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails.
    pub async fn remove_tracked(&self, path: &str) -> GmashResult<()> {
        self.git_command(&["rm", "-r", "-q", "--ignore-unmatch", "--", path])
            .await?;
        Ok(())
    }

    /// Commit whatever is staged.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the commit fails.
    pub async fn commit(&self, message: &str) -> GmashResult<()> {
        self.git_command(&["commit", "--quiet", "-m", message])
            .await?;
        Ok(())
    }
}
