// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `mono push`: two-way synchronisation of a subtree with its upstream.
//!
//! ```text
//!  fetch <remote> <branch>
//!      |
//!      +-- HEAD:<prefix> == <remote>/<branch> ------------------> AlreadySynced
//!      |
//!  subtree pull [--squash]           (publish if HEAD moved)
//!      |   conflict without -P ---------------------------------> MergeConflict
//!      |
//!      +-- equal now -------------------------------------------> Pulled
//!      |
//!  ,-- SyncWorktree (detached at HEAD) --------------------------,
//!  |  subtree split [--rejoin] -> <tmp>                          |
//!  |  merge <remote>/<branch> [--allow-unrelated-histories]      |
//!  |     conflict + -P ---- push <tmp>, gh pr create ------------+-> PullRequest
//!  |  push <tmp>:refs/heads/<branch>                             |
//!  '-- release: worktree remove, branch -D, prune  (always) -----'
//!      |
//!  fetch, merge -s subtree FETCH_HEAD, publish -----------------> Synced
//! ```

mod worktree;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use bon::Builder;
use tracing::{info, warn};

use crate::error::{GitError, GmashResult};
use crate::git::{MergeStatus, query};
use crate::github::parse_repo_url;
use crate::mono::store::SubtreeRecord;
use crate::mono::{BatchReport, Monorepo, guard, pull_message, sync_message};

pub use worktree::SyncWorktree;

/// Arguments of `mono push`.
#[derive(Debug, Clone, Default, Builder)]
pub struct PushOptions {
    #[builder(into)]
    pub remote: Option<String>,
    /// Defaults to the recorded prefix.
    #[builder(into)]
    pub prefix: Option<String>,
    /// Defaults to the recorded branch.
    #[builder(into)]
    pub branch: Option<String>,
    /// Name of the temporary split branch.
    #[builder(into)]
    pub temp_branch: Option<String>,
    /// Where to create the temporary worktree; must not exist or be empty.
    pub temp_dir: Option<PathBuf>,
    /// Open a pull request instead of failing on conflicts.
    #[builder(default)]
    pub pull_request: bool,
    /// Requested squash mode; the recorded one wins on mismatch.
    pub squash: Option<bool>,
}

/// What a single push did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Prefix and upstream were already identical.
    AlreadySynced,
    /// Pulling upstream was enough to make them identical.
    Pulled,
    /// Local changes were pushed upstream and merged back.
    Synced,
    /// The merge conflicted; changes were pushed to `branch` for review.
    PullRequest { branch: String, url: String },
}

impl PushOutcome {
    #[must_use]
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::AlreadySynced)
    }
}

/// Resolved push parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PushPlan {
    pub remote: String,
    pub branch: String,
    pub prefix: String,
    pub squash: bool,
    pub temp_branch: String,
    pub url: String,
}

/// Default temporary branch: `<prefix>-<remote>-<pid>`.
pub(crate) fn temp_branch_name(prefix: &str, remote: &str, pid: u32) -> String {
    format!("{prefix}-{remote}-{pid}")
}

/// Combine options with the record; explicit options win except for squash.
pub(crate) fn resolve_plan(
    opts: &PushOptions,
    record: &SubtreeRecord,
    temp_prefix: &str,
    pid: u32,
) -> PushPlan {
    let given = |value: Option<&String>| {
        value
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(requested) = opts.squash
        && requested != record.squash
    {
        warn!(
            remote = %record.remote,
            requested,
            recorded = record.squash,
            "squash mode differs from the recorded one, using the recorded mode"
        );
    }

    PushPlan {
        remote: record.remote.clone(),
        branch: given(opts.branch.as_ref()).unwrap_or_else(|| record.branch.clone()),
        prefix: given(opts.prefix.as_ref()).unwrap_or_else(|| record.prefix.clone()),
        squash: record.squash,
        temp_branch: given(opts.temp_branch.as_ref())
            .unwrap_or_else(|| temp_branch_name(temp_prefix, &record.remote, pid)),
        url: record.url.clone(),
    }
}

/// Merge-back needs `--allow-unrelated-histories` when the monorepo does not
/// share history with the upstream (squashed subtrees).
async fn merge_back(repo: &Monorepo, plan: &PushPlan) -> GmashResult<()> {
    let git = repo.git();
    git.fetch(&plan.remote, &plan.branch).await?;
    let unrelated = git.merge_base("HEAD", "FETCH_HEAD").await?.is_none();
    let status = git
        .merge_subtree(
            "FETCH_HEAD",
            unrelated,
            &sync_message(&plan.remote, &plan.branch, &plan.prefix),
        )
        .await?;
    if status == MergeStatus::Conflicted {
        return Err(GitError::MergeConflict {
            what: format!("{}/{}", plan.remote, plan.branch),
            into: plan.prefix.clone(),
        }
        .into());
    }
    Ok(())
}

/// Pull then push the current branch, if configured and it has an upstream.
async fn publish(repo: &Monorepo) -> GmashResult<bool> {
    if !repo.config().mono.publish {
        info!("publishing disabled by mono.publish");
        return Ok(false);
    }
    let Some(branch) = query::current_branch(repo.root())? else {
        info!("HEAD is detached, not publishing");
        return Ok(false);
    };
    if !repo.git().has_upstream().await? {
        info!(branch = %branch, "branch has no upstream, not publishing");
        return Ok(false);
    }
    repo.git().publish_current_branch().await?;
    info!(branch = %branch, "monorepo branch published");
    Ok(true)
}

/// Result of the work done inside the temporary worktree.
enum Split {
    Pushed,
    PullRequest { url: String },
}

async fn split_and_push(
    repo: &Monorepo,
    worktree: &SyncWorktree,
    plan: &PushPlan,
    pull_request: bool,
) -> GmashResult<Split> {
    let git = worktree.git();
    let upstream = format!("{}/{}", plan.remote, plan.branch);

    git.subtree_split(&plan.prefix, worktree.branch(), !plan.squash)
        .await?;
    git.checkout(worktree.branch()).await?;
    git.fetch(&plan.remote, &plan.branch).await?;
    let unrelated = git.merge_base(worktree.branch(), &upstream).await?.is_none();
    let message = format!("gmash: merge {upstream} into split of {}", plan.prefix);

    if git.merge(&upstream, unrelated, &message).await? == MergeStatus::Conflicted {
        if !pull_request {
            return Err(GitError::MergeConflict {
                what: upstream,
                into: format!("split of {}", plan.prefix),
            }
            .into());
        }
        let head = worktree.branch();
        git.push(&plan.remote, &format!("{head}:refs/heads/{head}"))
            .await?;
        let slug = parse_repo_url(&plan.url, repo.gh().host())?;
        let title = format!("Sync {} from monorepo", plan.prefix);
        let body = format!(
            "Automatic merge of the monorepo prefix `{}` into `{}` conflicted.\n\
             Resolve the conflicts on this branch and merge.",
            plan.prefix, plan.branch
        );
        let url = repo
            .gh()
            .create_pull_request(&slug, &plan.branch, head, &title, &body)
            .await?;
        return Ok(Split::PullRequest { url });
    }

    git.push(
        &plan.remote,
        &format!("{}:refs/heads/{}", worktree.branch(), plan.branch),
    )
    .await?;
    Ok(Split::Pushed)
}

/// Synchronise one subtree with its upstream.
///
/// # Errors
///
/// Returns a guard failure before anything changes, `GitError::MergeConflict`
/// when a merge conflicts (and no pull request was requested), or the
/// failing `GitError`/`GithubError`. The temporary worktree and branch are
/// removed on every path.
pub async fn push_subtree(repo: &Monorepo, opts: &PushOptions) -> GmashResult<PushOutcome> {
    let git = repo.git();
    let remote = guard::assert_required_arg(opts.remote.as_deref(), "remote")?;
    guard::assert_working_tree_clean(git).await?;
    guard::assert_remote_exists(git, remote).await?;
    let record = guard::assert_metadata_exists(repo.store(), remote)?;

    let mut plan = resolve_plan(
        opts,
        &record,
        &repo.config().mono.temp_branch_prefix,
        std::process::id(),
    );
    plan.prefix = guard::assert_prefix_valid(&plan.prefix)?;
    guard::assert_path_exists(repo.root(), &plan.prefix)?;

    let upstream = format!("{}/{}", plan.remote, plan.branch);
    git.fetch(&plan.remote, &plan.branch).await?;
    if git.prefix_matches(&plan.prefix, &upstream).await? {
        info!(remote = %plan.remote, prefix = %plan.prefix, "already in sync");
        return Ok(PushOutcome::AlreadySynced);
    }

    let before = git.head().await?;
    let status = git
        .subtree_pull(
            &plan.prefix,
            &plan.remote,
            &plan.branch,
            plan.squash,
            &pull_message(&plan.remote, &plan.branch, &plan.prefix),
        )
        .await?;
    if status == MergeStatus::Conflicted {
        if !opts.pull_request {
            return Err(GitError::MergeConflict {
                what: upstream,
                into: plan.prefix,
            }
            .into());
        }
        warn!(
            remote = %plan.remote,
            prefix = %plan.prefix,
            "pulling upstream conflicts, proposing local changes as a pull request"
        );
    } else if git.head().await? != before {
        publish(repo).await?;
        if git.prefix_matches(&plan.prefix, &upstream).await? {
            info!(remote = %plan.remote, prefix = %plan.prefix, "in sync after pull");
            return Ok(PushOutcome::Pulled);
        }
    }

    let (path, dir) = match &opts.temp_dir {
        Some(path) => (path.clone(), None),
        None => {
            let dir = tempfile::Builder::new().prefix("gmash-sync-").tempdir()?;
            (dir.path().join("worktree"), Some(dir))
        }
    };
    let worktree = SyncWorktree::acquire(git, path, dir, &plan.temp_branch).await?;
    let result = split_and_push(repo, &worktree, &plan, opts.pull_request).await;
    worktree.release().await;

    match result? {
        Split::PullRequest { url } => {
            info!(remote = %plan.remote, url, "opened pull request");
            Ok(PushOutcome::PullRequest {
                branch: plan.temp_branch,
                url,
            })
        }
        Split::Pushed => {
            merge_back(repo, &plan).await?;
            publish(repo).await?;
            info!(remote = %plan.remote, prefix = %plan.prefix, "subtree synced");
            Ok(PushOutcome::Synced)
        }
    }
}

/// Push every recorded subtree, continuing past failures.
///
/// # Errors
///
/// Returns an error only if the metadata directory cannot be listed or the
/// run was interrupted.
pub async fn push_all(repo: &Monorepo, pull_request: bool) -> GmashResult<BatchReport> {
    let mut report = BatchReport::default();
    for stored in repo.store().list()? {
        let record = match stored.record {
            Ok(record) => record,
            Err(e) => {
                warn!(record = %stored.name, error = %e, "skipping unreadable record");
                report.skipped.push((stored.name, e.to_string()));
                continue;
            }
        };

        let opts = PushOptions::builder()
            .remote(record.remote.clone())
            .pull_request(pull_request)
            .build();
        match push_subtree(repo, &opts).await {
            Ok(PushOutcome::AlreadySynced) => report.unchanged.push(record.remote),
            Ok(_) => report.succeeded.push(record.remote),
            Err(e) if e.is_interrupted() => return Err(e),
            Err(e) => {
                warn!(remote = %record.remote, error = %e, "push failed");
                report.failed.push((record.remote, e.to_string()));
            }
        }
    }
    Ok(report)
}
