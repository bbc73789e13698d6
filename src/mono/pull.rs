// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `mono pull`: merge upstream changes into a subtree prefix.

use bon::Builder;
use tracing::{info, warn};

use crate::error::{GitError, GmashResult};
use crate::git::MergeStatus;
use crate::mono::{BatchReport, Monorepo, guard, pull_message};

/// Arguments of `mono pull`.
///
/// Only `remote` is required for a single subtree; `branch` and `prefix`
/// fall back to the record.
#[derive(Debug, Clone, Default, Builder)]
pub struct PullOptions {
    #[builder(into)]
    pub remote: Option<String>,
    #[builder(into)]
    pub branch: Option<String>,
    #[builder(into)]
    pub prefix: Option<String>,
}

/// What a single pull did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// A merge commit (or fast-forward) moved HEAD.
    Updated,
    UpToDate,
}

/// Pull one subtree.
///
/// # Errors
///
/// Returns a guard failure, `GitError::MergeConflict` after aborting a
/// conflicted merge, or any other `GitError`.
pub async fn pull_subtree(repo: &Monorepo, opts: &PullOptions) -> GmashResult<PullOutcome> {
    let git = repo.git();
    guard::assert_working_tree_clean(git).await?;
    let remote = guard::assert_required_arg(opts.remote.as_deref(), "remote")?;
    guard::assert_remote_exists(git, remote).await?;

    let given = |value: Option<&str>| {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let branch = given(opts.branch.as_deref());
    let prefix = given(opts.prefix.as_deref());
    let record = if branch.is_none() || prefix.is_none() {
        Some(guard::assert_metadata_exists(repo.store(), remote)?)
    } else {
        // Only squash is read from the record here.
        match repo.store().load(remote) {
            Ok(record) => Some(record),
            Err(e) => {
                if repo.store().exists(remote) {
                    warn!(remote, error = %e, "unreadable record, pulling without squash");
                }
                None
            }
        }
    };

    let branch = branch
        .or_else(|| record.as_ref().map(|r| r.branch.clone()))
        .unwrap_or_default();
    let prefix = prefix
        .or_else(|| record.as_ref().map(|r| r.prefix.clone()))
        .unwrap_or_default();
    let prefix = guard::assert_prefix_valid(&prefix)?;
    let squash = record.as_ref().is_some_and(|r| r.squash);
    guard::assert_path_exists(repo.root(), &prefix)?;

    let before = git.head().await?;
    let status = git
        .subtree_pull(&prefix, remote, &branch, squash, &pull_message(remote, &branch, &prefix))
        .await?;
    if status == MergeStatus::Conflicted {
        return Err(GitError::MergeConflict {
            what: format!("{remote}/{branch}"),
            into: prefix,
        }
        .into());
    }

    let outcome = if git.head().await? == before {
        PullOutcome::UpToDate
    } else {
        PullOutcome::Updated
    };
    info!(remote, prefix = %prefix, ?outcome, "pull finished");
    Ok(outcome)
}

/// Pull every recorded subtree, continuing past failures.
///
/// Corrupt records are skipped with a warning. An interrupt stops the batch.
///
/// # Errors
///
/// Returns an error only if the metadata directory cannot be listed or the
/// run was interrupted.
pub async fn pull_all(repo: &Monorepo) -> GmashResult<BatchReport> {
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

        let opts = PullOptions::builder()
            .remote(record.remote.clone())
            .branch(record.branch.clone())
            .prefix(record.prefix.clone())
            .build();
        match pull_subtree(repo, &opts).await {
            Ok(PullOutcome::Updated) => report.succeeded.push(record.remote),
            Ok(PullOutcome::UpToDate) => report.unchanged.push(record.remote),
            Err(e) if e.is_interrupted() => return Err(e),
            Err(e) => {
                warn!(remote = %record.remote, error = %e, "pull failed");
                report.failed.push((record.remote, e.to_string()));
            }
        }
    }
    Ok(report)
}
