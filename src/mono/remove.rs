// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `mono remove`: drop a subtree, its record and its remote.

use std::fs;

use bon::Builder;
use tracing::{info, warn};

use crate::error::GmashResult;
use crate::mono::store::SubtreeRecord;
use crate::mono::{Monorepo, guard, remove_message};

/// Arguments of `mono remove`.
#[derive(Debug, Clone, Default, Builder)]
pub struct RemoveOptions {
    #[builder(into)]
    pub remote: Option<String>,
    /// Defaults to the recorded prefix.
    #[builder(into)]
    pub prefix: Option<String>,
    #[builder(default)]
    pub keep_remote: bool,
}

/// Remove a registered subtree in one commit.
///
/// Returns the record that was removed.
///
/// # Errors
///
/// Returns a guard failure (dirty tree, missing remote argument, missing
/// record) before touching anything, or the `GitError` of a failed step.
pub async fn remove_subtree(repo: &Monorepo, opts: &RemoveOptions) -> GmashResult<SubtreeRecord> {
    let git = repo.git();
    guard::assert_working_tree_clean(git).await?;
    let remote = guard::assert_required_arg(opts.remote.as_deref(), "remote")?;
    let record = guard::assert_metadata_exists(repo.store(), remote)?;

    let prefix = match opts.prefix.as_deref() {
        Some(prefix) if !prefix.trim().is_empty() => prefix,
        _ => record.prefix.as_str(),
    };
    let prefix = guard::assert_prefix_valid(prefix)?;

    git.remove_tracked(&prefix).await?;
    let leftover = repo.prefix_path(&prefix);
    if leftover.is_dir() {
        fs::remove_dir_all(&leftover)?;
    } else if leftover.exists() {
        fs::remove_file(&leftover)?;
    }

    let relative = repo.store().relative_path(remote);
    git.remove_tracked(&relative).await?;
    let record_path = repo.store().path_for(remote);
    if record_path.exists() {
        fs::remove_file(&record_path)?;
    }

    if !opts.keep_remote {
        if git.remote_exists(remote).await? {
            git.remove_remote(remote).await?;
        } else {
            warn!(remote, "remote already gone");
        }
    }

    if git.has_staged_changes().await? {
        git.commit(&remove_message(remote, &prefix)).await?;
    }

    info!(remote, prefix = %prefix, kept_remote = opts.keep_remote, "subtree removed");
    Ok(record)
}
