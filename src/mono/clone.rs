// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `mono clone`: clone a monorepo and restore its subtree remotes.
//!
//! Remotes are not part of a clone, but every record names one; re-adding
//! them makes `pull` and `push` work in the fresh checkout.

use std::path::PathBuf;

use bon::Builder;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{GmashResult, GuardError};
use crate::git::ShellBackend;
use crate::mono::guard;
use crate::mono::store::MetadataStore;

/// Arguments of `mono clone`.
#[derive(Debug, Clone, Builder)]
pub struct CloneOptions {
    #[builder(into)]
    pub url: String,
    /// Defaults to the last path segment of `url` without `.git`.
    pub directory: Option<PathBuf>,
    /// Branch to check out after cloning.
    #[builder(into)]
    pub branch: Option<String>,
    /// Fetch each restored remote.
    #[builder(default)]
    pub fetch: bool,
}

/// Per-remote result of a clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneReport {
    pub path: PathBuf,
    pub added: Vec<String>,
    /// Remote or record name, with the reason it was not added.
    pub skipped: Vec<(String, String)>,
    pub failed: Vec<(String, String)>,
}

/// Directory `git clone` would pick for `url`.
#[must_use]
pub fn directory_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    (!name.is_empty()).then(|| name.to_string())
}

/// Clone `opts.url` and re-add the remote of every valid record.
///
/// `git` runs in the directory relative destinations are resolved against.
///
/// # Errors
///
/// Returns `GuardError::PathExists` if the destination exists, or the
/// `GitError` of a failed clone or checkout. Remote failures are reported,
/// not returned.
pub async fn clone_monorepo(
    git: &ShellBackend,
    config: &Config,
    opts: &CloneOptions,
) -> GmashResult<CloneReport> {
    let url = guard::assert_required_arg(Some(&opts.url), "url")?;
    let directory = match &opts.directory {
        Some(directory) => directory.clone(),
        None => PathBuf::from(
            directory_from_url(url)
                .ok_or_else(|| GuardError::MissingArgument("directory".to_string()))?,
        ),
    };
    let dest = git.cwd().join(directory);
    guard::assert_clone_target_absent(&dest)?;

    git.clone_into(url, &dest).await?;
    let cloned = git.in_dir(&dest);
    if let Some(branch) = opts.branch.as_deref().filter(|b| !b.trim().is_empty()) {
        cloned.checkout(branch).await?;
    }

    let mut report = CloneReport {
        path: dest.clone(),
        ..CloneReport::default()
    };
    let store = MetadataStore::new(&dest, &config.mono.metadata_dir);
    for stored in store.list()? {
        let record = match stored.record {
            Ok(record) => record,
            Err(e) => {
                warn!(record = %stored.name, error = %e, "skipping unreadable record");
                report.skipped.push((stored.name, e.to_string()));
                continue;
            }
        };
        if record.url.is_empty() {
            warn!(remote = %record.remote, "record has no url");
            report
                .skipped
                .push((record.remote, "record has no url".to_string()));
            continue;
        }
        if cloned.remote_exists(&record.remote).await? {
            report
                .skipped
                .push((record.remote, "remote already exists".to_string()));
            continue;
        }
        match cloned.add_remote(&record.remote, &record.url, opts.fetch).await {
            Ok(()) => {
                info!(remote = %record.remote, url = %record.url, "remote restored");
                report.added.push(record.remote);
            }
            Err(e) if e.is_interrupted() => return Err(e),
            Err(e) => {
                warn!(remote = %record.remote, error = %e, "failed to add remote");
                report.failed.push((record.remote, e.to_string()));
            }
        }
    }
    Ok(report)
}
