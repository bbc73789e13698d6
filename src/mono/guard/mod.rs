// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Preconditions.
//!
//! Each check either returns the value it validated or a [`GuardError`];
//! none of them mutate the repository. Engines call them in a fixed order
//! so that the first violated condition is the one reported.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::config::types::Visibility;
use crate::error::{GmashResult, GuardError};
use crate::git::ShellBackend;
use crate::git::query;
use crate::github::{GithubCli, RepoSlug};
use crate::mono::store::{MetadataStore, SubtreeRecord};

/// Repository root of the work tree containing `path`.
///
/// # Errors
///
/// Returns `GuardError::NotAGitRepo` outside a work tree (bare repositories
/// included).
pub fn assert_inside_git_repo(path: &Path) -> GmashResult<PathBuf> {
    query::work_dir(path).map_err(|e| {
        debug!(error = %e, path = %path.display(), "repository discovery failed");
        GuardError::NotAGitRepo {
            path: path.display().to_string(),
        }
        .into()
    })
}

/// # Errors
///
/// Returns `GuardError::DirtyWorkingTree` if the index or the work tree has
/// uncommitted changes to tracked files.
pub async fn assert_working_tree_clean(git: &ShellBackend) -> GmashResult<()> {
    if git.has_unstaged_changes().await? || git.has_staged_changes().await? {
        return Err(GuardError::DirtyWorkingTree.into());
    }
    Ok(())
}

/// The trimmed value of a required argument.
///
/// # Errors
///
/// Returns `GuardError::MissingArgument` if `value` is absent or blank.
pub fn assert_required_arg<'a>(value: Option<&'a str>, name: &str) -> GmashResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GuardError::MissingArgument(name.to_string()).into())
}

/// Normalize a subtree prefix to `a/b` form.
///
/// A leading `./` and trailing slashes are dropped. Backslashes are taken
/// literally.
///
/// # Errors
///
/// Returns `GuardError::InvalidPrefix` for the repository root, absolute
/// paths and anything containing `..`.
pub fn assert_prefix_valid(prefix: &str) -> GmashResult<String> {
    let invalid = |reason: &str| -> crate::error::GmashError {
        GuardError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason: reason.to_string(),
        }
        .into()
    };

    if prefix.starts_with('/') || Path::new(prefix).is_absolute() {
        return Err(invalid("must be relative to the repository root"));
    }

    let mut parts = Vec::new();
    for component in Path::new(prefix).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("must be relative to the repository root"));
            }
        }
    }
    if parts.is_empty() {
        return Err(invalid("must not be the repository root"));
    }
    Ok(parts.join("/"))
}

/// Remote aliases double as metadata file names.
///
/// # Errors
///
/// Returns `GuardError::InvalidRemoteName` for names containing path
/// separators, whitespace, or starting with `.` or `-`.
pub fn assert_remote_name_valid(remote: &str) -> GmashResult<()> {
    let reason = if remote.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if remote.starts_with('.') {
        Some("must not start with '.'")
    } else if remote.starts_with('-') {
        Some("must not start with '-'")
    } else if remote.contains(char::is_whitespace) {
        Some("must not contain whitespace")
    } else {
        None
    };
    reason.map_or(Ok(()), |reason| {
        Err(GuardError::InvalidRemoteName {
            remote: remote.to_string(),
            reason: reason.to_string(),
        }
        .into())
    })
}

/// # Errors
///
/// Returns `GuardError::RemoteNotFound` if no remote has this alias.
pub async fn assert_remote_exists(git: &ShellBackend, remote: &str) -> GmashResult<()> {
    if git.remote_exists(remote).await? {
        Ok(())
    } else {
        Err(GuardError::RemoteNotFound {
            remote: remote.to_string(),
        }
        .into())
    }
}

/// # Errors
///
/// Returns `GuardError::RemoteAlreadyExists` if the alias is taken.
pub async fn assert_remote_unused(git: &ShellBackend, remote: &str) -> GmashResult<()> {
    if git.remote_exists(remote).await? {
        Err(GuardError::RemoteAlreadyExists {
            remote: remote.to_string(),
        }
        .into())
    } else {
        Ok(())
    }
}

fn same_url(a: &str, b: &str) -> bool {
    let norm = |url: &str| url.trim().trim_end_matches('/').trim_end_matches(".git").to_string();
    norm(a) == norm(b)
}

/// # Errors
///
/// Returns `GuardError::UrlAlreadyBound` if another remote already points at
/// `url` (ignoring a trailing `/` or `.git`).
pub async fn assert_remote_url_unused(git: &ShellBackend, url: &str) -> GmashResult<()> {
    match git
        .remote_urls()
        .await?
        .into_iter()
        .find(|(_, bound)| same_url(bound, url))
    {
        Some((remote, _)) => Err(GuardError::UrlAlreadyBound {
            url: url.to_string(),
            remote,
        }
        .into()),
        None => Ok(()),
    }
}

/// The prefix must not exist, or be an empty directory with nothing tracked
/// below it.
///
/// # Errors
///
/// Returns `GuardError::PathNotEmpty` otherwise.
pub fn assert_directory_empty_or_nonexistent(root: &Path, prefix: &str) -> GmashResult<()> {
    let path = root.join(prefix);
    let not_empty = || -> crate::error::GmashError {
        GuardError::PathNotEmpty {
            path: prefix.to_string(),
        }
        .into()
    };

    if path.is_dir() {
        let mut entries = fs::read_dir(&path)?;
        if entries.next().is_some() {
            return Err(not_empty());
        }
    } else if path.exists() {
        return Err(not_empty());
    }

    if query::has_tracked_under(root, prefix)? {
        return Err(not_empty());
    }
    Ok(())
}

/// # Errors
///
/// Returns `GuardError::PathIgnored` if `.gitignore` rules exclude `prefix`.
pub async fn assert_path_not_gitignored(git: &ShellBackend, prefix: &str) -> GmashResult<()> {
    if git.is_ignored(prefix).await? {
        Err(GuardError::PathIgnored {
            path: prefix.to_string(),
        }
        .into())
    } else {
        Ok(())
    }
}

/// # Errors
///
/// Returns `GuardError::RemoteUnreachable` with git's message if
/// `git ls-remote --heads` fails.
pub async fn assert_remote_url_accessible(git: &ShellBackend, url: &str) -> GmashResult<()> {
    git.ls_remote_heads(url).await?.map_err(|message| {
        GuardError::RemoteUnreachable {
            url: url.to_string(),
            message,
        }
        .into()
    })
}

/// Load the record for `remote`.
///
/// # Errors
///
/// Returns `GuardError::MetadataMissing` if no file exists, or the parse
/// error of an existing but corrupt file.
pub fn assert_metadata_exists(store: &MetadataStore, remote: &str) -> GmashResult<SubtreeRecord> {
    if !store.exists(remote) {
        return Err(GuardError::MetadataMissing {
            remote: remote.to_string(),
            path: store.relative_path(remote),
        }
        .into());
    }
    store.load(remote)
}

/// # Errors
///
/// Returns `GuardError::MetadataExists` if a record for `remote` is present.
pub fn assert_metadata_absent(store: &MetadataStore, remote: &str) -> GmashResult<()> {
    if store.exists(remote) {
        Err(GuardError::MetadataExists {
            remote: remote.to_string(),
            path: store.relative_path(remote),
        }
        .into())
    } else {
        Ok(())
    }
}

/// # Errors
///
/// Returns `GuardError::PathMissing` if the subtree directory is gone.
pub fn assert_path_exists(root: &Path, prefix: &str) -> GmashResult<()> {
    if root.join(prefix).exists() {
        Ok(())
    } else {
        Err(GuardError::PathMissing {
            path: prefix.to_string(),
        }
        .into())
    }
}

/// # Errors
///
/// Returns `GuardError::PathExists` if something already lives at `path`.
pub fn assert_clone_target_absent(path: &Path) -> GmashResult<()> {
    if path.exists() {
        Err(GuardError::PathExists {
            path: path.display().to_string(),
        }
        .into())
    } else {
        Ok(())
    }
}

/// Provision `owner/name` on GitHub and return its clone URL.
///
/// # Errors
///
/// Returns `GuardError::RepoCreationFailed` with the `gh` diagnostics, or
/// the interruption unchanged.
pub async fn create_new_github_repo(
    gh: &GithubCli,
    name: &str,
    owner: &str,
    visibility: Visibility,
) -> GmashResult<String> {
    gh.create_repo(&RepoSlug::new(owner, name), visibility)
        .await
        .map_err(|e| {
            if e.is_interrupted() {
                return e;
            }
            GuardError::RepoCreationFailed {
                owner: owner.to_string(),
                name: name.to_string(),
                message: e.to_string(),
            }
            .into()
        })
}

/// Whether the `gh` user can push to `url`. Never fails.
pub async fn check_repo_access(gh: &GithubCli, url: &str) -> bool {
    let owned = gh.can_push(url).await;
    if !owned {
        info!(url, "no push access detected, recording subtree as not owned");
    }
    owned
}
