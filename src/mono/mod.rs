// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Monorepo subtree management.
//!
//! ```text
//!  subtree   remove   pull   push   clone   list
//!     \        |       |      |       |      /
//!      v       v       v      v       v     v
//!   ,------------------------------------------,
//!   |  guard   preconditions, fail before any  |
//!   |          mutating git command            |
//!   '-----+-------------------------+----------'
//!         |                         |
//!         v                         v
//!   store (records)         git::ShellBackend
//!   .gmash/subtree/*.conf   github::GithubCli
//! ```
//!
//! Every engine takes a [`Monorepo`] plus an options struct and returns a
//! typed outcome; printing is left to the command layer.

pub mod clone;
pub mod guard;
pub mod list;
pub mod pull;
pub mod push;
pub mod remove;
pub mod store;
pub mod subtree;


use std::fmt;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::GmashResult;
use crate::git::ShellBackend;
use crate::github::GithubCli;

use store::MetadataStore;

pub use clone::{CloneOptions, CloneReport};
pub use pull::{PullOptions, PullOutcome};
pub use push::{PushOptions, PushOutcome};
pub use remove::RemoveOptions;
pub use subtree::SubtreeOptions;

/// A discovered monorepo and the runners bound to it.
#[derive(Debug, Clone)]
pub struct Monorepo {
    root: PathBuf,
    git: ShellBackend,
    gh: GithubCli,
    store: MetadataStore,
    config: Config,
}

impl Monorepo {
    /// Locate the work tree containing `start`.
    ///
    /// # Errors
    ///
    /// Returns `GuardError::NotAGitRepo` if `start` is not inside a work tree.
    pub fn discover(start: &Path, config: &Config, cancel: CancellationToken) -> GmashResult<Self> {
        let root = guard::assert_inside_git_repo(start)?;
        Ok(Self {
            git: ShellBackend::new(&config.tools.git, &root, cancel.clone()),
            gh: GithubCli::from_config(config, cancel),
            store: MetadataStore::new(&root, &config.mono.metadata_dir),
            config: config.clone(),
            root,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn git(&self) -> &ShellBackend {
        &self.git
    }

    #[must_use]
    pub const fn gh(&self) -> &GithubCli {
        &self.gh
    }

    #[must_use]
    pub const fn store(&self) -> &MetadataStore {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Absolute path of a `/`-separated prefix.
    #[must_use]
    pub fn prefix_path(&self, prefix: &str) -> PathBuf {
        self.root.join(prefix)
    }
}

// --- Commit messages ---

/// Message of the commit that records a new subtree.
#[must_use]
pub fn track_message(remote: &str, prefix: &str, url: &str, metadata: &str) -> String {
    format!(
        "gmash: track subtree {remote} at {prefix}\n\n\
         url: {url}\n\
         remote: {remote}\n\
         prefix: {prefix}\n\
         metadata: {metadata}"
    )
}

#[must_use]
pub fn remove_message(remote: &str, prefix: &str) -> String {
    format!("gmash: remove subtree {remote} at {prefix}")
}

#[must_use]
pub fn pull_message(remote: &str, branch: &str, prefix: &str) -> String {
    format!("gmash: pull {remote}/{branch} into {prefix}")
}

#[must_use]
pub fn sync_message(remote: &str, branch: &str, prefix: &str) -> String {
    format!("gmash: sync {prefix} with {remote}/{branch}")
}

// --- Batch reporting ---

/// Result of an `--all` run over every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Subtrees that changed (new merge, pull or pull request).
    pub succeeded: Vec<String>,
    /// Subtrees that were already in sync.
    pub unchanged: Vec<String>,
    /// Records that could not be parsed, with the reason.
    pub skipped: Vec<(String, String)>,
    /// Subtrees whose operation failed, with the error.
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    /// A batch succeeds unless some subtree failed; skips do not count.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} unchanged, {} skipped, {} failed",
            self.succeeded.len(),
            self.unchanged.len(),
            self.skipped.len(),
            self.failed.len()
        )?;
        for (name, reason) in &self.failed {
            write!(f, "\n  failed  {name}: {reason}")?;
        }
        for (name, reason) in &self.skipped {
            write!(f, "\n  skipped {name}: {reason}")?;
        }
        Ok(())
    }
}
