// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `mono` command arguments.
//!
//! # Subcommands
//!
//! ```text
//! mono subtree -p PREFIX -r REMOTE -l URL -b BRANCH [-s] [-n -N NAME -O OWNER]
//!   → register an external repo under PREFIX
//! mono remove -r REMOTE [-p PREFIX] [-k]
//!   → drop subtree, record and remote
//! mono pull -r REMOTE [-b BRANCH] [-p PREFIX] | -a
//!   → merge upstream into the prefix
//! mono push -r REMOTE [-p PREFIX] [-B BRANCH] [-t TMP] [-T DIR] [-P] [-s|--no-squash] | -a
//!   → two-way sync with upstream
//! mono clone URL [DIR] [-b BRANCH] [-f]
//!   → clone and restore subtree remotes
//! mono list [--json]
//! ```
//!
//! Required values are optional at the clap level so that the engines'
//! ordered guards decide which one is reported first.

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Arguments for the `mono` command.
#[derive(Debug, Clone, Args)]
pub struct MonoArgs {
    /// Mono subcommand.
    #[command(subcommand)]
    pub subcommand: MonoSubcommand,
}

/// Mono subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum MonoSubcommand {
    /// Adds an external repository as a subtree and records it.
    Subtree(SubtreeArgs),

    /// Removes a subtree, its metadata record and its remote.
    Remove(RemoveArgs),

    /// Pulls upstream changes into a subtree.
    Pull(PullArgs),

    /// Synchronises a subtree with its upstream in both directions.
    Push(PushArgs),

    /// Clones a monorepo and re-adds the remotes of its subtrees.
    Clone(CloneArgs),

    /// Lists recorded subtrees.
    List(ListArgs),
}

/// Arguments for `mono subtree`.
#[derive(Debug, Clone, Args)]
pub struct SubtreeArgs {
    /// Directory of the subtree, relative to the repository root.
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,

    /// Alias of the remote to create.
    #[arg(short = 'r', long)]
    pub remote: Option<String>,

    /// URL of the external repository.
    #[arg(short = 'l', long)]
    pub url: Option<String>,

    /// Branch to import; with --new, defaults to the configured default branch.
    #[arg(short = 'b', long)]
    pub branch: Option<String>,

    /// Squash upstream history into a single commit.
    #[arg(short = 's', long)]
    pub squash: bool,

    /// Creates the repository on GitHub first.
    #[arg(short = 'n', long = "new")]
    pub new_repo: bool,

    /// Name of the repository to create.
    #[arg(short = 'N', long, requires = "new_repo")]
    pub name: Option<String>,

    /// Owner (user or organisation) of the repository to create.
    #[arg(short = 'O', long, requires = "new_repo")]
    pub owner: Option<String>,
}

/// Arguments for `mono remove`.
#[derive(Debug, Clone, Args)]
pub struct RemoveArgs {
    /// Remote of the subtree to remove.
    #[arg(short = 'r', long)]
    pub remote: Option<String>,

    /// Prefix to delete instead of the recorded one.
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,

    /// Keeps the git remote.
    #[arg(short = 'k', long = "keep-remote")]
    pub keep_remote: bool,
}

/// Arguments for `mono pull`.
#[derive(Debug, Clone, Args)]
pub struct PullArgs {
    /// Remote of the subtree to pull.
    #[arg(short = 'r', long, conflicts_with = "all")]
    pub remote: Option<String>,

    /// Upstream branch; defaults to the recorded one.
    #[arg(short = 'b', long)]
    pub branch: Option<String>,

    /// Subtree prefix; defaults to the recorded one.
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,

    /// Pulls every recorded subtree.
    #[arg(short = 'a', long)]
    pub all: bool,
}

/// Arguments for `mono push`.
#[derive(Debug, Clone, Args)]
pub struct PushArgs {
    /// Subtree prefix; defaults to the recorded one.
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,

    /// Remote of the subtree to push.
    #[arg(short = 'r', long, conflicts_with = "all")]
    pub remote: Option<String>,

    /// Upstream branch to push to; defaults to the recorded one.
    #[arg(short = 'B', long = "branch", value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Name of the temporary split branch.
    #[arg(short = 't', long = "temp-branch", value_name = "BRANCH")]
    pub temp_branch: Option<String>,

    /// Directory for the temporary worktree.
    #[arg(short = 'T', long = "temp-dir", value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Pushes every recorded subtree.
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Opens a pull request when the upstream merge conflicts.
    #[arg(short = 'P', long = "pull-request")]
    pub pull_request: bool,

    /// Expects a squashed subtree.
    #[arg(short = 's', long, overrides_with = "no_squash")]
    pub squash: bool,

    /// Expects a subtree with full history.
    #[arg(long = "no-squash", overrides_with = "squash")]
    pub no_squash: bool,
}

impl PushArgs {
    /// The squash mode requested on the command line, if any.
    #[must_use]
    pub const fn squash_mode(&self) -> Option<bool> {
        match (self.squash, self.no_squash) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Arguments for `mono clone`.
#[derive(Debug, Clone, Args)]
pub struct CloneArgs {
    /// URL of the monorepo.
    pub url: String,

    /// Destination directory.
    pub directory: Option<PathBuf>,

    /// Branch to check out.
    #[arg(short = 'b', long)]
    pub branch: Option<String>,

    /// Fetches every restored remote.
    #[arg(short = 'f', long)]
    pub fetch: bool,
}

/// Arguments for `mono list`.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Prints records as JSON.
    #[arg(long)]
    pub json: bool,
}
