// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!            Public API
//!        query.rs     cmd.rs
//!            \          /
//!             v        v
//!      ,-------------------------,
//!      |        backend          |
//!      '----+---------------+----'
//!           |               |
//!           v               v
//!       GixBackend     ShellBackend
//!      (gix, read)   (git CLI, async)
//!       .work_dir      .git_command / .check
//!       .branch        .subtree_* / .worktree_*
//!       .tracked_under .merge / .push / .fetch
//!                      .remotes / .is_ignored
//! ```
//!
//! **`GixBackend`** is pure Rust, no subprocess, read-only.
//! **`ShellBackend`** runs the git CLI under a cancellation token.

pub mod backend;
pub mod cmd;
pub mod query;

pub use backend::ShellBackend;
pub use cmd::MergeStatus;
