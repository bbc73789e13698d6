// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Async process spawning and management.
//!
//! ```text
//! ProcessBuilder::new("git")
//!   .args() .cwd() .env() .capture_output()
//!   .run() / .run_with_cancellation()
//!       --> tokio::process::Command
//!           collect stdout/stderr
//!       --> ProcessOutput { exit_code, stdout, stderr, interrupted }
//! ```
//!
//! Processes are awaited one at a time; callers never run two children
//! concurrently.

pub mod builder;
mod io;
mod runner;
