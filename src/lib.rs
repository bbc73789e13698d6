// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |            version / options / mono
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, layered settings  |
//!              '-------------+-------------'
//!                            v
//!              ,---------------------------,
//!              |           mono            |
//!              |  guard, store, subtree,   |
//!              |  remove, pull, push, ...  |
//!              '------+-------------+------'
//!                     |             |
//!                     v             v
//!                    git          github
//!                 gix/CLI         gh CLI
//!
//!   +-----------------------------------------+
//!   |  core   process (tokio, cancellation)   |
//!   +-----------------------------------------+
//!   |  foundation   error, logging            |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod core;
pub mod error;
pub mod git;
pub mod github;
pub mod logging;
pub mod mono;
