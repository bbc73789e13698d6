// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command-line surface (clap derive).
//!
//! ```text
//! gmash [-c FILE]... [--set K=V]... [-v|-l N] [--log-file F] <command>
//!   version
//!   options
//!   mono subtree | remove | pull | push | clone | list
//! ```

pub mod global;
pub mod mono;


use crate::cli::global::GlobalOptions;
use crate::cli::mono::MonoArgs;
use clap::{Parser, Subcommand};

/// Monorepo subtree toolbox.
#[derive(Debug, Parser)]
#[command(
    name = "gmash",
    author,
    version,
    about = "Monorepo subtree toolbox",
    long_about = "gmash Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Tracks external repositories as git subtrees of a monorepo and\n\
                  keeps them in sync in both directions. See\n\
                  `gmash mono <command> --help` for more information.",
    after_help = "CONFIGURATION:\n\n\
                  Settings are read from <repo root>/.gmash/config.toml when\n\
                  present, then from every --config file in order, then from\n\
                  GMASH_* environment variables (GMASH_MONO__PUBLISH=false), and\n\
                  finally from --set overrides. `gmash options` prints the result."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the version.
    Version,

    /// Print every option with its resolved value.
    Options,

    /// Track subtrees and keep them in sync.
    Mono(MonoArgs),
}

/// Parse `std::env::args`, exiting with usage on error.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
