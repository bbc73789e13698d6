// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options available for all commands.
//!
//! # Option Precedence
//!
//! ```text
//! --config FILE     ← Additional config files (can repeat)
//! --set KEY=VAL     ← Direct config override (can repeat)
//! -v / -vv / -vvv   ← Console verbosity: info, debug, trace
//! --log-level N     ← Console verbosity (0-6), wins over -v
//! --file-log-level  ← File verbosity (defaults to trace)
//! --log-file FILE   ← Also log to FILE
//!
//! Precedence: --set > env > --config > .gmash/config.toml > defaults
//! ```

use clap::{ArgAction, Args};
use std::path::PathBuf;

use crate::logging::LogLevel;

/// Global options available for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Path to additional TOML configuration file(s).
    /// Can be specified multiple times; later files win.
    #[arg(short = 'c', long = "config", value_name = "FILE", action = ArgAction::Append)]
    pub configs: Vec<PathBuf>,

    /// Sets an option, such as 'mono.publish=false'.
    /// Can be specified multiple times.
    #[arg(long = "set", value_name = "KEY=VALUE", action = ArgAction::Append)]
    pub options: Vec<String>,

    /// Increases console verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace, 6=dump).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub log_level: Option<u8>,

    /// File log level, defaults to trace.
    #[arg(long = "file-log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub file_log_level: Option<u8>,

    /// Path to log file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl GlobalOptions {
    /// Console level: `--log-level` if given, otherwise derived from `-v`.
    #[must_use]
    pub fn console_level(&self) -> LogLevel {
        self.log_level
            .and_then(LogLevel::from_u8)
            .unwrap_or_else(|| LogLevel::from_verbosity(self.verbose))
    }

    #[must_use]
    pub fn file_level(&self) -> LogLevel {
        self.file_log_level
            .and_then(LogLevel::from_u8)
            .unwrap_or(LogLevel::TRACE)
    }
}
