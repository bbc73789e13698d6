// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `gmash version` and `gmash options`.

use crate::config::Config;

/// One `key = value` line per option, after all layers are applied.
pub fn run_options_command(config: &Config) {
    for line in config.format_options() {
        println!("{line}");
    }
}

pub fn run_version_command() {
    println!("gmash {}", env!("CARGO_PKG_VERSION"));
}
