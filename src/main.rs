// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Logging --> Ctrl-C watcher --> Config --> Command Dispatch
//!   Version | Options | Mono
//! ```

use std::path::Path;
use std::process::ExitCode;

use gmash::cli::global::GlobalOptions;
use gmash::cli::{self, Command};
use gmash::cmd::config::{run_options_command, run_version_command};
use gmash::cmd::mono::run_mono_command;
use gmash::config::Config;
use gmash::error::GmashError;
use gmash::git::query;
use gmash::logging::LogConfig;
use gmash::logging::init_logging;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Exit status after Ctrl-C, as a shell reports it.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let log_config = build_log_config(&cli.global);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("gmash: error: failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_watcher(cancel.clone());

    dispatch_command(&cli, &cancel).await
}

fn build_log_config(global: &GlobalOptions) -> LogConfig {
    LogConfig::builder()
        .with_console_level(global.console_level())
        .with_file_level(global.file_level())
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .build()
}

/// Cancel `token` on the first Ctrl-C; running git children are killed.
fn spawn_interrupt_watcher(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupted, cleaning up");
                token.cancel();
            }
            Err(e) => debug!(error = %e, "cannot listen for Ctrl-C"),
        }
    });
}

async fn dispatch_command(cli: &cli::Cli, cancel: &CancellationToken) -> ExitCode {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("gmash: error: cannot determine current directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Some(Command::Version) => {
            run_version_command();
            Ok(())
        }
        Some(Command::Options) => {
            load_config(&cli.global, &cwd).map(|config| run_options_command(&config))
        }
        Some(Command::Mono(args)) => match load_config(&cli.global, &cwd) {
            Ok(config) => run_mono_command(args, &config, &cwd, cancel).await,
            Err(e) => Err(e),
        },
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("no command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gmash: error: {e:#}");
            let interrupted = cancel.is_cancelled()
                || e.downcast_ref::<GmashError>()
                    .is_some_and(GmashError::is_interrupted);
            if interrupted {
                ExitCode::from(EXIT_INTERRUPTED)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Layered configuration; the repository file is used when `cwd` is inside
/// a work tree.
fn load_config(global: &GlobalOptions, cwd: &Path) -> gmash::error::Result<Config> {
    let root = query::work_dir(cwd).ok();
    if let Some(root) = &root {
        debug!(root = %root.display(), "repository found");
    }
    Config::load(root.as_deref(), &global.configs, &global.options)
}
