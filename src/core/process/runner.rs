// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Spawning and exit-code handling.
//!
//! ```text
//! run() / run_with_cancellation(token)
//!   token already cancelled --> interrupted output, nothing spawned
//!   tokio::process::Command (stdin null, piped output, kill_on_drop)
//!   run_child: readers + wait, or kill on cancel
//!   exit != 0 and !ALLOW_FAILURE and !interrupted --> NonZeroExit
//! ```

use std::fmt::Write as _;
use std::process::Stdio;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use super::builder::{ProcessBuilder, ProcessOutput};
use crate::error::{GmashResult, ProcessError};

impl ProcessBuilder {
    fn display_name(&self) -> String {
        self.name_override().map_or_else(
            || {
                self.program()
                    .file_stem()
                    .map_or_else(|| "process".to_string(), |s| s.to_string_lossy().into_owned())
            },
            String::from,
        )
    }

    /// Shell-like rendering for logs and error messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.display_name();
        for arg in self.args_slice() {
            if arg.is_empty() || arg.contains(' ') {
                let _ = write!(line, " \"{arg}\"");
            } else {
                let _ = write!(line, " {arg}");
            }
        }
        line
    }

    /// Run to completion.
    ///
    /// # Errors
    ///
    /// `ProcessError::SpawnFailed` if the child cannot start, and
    /// `ProcessError::NonZeroExit` on failure unless `ALLOW_FAILURE` is set.
    pub async fn run(self) -> GmashResult<ProcessOutput> {
        self.execute(None).await
    }

    /// Run until completion or until `token` fires.
    ///
    /// A cancelled run kills the child and returns an output marked
    /// interrupted instead of an error; callers decide how to report it.
    ///
    /// # Errors
    ///
    /// Same as [`ProcessBuilder::run`].
    pub async fn run_with_cancellation(
        self,
        token: &CancellationToken,
    ) -> GmashResult<ProcessOutput> {
        self.execute(Some(token)).await
    }

    async fn execute(self, token: Option<&CancellationToken>) -> GmashResult<ProcessOutput> {
        let name = self.display_name();
        let line = self.command_line();

        if token.is_some_and(CancellationToken::is_cancelled) {
            debug!(cmd = %line, "not started, already cancelled");
            return Ok(ProcessOutput::new(-1, String::new(), String::new(), true));
        }

        if let Some(cwd) = self.working_dir() {
            trace!(cwd = %cwd.display(), "cd");
        }
        debug!(cmd = %line, "exec");

        let mut child = self
            .command()
            .spawn()
            .map_err(|source| ProcessError::SpawnFailed {
                command: line.clone(),
                source,
            })?;
        trace!(process = %name, pid = ?child.id(), "spawned");

        let output = self.run_child(&name, &mut child, token).await?;
        if !output.success() && !output.is_interrupted() && !self.allows_failure() {
            if !output.stderr().is_empty() {
                error!(process = %name, stderr = %output.stderr(), "process failed");
            }
            return Err(ProcessError::NonZeroExit {
                command: line,
                code: output.exit_code(),
            }
            .into());
        }

        trace!(
            process = %name,
            exit_code = output.exit_code(),
            interrupted = output.is_interrupted(),
            "completed"
        );
        Ok(output)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(self.program());
        command
            .args(self.args_slice())
            .envs(self.environment())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = self.working_dir() {
            command.current_dir(cwd);
        }
        command
    }
}
