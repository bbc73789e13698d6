// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Output capture for processes.
//!
//! ```text
//! run_child()
//!   stdout/stderr reader tasks (each returns its own String)
//!   wait (or cancel)
//!   --> ProcessOutput { stdout, stderr, exit_code, interrupted }
//! ```
//!
//! Readers own their buffer until EOF, so a chatty child can never block on
//! a full channel while the parent waits for it to exit.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use super::builder::{ProcessBuilder, ProcessOutput, StreamFlags};
use crate::error::GmashResult;

fn spawn_reader<R>(
    stream: Option<R>,
    flags: StreamFlags,
    process_name: &str,
    stream_name: &'static str,
) -> Option<JoinHandle<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    if flags.is_empty() {
        return None;
    }
    let name = process_name.to_string();
    stream.map(|stream| tokio::spawn(read_stream(stream, flags, name, stream_name)))
}

async fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    match handle {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}

impl ProcessBuilder {
    /// Runs the child process, collecting output and waiting for completion.
    pub(super) async fn run_child(
        &self,
        name: &str,
        child: &mut Child,
        token: Option<&CancellationToken>,
    ) -> GmashResult<ProcessOutput> {
        let stdout_handle = spawn_reader(child.stdout.take(), self.stdout_config(), name, "stdout");
        let stderr_handle = spawn_reader(child.stderr.take(), self.stderr_config(), name, "stderr");

        let (exit_status, interrupted) = match token {
            Some(token) => tokio::select! {
                status = child.wait() => (status?, false),
                () = token.cancelled() => {
                    warn!(process = %name, "cancellation requested, terminating process");
                    child.kill().await.ok();
                    (child.wait().await?, true)
                }
            },
            None => (child.wait().await?, false),
        };

        let stdout = join_reader(stdout_handle).await;
        let stderr = join_reader(stderr_handle).await;

        Ok(ProcessOutput::new(
            exit_status.code().unwrap_or(-1),
            stdout,
            stderr,
            interrupted,
        ))
    }
}

/// Reads a stream line by line, tracing and/or keeping each line.
async fn read_stream<R>(
    reader: R,
    flags: StreamFlags,
    process_name: String,
    stream_name: &'static str,
) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut kept = String::new();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if flags.contains(StreamFlags::FORWARD_TO_LOG) {
                    trace!(process = %process_name, stream = stream_name, line = %line, "output");
                }
                if flags.contains(StreamFlags::KEEP_IN_STRING) {
                    if !kept.is_empty() {
                        kept.push('\n');
                    }
                    kept.push_str(&line);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(
                    process = %process_name,
                    stream = stream_name,
                    error = %e,
                    "error reading stream"
                );
                break;
            }
        }
    }

    kept
}
