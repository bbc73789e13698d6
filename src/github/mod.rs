// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! GitHub CLI integration.
//!
//! ```text
//! GithubCli --> gh repo create  (mono subtree --new)
//!           --> gh api repos/.. (ownership probe, never fatal)
//!           --> gh pr create    (mono push -P)
//! ```
//!
//! `gh` is resolved through PATH on first use; a missing CLI only matters to
//! the operations that need it.

use std::path::PathBuf;

use regex::Regex;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::config::types::Visibility;
use crate::core::process::builder::{ProcessBuilder, ProcessFlags};
use crate::error::{GitError, GithubError, GmashResult};

/// Default GitHub host.
pub const DEFAULT_HOST: &str = "github.com";

/// `owner/name` of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name`, prefixed with the host for anything but github.com.
    #[must_use]
    pub fn qualified(&self, host: &str) -> String {
        if host == DEFAULT_HOST {
            self.to_string()
        } else {
            format!("{host}/{self}")
        }
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Canonical HTTPS clone URL.
#[must_use]
pub fn canonical_url(host: &str, slug: &RepoSlug) -> String {
    format!("https://{host}/{slug}.git")
}

/// Extract `owner/name` from an HTTPS or SSH URL on `host`.
///
/// # Errors
///
/// Returns `GithubError::InvalidUrl` if the URL points elsewhere.
pub fn parse_repo_url(url: &str, host: &str) -> Result<RepoSlug, GithubError> {
    let host = regex::escape(host);
    let pattern = format!(
        r"^(?:https?://(?:[^@/]+@)?{host}/|ssh://(?:[^@/]+@)?{host}(?::[0-9]+)?/|[^@/:]+@{host}:)(?P<owner>[A-Za-z0-9_.-]+)/(?P<name>[A-Za-z0-9_.-]+?)(?:\.git)?/?$"
    );
    let invalid = || GithubError::InvalidUrl(url.to_string());
    let regex = Regex::new(&pattern).map_err(|_| invalid())?;
    let captures = regex.captures(url.trim()).ok_or_else(invalid)?;
    Ok(RepoSlug::new(&captures["owner"], &captures["name"]))
}

#[derive(Debug, Deserialize)]
struct RepoPermissions {
    #[serde(default)]
    push: bool,
}

#[derive(Debug, Deserialize)]
struct RepoView {
    permissions: Option<RepoPermissions>,
}

/// Reads `.permissions.push` from `gh api repos/<owner>/<name>` output.
pub(crate) fn parse_push_permission(json: &str) -> bool {
    serde_json::from_str::<RepoView>(json)
        .ok()
        .and_then(|view| view.permissions)
        .is_some_and(|permissions| permissions.push)
}

/// Runner for the `gh` executable.
#[derive(Debug, Clone)]
pub struct GithubCli {
    program: PathBuf,
    host: String,
    cancel: CancellationToken,
}

impl GithubCli {
    #[must_use]
    pub fn new(
        program: impl Into<PathBuf>,
        host: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            program: program.into(),
            host: host.into(),
            cancel,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Self {
        Self::new(&config.tools.gh, &config.github.host, cancel)
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    async fn run(&self, args: &[&str]) -> GmashResult<String> {
        let command = format!("gh {}", args.join(" "));
        let builder = ProcessBuilder::which(&self.program).map_err(|_| GithubError::CliMissing {
            program: self.program.display().to_string(),
        })?;
        let output = builder
            .args(args)
            .env("GH_PROMPT_DISABLED", "1")
            .env("GH_HOST", &self.host)
            .flag(ProcessFlags::ALLOW_FAILURE)
            .capture_output()
            .name("gh")
            .run_with_cancellation(&self.cancel)
            .await?;

        if output.is_interrupted() {
            return Err(GitError::Interrupted { command }.into());
        }
        if !output.success() {
            return Err(GithubError::CommandFailed {
                command: args.first().copied().unwrap_or_default().to_string(),
                message: output.stderr().trim().to_string(),
            }
            .into());
        }
        Ok(output.stdout().trim().to_string())
    }

    /// Create a repository with a README so it has a default branch.
    ///
    /// Returns the canonical clone URL.
    ///
    /// # Errors
    ///
    /// Returns `GithubError::CliMissing` or `GithubError::CommandFailed`.
    pub async fn create_repo(&self, slug: &RepoSlug, visibility: Visibility) -> GmashResult<String> {
        let qualified = slug.qualified(&self.host);
        self.run(&["repo", "create", &qualified, visibility.as_flag(), "--add-readme"])
            .await?;
        Ok(canonical_url(&self.host, slug))
    }

    /// Whether the authenticated user can push to `url`.
    ///
    /// Any failure (no `gh`, not logged in, not a GitHub URL) is `false`.
    pub async fn can_push(&self, url: &str) -> bool {
        let Ok(slug) = parse_repo_url(url, &self.host) else {
            debug!(url, "not a GitHub url, assuming no push access");
            return false;
        };
        let endpoint = format!("repos/{slug}");
        match self.run(&["api", &endpoint]).await {
            Ok(json) => parse_push_permission(&json),
            Err(e) => {
                debug!(error = %e, "push permission probe failed");
                false
            }
        }
    }

    /// Open a pull request from `head` into `base`; returns the PR URL.
    ///
    /// # Errors
    ///
    /// Returns `GithubError::CliMissing` or `GithubError::CommandFailed`.
    pub async fn create_pull_request(
        &self,
        slug: &RepoSlug,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> GmashResult<String> {
        let qualified = slug.qualified(&self.host);
        self.run(&[
            "pr", "create", "--repo", &qualified, "--base", base, "--head", head, "--title",
            title, "--body", body,
        ])
        .await
    }
}
