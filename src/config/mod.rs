// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for gmash.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. <repo root>/.gmash/config.toml (optional)
//! 3. --config FILE (repeatable)
//! 4. GMASH_* env vars
//! 5. --set key=value
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! GMASH_MONO__PUBLISH=false           → mono.publish = false
//! GMASH_MONO__TEMP_BRANCH_PREFIX=sync → mono.temp_branch_prefix = "sync"
//! GMASH_GITHUB__VISIBILITY=public     → github.visibility = "public"
//! ```

pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::{GithubConfig, MonoConfig, ToolsConfig};

/// Repository-local configuration file, relative to the root.
pub const REPO_CONFIG_FILE: &str = ".gmash/config.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "GMASH";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Monorepo behavior.
    pub mono: MonoConfig,
    /// Tool paths.
    pub tools: ToolsConfig,
    /// GitHub settings.
    pub github: GithubConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gmash::config::Config;
    ///
    /// let config = Config::builder()
    ///     .repo_file(".gmash/config.toml")
    ///     .env("GMASH")
    ///     .set("mono.publish", false)?
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().inline(content).build()
    }

    /// Build the full layered configuration.
    ///
    /// `repo_root` contributes `<root>/.gmash/config.toml` when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a `--config` file is missing or invalid, an
    /// override is malformed, or the result fails validation.
    pub fn load(
        repo_root: Option<&Path>,
        files: &[PathBuf],
        overrides: &[String],
    ) -> Result<Self> {
        let mut loader = Self::builder();
        if let Some(root) = repo_root {
            loader = loader.repo_file(root.join(REPO_CONFIG_FILE));
        }
        for file in files {
            loader = loader.file(file);
        }
        for source in loader.sources() {
            debug!(%source, "config source");
        }
        loader.env(ENV_PREFIX).overrides(overrides)?.build()
    }

    /// Check values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let invalid = |section: &str, key: &str, message: &str| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message: message.to_string(),
        };

        let dir = Path::new(&self.mono.metadata_dir);
        if self.mono.metadata_dir.trim().is_empty() {
            return Err(invalid("mono", "metadata_dir", "must not be empty").into());
        }
        if !dir
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(invalid(
                "mono",
                "metadata_dir",
                "must be a relative path inside the repository",
            )
            .into());
        }
        if self.mono.temp_branch_prefix.is_empty()
            || self
                .mono
                .temp_branch_prefix
                .contains(|c: char| c.is_whitespace() || "~^:?*[\\".contains(c))
        {
            return Err(invalid(
                "mono",
                "temp_branch_prefix",
                "must be a non-empty branch name component",
            )
            .into());
        }
        if self.mono.default_branch.trim().is_empty() {
            return Err(invalid("mono", "default_branch", "must not be empty").into());
        }
        if self.github.host.trim().is_empty() {
            return Err(invalid("github", "host", "must not be empty").into());
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_mono_options(&mut options);
        self.format_tools_options(&mut options);
        self.format_github_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_mono_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("mono.metadata_dir".into(), self.mono.metadata_dir.clone());
        options.insert(
            "mono.temp_branch_prefix".into(),
            self.mono.temp_branch_prefix.clone(),
        );
        options.insert(
            "mono.default_branch".into(),
            self.mono.default_branch.clone(),
        );
        options.insert("mono.publish".into(), self.mono.publish.to_string());
    }

    fn format_tools_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("tools.git".into(), self.tools.git.display().to_string());
        options.insert("tools.gh".into(), self.tools.gh.display().to_string());
    }

    fn format_github_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "github.visibility".into(),
            self.github.visibility.to_string(),
        );
        options.insert("github.host".into(), self.github.host.clone());
    }
}
