// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Layered configuration sources.
//!
//! ```text
//! ConfigLoader::new()
//!   .repo_file(<root>/.gmash/config.toml)   optional
//!   .file(--config)                         required, repeatable
//!   .inline(toml)
//!   .env("GMASH")                           GMASH_<SECTION>__<KEY>
//!   .overrides(--set key=value)
//!        |
//!        v
//!   build() --> Config (deserialized, validated)
//! ```
//!
//! Later sources win. The environment always sits below the overrides.

use std::fmt;
use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};

use super::Config;
use crate::error::{ConfigError, Result};

/// One TOML layer fed to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `<root>/.gmash/config.toml`, only recorded when it exists.
    Repo(PathBuf),
    /// A `--config` file.
    File(PathBuf),
    Inline,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repo(path) => write!(f, "repo {}", path.display()),
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Inline => f.write_str("inline"),
        }
    }
}

/// Accumulates sources, then merges them into a [`Config`].
pub struct ConfigLoader {
    inner: ConfigBuilder<DefaultState>,
    env_prefix: Option<String>,
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: config::Config::builder(),
            env_prefix: None,
            sources: Vec::new(),
        }
    }

    fn toml(mut self, path: &Path, required: bool) -> Self {
        self.inner = self
            .inner
            .add_source(File::from(path).format(FileFormat::Toml).required(required));
        self
    }

    /// The per-repository file; skipped silently when absent.
    #[must_use]
    pub fn repo_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.is_file() {
            self.sources.push(ConfigSource::Repo(path.to_path_buf()));
        }
        self.toml(path, false)
    }

    /// An explicit file; `build` fails if it is missing.
    #[must_use]
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.sources.push(ConfigSource::File(path.to_path_buf()));
        self.toml(path, true)
    }

    #[must_use]
    pub fn inline(mut self, content: &str) -> Self {
        self.sources.push(ConfigSource::Inline);
        self.inner = self
            .inner
            .add_source(File::from_str(content, FileFormat::Toml));
        self
    }

    /// Read `<PREFIX>_<SECTION>__<KEY>`, e.g. `GMASH_MONO__PUBLISH`.
    #[must_use]
    pub fn env(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if `key` is not a valid path.
    pub fn set(mut self, key: &str, value: impl Into<config::Value>) -> Result<Self> {
        self.inner = self
            .inner
            .set_override(key, value)
            .map_err(|e| ConfigError::ParseError {
                message: format!("override '{key}': {e}"),
            })?;
        Ok(self)
    }

    /// Apply command-line `key=value` pairs in order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for a pair without `=` or with an
    /// empty key.
    pub fn overrides<I, S>(self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut loader = self;
        for pair in pairs {
            let pair = pair.as_ref();
            let Some((key, value)) = pair.split_once('=').filter(|(k, _)| !k.trim().is_empty())
            else {
                return Err(ConfigError::ParseError {
                    message: format!("override '{pair}' is not of the form key=value"),
                }
                .into());
            };
            loader = loader.set(key.trim(), value.to_string())?;
        }
        Ok(loader)
    }

    #[must_use]
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Merge everything, deserialize and validate.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing required file, malformed TOML, an
    /// unknown key, a value of the wrong type, or a failed validation.
    pub fn build(self) -> Result<Config> {
        let mut inner = self.inner;
        if let Some(prefix) = &self.env_prefix {
            inner = inner.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }
        let config: Config = inner.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
