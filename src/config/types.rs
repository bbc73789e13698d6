// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for gmash.
//!
//! # Config Structure
//!
//! ```text
//! Config: MonoConfig, ToolsConfig, GithubConfig
//! Visibility: private (default) | public | internal
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default metadata directory, relative to the repository root.
pub const DEFAULT_METADATA_DIR: &str = ".gmash/subtree";

/// Visibility of repositories created with `mono subtree --new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Internal,
}

impl Visibility {
    /// The matching `gh repo create` flag.
    #[must_use]
    pub const fn as_flag(self) -> &'static str {
        match self {
            Self::Private => "--private",
            Self::Public => "--public",
            Self::Internal => "--internal",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Private => write!(f, "private"),
            Self::Public => write!(f, "public"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            "internal" => Ok(Self::Internal),
            _ => Err(ConfigError::InvalidValue {
                section: "github".to_string(),
                key: "visibility".to_string(),
                message: format!("expected 'private', 'public', or 'internal', got '{s}'"),
            }),
        }
    }
}

/// Monorepo behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonoConfig {
    /// Directory holding `<remote>.conf` records, relative to the root.
    pub metadata_dir: String,
    /// Prefix of the temporary branch used by `mono push`.
    pub temp_branch_prefix: String,
    /// Branch assumed when nothing else names one.
    pub default_branch: String,
    /// Push the monorepo branch to its upstream after a sync.
    pub publish: bool,
}

impl Default for MonoConfig {
    fn default() -> Self {
        Self {
            metadata_dir: DEFAULT_METADATA_DIR.to_string(),
            temp_branch_prefix: "gmash-sync".to_string(),
            default_branch: "main".to_string(),
            publish: true,
        }
    }
}

/// External executables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub git: PathBuf,
    pub gh: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git: PathBuf::from("git"),
            gh: PathBuf::from("gh"),
        }
    }
}

/// GitHub settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubConfig {
    pub visibility: Visibility,
    /// Host used to build and recognize repository URLs.
    pub host: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            visibility: Visibility::default(),
            host: "github.com".to_string(),
        }
    }
}
