// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Subtree metadata records.
//!
//! ```text
//! <root>/.gmash/subtree/<remote>.conf
//!   version=1
//!   created=2025-09-26T10:00:00-04:00
//!   url=https://github.com/owner/name.git
//!   remote=origin_sub
//!   branch=main
//!   prefix=libs/sub_project
//!   squash=0
//!   owned=1
//! ```
//!
//! The format is line-oriented `key=value`. The first line starting with
//! `key=` wins; the value is everything after the first `=`. Values are
//! stored unescaped, so keys and values containing a newline (and keys
//! containing `=`) are refused.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{GmashResult, MetadataError};

/// Current record schema version.
pub const RECORD_VERSION: u32 = 1;

/// File extension of metadata records.
pub const RECORD_EXTENSION: &str = "conf";

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn unreadable(path: &Path, source: std::io::Error) -> MetadataError {
    MetadataError::Unreadable {
        path: display(path),
        source,
    }
}

/// Value of the first `key=` line in `text`.
fn lookup<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        line.strip_prefix(key)
            .and_then(|rest| rest.strip_prefix('='))
    })
}

/// Read `key` from a metadata file.
///
/// # Errors
///
/// Returns `MetadataError::Unreadable` if the file cannot be read.
pub fn confread(file: &Path, key: &str) -> GmashResult<Option<String>> {
    let text = fs::read_to_string(file).map_err(|e| unreadable(file, e))?;
    Ok(lookup(&text, key).map(str::to_string))
}

fn check_safe(file: &Path, key: &str, value: &str) -> Result<(), MetadataError> {
    let reason = if key.is_empty() {
        Some("key is empty")
    } else if key.contains('=') {
        Some("key contains '='")
    } else if key.contains(['\n', '\r']) {
        Some("key contains a line break")
    } else if value.contains(['\n', '\r']) {
        Some("value contains a line break")
    } else {
        None
    };
    reason.map_or(Ok(()), |reason| {
        Err(MetadataError::UnsafeValue {
            path: display(file),
            key: key.to_string(),
            reason: reason.to_string(),
        })
    })
}

/// Set `key` to `value` in a metadata file.
///
/// Replaces the first `key=` line in place or appends one, creating the file
/// and its parent directories when needed. Writing the same pair twice
/// leaves the file byte-identical.
///
/// # Errors
///
/// Returns `MetadataError::UnsafeValue` for keys or values that would break
/// the format, or `MetadataError::Unreadable` on I/O failure.
pub fn confwrite(file: &Path, key: &str, value: &str) -> GmashResult<()> {
    check_safe(file, key, value)?;

    let existing = match fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(unreadable(file, e).into()),
    };

    let entry = format!("{key}={value}");
    let mut replaced = false;
    let mut lines: Vec<&str> = existing
        .lines()
        .map(|line| {
            if !replaced && lookup(line, key).is_some() {
                replaced = true;
                entry.as_str()
            } else {
                line
            }
        })
        .collect();
    if !replaced {
        lines.push(&entry);
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    if updated == existing {
        return Ok(());
    }

    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).map_err(|e| unreadable(parent, e))?;
    }
    fs::write(file, updated).map_err(|e| unreadable(file, e))?;
    Ok(())
}

// --- Typed record ---

/// One tracked subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtreeRecord {
    pub version: u32,
    /// ISO-8601 with UTC offset; may be empty in hand-written records.
    pub created: String,
    pub url: String,
    pub remote: String,
    pub branch: String,
    pub prefix: String,
    pub squash: bool,
    /// The `gh` user could push to `url` when the record was created.
    pub owned: bool,
}

fn parse_flag(path: &str, key: &str, raw: Option<&str>) -> Result<bool, MetadataError> {
    match raw.map(str::trim) {
        None | Some("" | "0" | "false") => Ok(false),
        Some("1" | "true") => Ok(true),
        Some(other) => Err(MetadataError::InvalidValue {
            path: path.to_string(),
            key: key.to_string(),
            message: format!("expected 0, 1, true or false, got '{other}'"),
        }),
    }
}

fn required(path: &str, text: &str, key: &str) -> Result<String, MetadataError> {
    lookup(text, key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| MetadataError::MissingKey {
            path: path.to_string(),
            key: key.to_string(),
        })
}

impl SubtreeRecord {
    /// Creates a version-1 record stamped with the local time.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        remote: impl Into<String>,
        branch: impl Into<String>,
        prefix: impl Into<String>,
        squash: bool,
        owned: bool,
    ) -> Self {
        Self {
            version: RECORD_VERSION,
            created: chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
            url: url.into(),
            remote: remote.into(),
            branch: branch.into(),
            prefix: prefix.into(),
            squash,
            owned,
        }
    }

    /// Parse a record; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// `MissingKey` when `remote`, `branch` or `prefix` is absent or empty,
    /// `InvalidValue` for a malformed `version`, `squash` or `owned`.
    pub fn from_conf(path: &str, text: &str) -> Result<Self, MetadataError> {
        let version = match lookup(text, "version").map(str::trim) {
            None | Some("") => RECORD_VERSION,
            Some(raw) => raw.parse().map_err(|_| MetadataError::InvalidValue {
                path: path.to_string(),
                key: "version".to_string(),
                message: format!("expected an integer, got '{raw}'"),
            })?,
        };

        Ok(Self {
            version,
            created: lookup(text, "created").unwrap_or_default().to_string(),
            url: lookup(text, "url").unwrap_or_default().trim().to_string(),
            remote: required(path, text, "remote")?,
            branch: required(path, text, "branch")?,
            prefix: required(path, text, "prefix")?,
            squash: parse_flag(path, "squash", lookup(text, "squash"))?,
            owned: parse_flag(path, "owned", lookup(text, "owned"))?,
        })
    }

    /// Key/value pairs in canonical file order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, String); 8] {
        let flag = |b: bool| String::from(if b { "1" } else { "0" });
        [
            ("version", self.version.to_string()),
            ("created", self.created.clone()),
            ("url", self.url.clone()),
            ("remote", self.remote.clone()),
            ("branch", self.branch.clone()),
            ("prefix", self.prefix.clone()),
            ("squash", flag(self.squash)),
            ("owned", flag(self.owned)),
        ]
    }

    /// Render the record in file format.
    #[must_use]
    pub fn to_conf(&self) -> String {
        self.entries()
            .iter()
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect()
    }
}

// --- Store ---

/// A metadata file found by [`MetadataStore::list`].
#[derive(Debug)]
pub struct StoredRecord {
    pub path: PathBuf,
    /// File stem, i.e. the remote alias the file was written for.
    pub name: String,
    pub record: Result<SubtreeRecord, MetadataError>,
}

/// Metadata directory of one monorepo.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    root: PathBuf,
    relative_dir: String,
}

impl MetadataStore {
    /// `relative_dir` is `/`-separated and relative to `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, relative_dir: &str) -> Self {
        Self {
            root: root.into(),
            relative_dir: relative_dir.trim_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.relative_dir)
    }

    /// Record path relative to the repository root, as git spells it.
    #[must_use]
    pub fn relative_path(&self, remote: &str) -> String {
        format!("{}/{remote}.{RECORD_EXTENSION}", self.relative_dir)
    }

    #[must_use]
    pub fn path_for(&self, remote: &str) -> PathBuf {
        self.dir().join(format!("{remote}.{RECORD_EXTENSION}"))
    }

    #[must_use]
    pub fn exists(&self, remote: &str) -> bool {
        self.path_for(remote).is_file()
    }

    /// Load the record written for `remote`.
    ///
    /// # Errors
    ///
    /// `Unreadable` if the file is missing, otherwise the parse errors of
    /// [`SubtreeRecord::from_conf`].
    pub fn load(&self, remote: &str) -> GmashResult<SubtreeRecord> {
        let path = self.path_for(remote);
        let text = fs::read_to_string(&path).map_err(|e| unreadable(&path, e))?;
        Ok(SubtreeRecord::from_conf(&display(&path), &text)?)
    }

    /// Write every key of `record` through [`confwrite`]; returns the file path.
    ///
    /// # Errors
    ///
    /// Propagates [`confwrite`] failures.
    pub fn save(&self, record: &SubtreeRecord) -> GmashResult<PathBuf> {
        let path = self.path_for(&record.remote);
        for (key, value) in record.entries() {
            confwrite(&path, key, &value)?;
        }
        Ok(path)
    }

    /// Every record file, sorted by file name.
    ///
    /// A missing directory yields an empty list. Unparseable files are
    /// returned with their error so batch callers can skip them.
    ///
    /// # Errors
    ///
    /// `Unreadable` if the directory exists but cannot be listed.
    pub fn list(&self) -> GmashResult<Vec<StoredRecord>> {
        let dir = self.dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unreadable(&dir, e).into()),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext == RECORD_EXTENSION)
            })
            .collect();
        paths.sort();

        Ok(paths
            .into_iter()
            .map(|path| {
                let name = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let record = fs::read_to_string(&path)
                    .map_err(|e| unreadable(&path, e))
                    .and_then(|text| SubtreeRecord::from_conf(&display(&path), &text));
                StoredRecord { path, name, record }
            })
            .collect())
    }
}
