// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                GmashError (~24 bytes)
//!                       |
//!     +------+----+-----+--------+------+------+
//!     |      |          |        |      |      |
//!     v      v          v        v      v      v
//!   Guard   Git    Metadata   Github  Cfg  Proc/Io/Other
//!    Box    Box       Box       Box    Box    Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Guard     NotAGitRepo, DirtyWorkingTree, MissingArgument, PathNotEmpty, ...
//!   Git       Gix, CommandFailed, MergeConflict, Interrupted
//!   Metadata  Unreadable, MissingKey, InvalidValue, UnsafeValue
//!   Github    CliMissing, InvalidUrl, CommandFailed
//!   Config    ParseError, InvalidValue
//!   Process   SpawnFailed, NonZeroExit
//! ```
//!
//! Guard and metadata failures are raised before any mutating git command
//! runs. Git failures may happen mid-operation; the caller is responsible for
//! releasing temporary resources before propagating them.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`GmashError`].
pub type GmashResult<T> = std::result::Result<T, GmashError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum GmashError {
    /// A precondition check refused to start the operation.
    #[error("{0}")]
    Guard(#[from] Box<GuardError>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Subtree metadata could not be read or written.
    #[error("metadata error: {0}")]
    Metadata(#[from] Box<MetadataError>),

    /// GitHub CLI operation failed.
    #[error("github error: {0}")]
    Github(#[from] Box<GithubError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl GmashError {
    /// Returns the guard failure, if this error is one.
    #[must_use]
    pub fn as_guard(&self) -> Option<&GuardError> {
        match self {
            Self::Guard(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the git failure, if this error is one.
    #[must_use]
    pub fn as_git(&self) -> Option<&GitError> {
        match self {
            Self::Git(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the metadata failure, if this error is one.
    #[must_use]
    pub fn as_metadata(&self) -> Option<&MetadataError> {
        match self {
            Self::Metadata(err) => Some(err),
            _ => None,
        }
    }

    /// True when the error stems from a cancelled subprocess.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self.as_git(), Some(GitError::Interrupted { .. }))
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for GmashError {
                fn from(err: $error) -> Self {
                    GmashError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GuardError => Guard,
    GitError => Git,
    MetadataError => Metadata,
    GithubError => Github,
    ConfigError => Config,
    ProcessError => Process,
    std::io::Error => Io,
}

// --- Guard Errors ---

/// Precondition violations.
///
/// Raised before an operation mutates anything; the repository is left as it
/// was found.
#[derive(Debug, Error)]
pub enum GuardError {
    /// No enclosing git repository with a working tree.
    #[error("not inside a git repository: {path}")]
    NotAGitRepo { path: String },

    /// Index or working tree has uncommitted changes.
    #[error("working tree has uncommitted changes; commit or stash them first")]
    DirtyWorkingTree,

    /// A required argument was empty or absent.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Remote alias is not configured.
    #[error("remote '{remote}' does not exist")]
    RemoteNotFound { remote: String },

    /// Remote alias is already configured.
    #[error("remote '{remote}' already exists")]
    RemoteAlreadyExists { remote: String },

    /// URL is already bound to another remote.
    #[error("url '{url}' is already used by remote '{remote}'")]
    UrlAlreadyBound { url: String, remote: String },

    /// Target path exists and has entries.
    #[error("path '{path}' exists and is not empty")]
    PathNotEmpty { path: String },

    /// Target path is excluded by `.gitignore`.
    #[error("path '{path}' is ignored by git")]
    PathIgnored { path: String },

    /// Remote URL could not be contacted.
    #[error("remote url '{url}' is not reachable: {message}")]
    RemoteUnreachable { url: String, message: String },

    /// No metadata record exists for the remote.
    #[error("no subtree metadata for remote '{remote}' (expected {path})")]
    MetadataMissing { remote: String, path: String },

    /// A metadata record already exists for the remote.
    #[error("subtree metadata for remote '{remote}' already exists at {path}")]
    MetadataExists { remote: String, path: String },

    /// GitHub repository could not be provisioned.
    #[error("failed to create repository {owner}/{name}: {message}")]
    RepoCreationFailed {
        owner: String,
        name: String,
        message: String,
    },

    /// Prefix is root, absolute, or escapes the repository.
    #[error("invalid subtree prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: String },

    /// Remote alias cannot be used as a metadata file name.
    #[error("invalid remote name '{remote}': {reason}")]
    InvalidRemoteName { remote: String, reason: String },

    /// Subtree directory is missing on disk.
    #[error("subtree path '{path}' does not exist")]
    PathMissing { path: String },

    /// Clone destination already exists.
    #[error("destination '{path}' already exists")]
    PathExists { path: String },

    /// The temporary sync branch name is taken.
    #[error("temporary branch '{branch}' already exists")]
    TempBranchExists { branch: String },
}

// --- Git Errors ---

/// Wrapper for gix-specific errors.
///
/// Large error types are boxed to keep enum size manageable.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to discover repository from path.
    #[error("failed to discover repository: {0}")]
    Discover(#[from] Box<gix::discover::Error>),

    /// Failed to access repository index.
    #[error("failed to access index: {0}")]
    Index(#[from] gix::worktree::open_index::Error),

    /// Failed to get HEAD reference.
    #[error("failed to get head reference: {0}")]
    Head(#[from] gix::reference::find::existing::Error),

    /// Repository has no worktree (bare repository).
    #[error("repository has no worktree (bare repository)")]
    BareRepository,
}

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),

    /// A merge stopped on conflicts and was aborted.
    #[error("merge of {what} into {into} has conflicts; resolve manually or rerun with -P")]
    MergeConflict { what: String, into: String },

    /// The command was cancelled by a signal.
    #[error("interrupted while running: {command}")]
    Interrupted { command: String },
}

// --- Metadata Errors ---

/// Subtree metadata record errors.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The metadata file could not be read or written.
    #[error("cannot access '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A required key is absent.
    #[error("'{path}' is missing required key '{key}'")]
    MissingKey { path: String, key: String },

    /// A key holds a value of the wrong shape.
    #[error("'{path}' has invalid value for '{key}': {message}")]
    InvalidValue {
        path: String,
        key: String,
        message: String,
    },

    /// A key or value would corrupt the line-oriented format.
    #[error("refusing to write '{key}' to '{path}': {reason}")]
    UnsafeValue {
        path: String,
        key: String,
        reason: String,
    },
}

// --- GitHub Errors ---

/// GitHub CLI errors.
#[derive(Debug, Error)]
pub enum GithubError {
    /// `gh` is not installed or not on PATH.
    #[error("GitHub CLI '{program}' not found in PATH")]
    CliMissing { program: String },

    /// URL does not point at a GitHub repository.
    #[error("not a GitHub repository url: {0}")]
    InvalidUrl(String),

    /// `gh` returned a failure.
    #[error("gh {command} failed: {message}")]
    CommandFailed { command: String, message: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration sources.
    #[error("failed to parse config: {message}")]
    ParseError { message: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited with non-zero status.
    #[error("process '{command}' exited with code {code}")]
    NonZeroExit { command: String, code: i32 },
}

#[cfg(test)]
mod tests;
