//! Error types for Switchyard

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Branch reference errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    /// Empty ref name
    #[error("Branch ref is empty")]
    Empty,

    /// Ref outside the branch namespace
    #[error("Not a branch ref: {0}")]
    NotABranch(String),
}

/// Git-related errors, covering the local repository and companion lookups
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Revision could not be resolved to a commit
    #[error("Unknown revision: {0}")]
    UnknownRevision(String),

    /// No common ancestor between two commits
    #[error("No merge base between {ours} and {theirs}")]
    NoMergeBase { ours: String, theirs: String },

    /// Commit has no parent to diff against
    #[error("Commit {0} has no parent")]
    NoParent(String),

    /// Companion repository could not be queried
    #[error("Companion repository {location} unreachable: {reason}")]
    CompanionUnreachable { location: String, reason: String },

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}
