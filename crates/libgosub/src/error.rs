use std::{io, path::PathBuf, result::Result as StdResult};
use thiserror::Error;

use crate::output::OutputError;

/// Custom Result type for gosub operations.
pub type Result<T> = StdResult<T, GosubError>;

/// Gosub-specific error types
#[derive(Error, Debug)]
pub enum GosubError {
    /// The dependency path is not inside a git working tree.
    #[error("Cannot resolve dependency '{name}' at {path}: {message}")]
    NotVersionControlled {
        /// Abstract name of the dependency.
        name: String,
        /// Nominal path the dependency was expected at.
        path: PathBuf,
        /// Underlying tool error.
        message: String,
    },

    /// A resolved dependency root lies outside the host repository.
    #[error("Dependency root {path} is outside repository {repo_root}")]
    OutsideRepository {
        /// Root directory of the dependency.
        path: PathBuf,
        /// Root directory of the host repository.
        repo_root: PathBuf,
    },

    /// The dependency repository has no URL configured for the remote.
    #[error("No remote '{remote}' configured for {path}")]
    NoRemoteConfigured {
        /// Root directory of the dependency.
        path: PathBuf,
        /// Name of the remote that was queried.
        remote: String,
    },

    /// Reading remote metadata failed for a reason other than a missing remote.
    #[error("Failed to read remote metadata for {path}: {message}")]
    RemoteQueryFailed {
        /// Root directory of the dependency.
        path: PathBuf,
        /// Underlying tool error.
        message: String,
    },

    /// A `git submodule status` line could not be parsed.
    #[error("Invalid git submodule status output: {line:?}")]
    MalformedStatusLine {
        /// The offending line, verbatim.
        line: String,
    },

    /// Submodule detection failed even after running the repair step.
    #[error("Failed to detect existing submodules: {0}")]
    DetectionFailed(Box<GosubError>),

    /// A dependency checkout has uncommitted changes.
    #[error("Submodule is dirty: {path}")]
    DirtySubmodule {
        /// Root directory of the dirty dependency.
        path: PathBuf,
    },

    /// A git command exited unsuccessfully.
    #[error("Git command failed: {command}\nError: {stderr}")]
    GitCommand {
        /// The command line that was run.
        command: String,
        /// Exit code, when the process exited normally.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// A planned submodule path has no resolved dependency behind it.
    #[error("Planned submodule {path} has no resolved dependency")]
    MissingDesiredEntry {
        /// The planned path.
        path: String,
    },

    /// The repair routine could not normalize submodule state.
    #[error("Failed to fix submodules: {0}")]
    RepairFailed(Box<GosubError>),

    /// The settings file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// Writing operator output failed.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// An underlying I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl GosubError {
    /// Return the recommended process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotVersionControlled { .. } | Self::OutsideRepository { .. } => 2,
            Self::NoRemoteConfigured { .. } | Self::RemoteQueryFailed { .. } => 3,
            Self::MalformedStatusLine { .. } | Self::DetectionFailed(_) => 4,
            Self::DirtySubmodule { .. } => 5,
            Self::GitCommand { .. } | Self::RepairFailed(_) => 6,
            _ => 1,
        }
    }

    /// Exit code reported by git, if this error wraps a git invocation.
    pub fn git_exit_code(&self) -> Option<i32> {
        match self {
            Self::GitCommand { code, .. } => *code,
            _ => None,
        }
    }
}
