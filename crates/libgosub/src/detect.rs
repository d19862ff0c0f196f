//! Detection of submodules already registered in the host repository.

use std::{collections::BTreeSet, path::Path};

use crate::{
    error::{GosubError, Result},
    git::{self, Git},
    plan::SubmodulePath,
    repair::Repair,
};

/// One line of `git submodule status` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    /// A well-formed entry.
    Parsed {
        /// Leading status marker (` `, `-`, `+` or `U`).
        marker: char,
        /// Commit recorded for the submodule.
        sha: String,
        /// Submodule path relative to the repository root.
        path: String,
    },
    /// A line that does not have the expected shape.
    Malformed(String),
}

/// Parse a single status line.
pub fn parse_status_line(line: &str) -> StatusLine {
    let mut chars = line.chars();
    let Some(marker) = chars.next() else {
        return StatusLine::Malformed(line.to_string());
    };

    let mut segments = chars.as_str().split(' ');
    match (segments.next(), segments.next()) {
        (Some(sha), Some(path)) if !sha.is_empty() && !path.is_empty() => StatusLine::Parsed {
            marker,
            sha: sha.to_string(),
            path: path.to_string(),
        },
        _ => StatusLine::Malformed(line.to_string()),
    }
}

/// Collect submodule paths from a full status listing.
pub fn parse_status(output: &str) -> Result<BTreeSet<SubmodulePath>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match parse_status_line(line) {
            StatusLine::Parsed { path, .. } => Ok(SubmodulePath::new(&path)),
            StatusLine::Malformed(line) => Err(GosubError::MalformedStatusLine { line }),
        })
        .collect()
}

/// List the submodules registered under `subtree`.
///
/// A subtree with nothing in the index has no submodules; git would reject
/// the pathspec, so it is not queried. Failures are returned as-is.
pub fn list_existing(
    git: &dyn Git,
    repo_root: &Path,
    subtree: &str,
) -> Result<BTreeSet<SubmodulePath>> {
    if !repo_root.join(subtree).exists() || git::ls_files(git, repo_root, subtree)?.is_empty() {
        return Ok(BTreeSet::new());
    }

    let output = git::submodule_status(git, repo_root, subtree)?;
    parse_status(&output)
}

/// Detect existing submodules, repairing and retrying once on failure.
///
/// A failing repair or a second listing failure is reported as
/// [`GosubError::DetectionFailed`] wrapping the cause.
pub fn detect_with_repair(
    git: &dyn Git,
    repair: &dyn Repair,
    repo_root: &Path,
    subtree: &str,
) -> Result<BTreeSet<SubmodulePath>> {
    match list_existing(git, repo_root, subtree) {
        Ok(existing) => Ok(existing),
        Err(_) => {
            repair
                .repair(git, repo_root)
                .map_err(|err| GosubError::DetectionFailed(Box::new(err)))?;
            list_existing(git, repo_root, subtree)
                .map_err(|err| GosubError::DetectionFailed(Box::new(err)))
        }
    }
}
