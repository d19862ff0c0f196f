//! Applies a [`ReconciliationPlan`] to the host repository.

use std::{collections::BTreeMap, path::Path};

use crate::{
    error::{GosubError, Result},
    git::{self, GITMODULES, Git},
    output::Output,
    package::{RemoteRecord, ResolvedPackage},
    plan::{ReconciliationPlan, SubmodulePath},
    repair::Repair,
};

/// A dependency the caller wants registered in the host repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEntry {
    /// Location relative to the repository root.
    pub path: SubmodulePath,
    /// The located dependency.
    pub package: ResolvedPackage,
    /// Upstream metadata; `None` for a vendored copy.
    pub remote: Option<RemoteRecord>,
}

/// Desired entries keyed by their submodule path.
pub type DesiredSet = BTreeMap<SubmodulePath, DesiredEntry>;

/// Stage, configure and remove submodules according to `plan`, then run
/// the repair step once.
///
/// Every added or kept path must have an entry in `desired`; this is
/// checked before anything is touched. Entries are then handled one at a
/// time. A dirty dependency aborts the run before anything is written for
/// it or for any entry after it.
pub fn apply_plan(
    git: &dyn Git,
    repair: &dyn Repair,
    repo_root: &Path,
    desired: &DesiredSet,
    plan: &ReconciliationPlan,
    output: &dyn Output,
) -> Result<()> {
    let entries = plan
        .staged()
        .map(|path| {
            desired
                .get(path)
                .ok_or_else(|| GosubError::MissingDesiredEntry {
                    path: path.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    for entry in entries {
        let path = &entry.path;
        if entry.remote.is_none() {
            output.message(&format!("staging {path} (vendored)"))?;
        } else if plan.add.contains(path) {
            output.success(&format!("adding {path}"))?;
        } else {
            output.message(&format!("syncing {path}"))?;
        }
        stage_entry(git, repo_root, entry, output)?;
    }

    for path in &plan.remove {
        output.fail(&format!("removing {path}"))?;
        remove_entry(git, repo_root, path)?;
    }

    repair
        .repair(git, repo_root)
        .map_err(|err| GosubError::RepairFailed(Box::new(err)))
}

/// Stage one desired entry and record its metadata.
fn stage_entry(
    git: &dyn Git,
    repo_root: &Path,
    entry: &DesiredEntry,
    output: &dyn Output,
) -> Result<()> {
    git::add(git, repo_root, entry.path.as_str())?;

    let Some(remote) = &entry.remote else {
        // vendored copy: the files themselves are the record
        return Ok(());
    };

    if git::has_uncommitted_changes(git, &entry.package.root)? {
        output.fail(&format!(
            "submodule is dirty: {}",
            entry.package.root.display()
        ))?;
        return Err(GosubError::DirtySubmodule {
            path: entry.package.root.clone(),
        });
    }

    write_submodule_config(git, repo_root, &entry.path, remote)?;
    git::add(git, repo_root, GITMODULES)
}

/// Unregister a submodule and drop its configuration section.
fn remove_entry(git: &dyn Git, repo_root: &Path, path: &SubmodulePath) -> Result<()> {
    git::rm_cached(git, repo_root, path.as_str())?;
    git::config_remove_section(git, repo_root, GITMODULES, &path.section())?;
    git::add(git, repo_root, GITMODULES)
}

/// Record `path`, `url` and `branch` for a submodule in `.gitmodules`.
///
/// Keys already holding the wanted value are left alone. An empty branch
/// clears any previously recorded one. Returns whether the file changed.
pub(crate) fn write_submodule_config(
    git: &dyn Git,
    repo_root: &Path,
    path: &SubmodulePath,
    remote: &RemoteRecord,
) -> Result<bool> {
    let mut changed = ensure_key(git, repo_root, &path.key("path"), path.as_str())?;
    changed |= ensure_key(git, repo_root, &path.key("url"), &remote.origin)?;

    let branch_key = path.key("branch");
    if !remote.branch.is_empty() {
        changed |= ensure_key(git, repo_root, &branch_key, &remote.branch)?;
    } else if git::config_get(git, repo_root, Some(GITMODULES), &branch_key)?.is_some() {
        git::config_unset(git, repo_root, GITMODULES, &branch_key)?;
        changed = true;
    }

    Ok(changed)
}

/// Set `key` in `.gitmodules` unless it already holds `value`.
fn ensure_key(git: &dyn Git, repo_root: &Path, key: &str, value: &str) -> Result<bool> {
    if git::config_get(git, repo_root, Some(GITMODULES), key)?.as_deref() == Some(value) {
        return Ok(false);
    }
    git::config_set(git, repo_root, GITMODULES, key, value)?;
    Ok(true)
}
