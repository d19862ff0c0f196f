use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use crate::{
    error::{GosubError, Result},
    git::{self, GITMODULES, Git},
    package::{self, DEFAULT_REMOTE, RemoteRecord, ResolvedPackage},
    plan::SubmodulePath,
    sync::write_submodule_config,
};

/// Brings partially constructed submodule registrations back to a
/// consistent state.
pub trait Repair {
    /// Normalize the submodule state of the repository at `repo_root`.
    fn repair(&self, git: &dyn Git, repo_root: &Path) -> Result<()>;
}

/// What a repair pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Gitlinks that were missing a `.gitmodules` entry and got one.
    pub registered: Vec<SubmodulePath>,
    /// Gitlinks with no readable remote, dropped from the index.
    pub unregistered: Vec<SubmodulePath>,
    /// Protected gitlinks with no readable remote, left as they were.
    pub untouched: Vec<SubmodulePath>,
    /// `.gitmodules` sections with no matching gitlink, removed.
    pub pruned: Vec<String>,
}

impl RepairReport {
    /// True when nothing needed fixing.
    pub fn is_clean(&self) -> bool {
        self.registered.is_empty()
            && self.unregistered.is_empty()
            && self.untouched.is_empty()
            && self.pruned.is_empty()
    }
}

/// Reconciles gitlinks in the index with sections in `.gitmodules`.
pub struct GitmodulesRepair {
    /// Remote used to recover URLs for unregistered checkouts.
    remote: String,
    /// Gitlinks that may be registered but never dropped from the index.
    protected: BTreeSet<SubmodulePath>,
}

impl Default for GitmodulesRepair {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE)
    }
}

impl GitmodulesRepair {
    /// Create a repair pass that recovers URLs from `remote`.
    pub fn new(remote: &str) -> Self {
        Self {
            remote: remote.to_string(),
            protected: BTreeSet::new(),
        }
    }

    /// Never unregister any of `paths`, even when no remote can be read.
    pub fn with_protected(mut self, paths: BTreeSet<SubmodulePath>) -> Self {
        self.protected = paths;
        self
    }

    /// Run the repair and report what changed.
    pub fn run(&self, git: &dyn Git, repo_root: &Path) -> Result<RepairReport> {
        let links: BTreeSet<SubmodulePath> = git::gitlinks(git, repo_root)?
            .iter()
            .map(|p| SubmodulePath::new(p))
            .collect();
        let sections = registered_sections(git, repo_root)?;
        let mapped: BTreeSet<&SubmodulePath> = sections.values().collect();

        let mut report = RepairReport::default();

        for link in &links {
            if mapped.contains(link) {
                continue;
            }
            match self.recover_remote(git, repo_root, link)? {
                Some(remote) => {
                    write_submodule_config(git, repo_root, link, &remote)?;
                    report.registered.push(link.clone());
                }
                None if self.protected.contains(link) => {
                    report.untouched.push(link.clone());
                }
                None => {
                    git::rm_cached(git, repo_root, link.as_str())?;
                    report.unregistered.push(link.clone());
                }
            }
        }

        for (name, path) in &sections {
            if !links.contains(path) {
                git::config_remove_section(git, repo_root, GITMODULES, &format!("submodule.{name}"))?;
                report.pruned.push(name.clone());
            }
        }

        let touched_config = !report.registered.is_empty() || !report.pruned.is_empty();
        if touched_config && repo_root.join(GITMODULES).exists() {
            git::add(git, repo_root, GITMODULES)?;
        }

        Ok(report)
    }

    /// Read the remote of the checkout at `link`.
    ///
    /// `None` means the checkout is gone or has no such remote; any other
    /// failure is returned.
    fn recover_remote(
        &self,
        git: &dyn Git,
        repo_root: &Path,
        link: &SubmodulePath,
    ) -> Result<Option<RemoteRecord>> {
        let checkout = repo_root.join(link.as_str());
        if !checkout.join(".git").exists() {
            return Ok(None);
        }

        let pkg = ResolvedPackage {
            root: checkout,
            name: link.to_string(),
        };
        match package::read_remote(git, &pkg, &self.remote) {
            Ok(remote) => Ok(Some(remote)),
            Err(GosubError::NoRemoteConfigured { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl Repair for GitmodulesRepair {
    fn repair(&self, git: &dyn Git, repo_root: &Path) -> Result<()> {
        self.run(git, repo_root).map(|_| ())
    }
}

/// Map each `.gitmodules` section name to the path it declares.
fn registered_sections(
    git: &dyn Git,
    repo_root: &Path,
) -> Result<BTreeMap<String, SubmodulePath>> {
    let pairs = git::config_get_regexp(git, repo_root, GITMODULES, r"^submodule\..*\.path$")?;

    Ok(pairs
        .into_iter()
        .filter_map(|(key, value)| {
            let name = key.strip_prefix("submodule.")?.strip_suffix(".path")?;
            Some((name.to_string(), SubmodulePath::new(&value)))
        })
        .collect())
}
