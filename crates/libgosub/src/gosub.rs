use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use crate::{
    config::{Settings, SyncOptions, VendorOptions},
    detect,
    error::{GosubError, Result},
    git::{self, Git},
    output::Output,
    package::{self, DependencyRef, ResolvedPackage},
    plan::{self, ReconciliationPlan, SubmodulePath},
    repair::{GitmodulesRepair, Repair, RepairReport},
    sync::{self, DesiredEntry, DesiredSet},
    vendor::{self, VendorReport},
};

/// Directory under the gopath that holds dependency sources.
const SRC_DIR: &str = "src";

/// Outcome of a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// The plan that was computed.
    pub plan: ReconciliationPlan,
    /// Desired paths that are vendored copies rather than submodules.
    ///
    /// These are never detected as existing, so they always sit in
    /// `plan.add`; they are only staged.
    pub vendored: BTreeSet<SubmodulePath>,
    /// Whether the plan was applied, as opposed to a dry run.
    pub applied: bool,
}

impl SyncReport {
    /// True when no submodule had to be added or removed.
    pub fn is_steady(&self) -> bool {
        self.plan.remove.is_empty() && self.plan.add.is_subset(&self.vendored)
    }
}

/// Manages dependency submodules for one host repository.
pub struct Gosub {
    /// Canonical top-level directory of the host repository.
    repo_root: PathBuf,
    /// Port to the git binary.
    git: Box<dyn Git>,
    /// Repair step run around detection and after applying a plan; when
    /// unset, a [`GitmodulesRepair`] is built from each run's options.
    repair: Option<Box<dyn Repair>>,
}

impl Gosub {
    /// Open the repository containing `repo_dir`.
    pub fn new(repo_dir: &Path, git: Box<dyn Git>) -> Result<Self> {
        let toplevel = git::show_toplevel(git.as_ref(), repo_dir)?;
        let repo_root = toplevel.canonicalize()?;
        Ok(Self {
            repo_root,
            git,
            repair: None,
        })
    }

    /// Replace the repair step.
    pub fn with_repair(mut self, repair: Box<dyn Repair>) -> Self {
        self.repair = Some(repair);
        self
    }

    /// Top-level directory of the host repository.
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Settings from the repository's `.gosub.toml`.
    pub fn settings(&self) -> Result<Settings> {
        Settings::load(&self.repo_root)
    }

    /// Resolve dependency names into desired entries, one per repository root.
    ///
    /// A dependency whose enclosing repository is the host repository itself
    /// is a vendored copy and carries no remote.
    pub fn desired(&self, deps: &[String], options: &SyncOptions) -> Result<DesiredSet> {
        let src_root = self.src_root(&options.gopath);
        let mut desired = DesiredSet::new();

        for name in deps {
            let dep = DependencyRef::new(&src_root, name.as_str());
            let pkg = package::resolve(self.git.as_ref(), &dep)?;
            let root = pkg.root.canonicalize().unwrap_or_else(|_| pkg.root.clone());

            let vendored = root == self.repo_root;
            let pkg = if vendored {
                let nominal = dep.nominal_path();
                ResolvedPackage {
                    root: nominal.canonicalize().unwrap_or(nominal),
                    name: dep.name().to_string(),
                }
            } else {
                ResolvedPackage { root, ..pkg }
            };

            let path = self.submodule_path(&pkg.root)?;
            if desired.contains_key(&path) {
                continue;
            }

            let remote = if vendored {
                None
            } else {
                Some(package::read_remote(self.git.as_ref(), &pkg, &options.remote)?)
            };

            desired.insert(
                path.clone(),
                DesiredEntry {
                    path,
                    package: pkg,
                    remote,
                },
            );
        }

        Ok(desired)
    }

    /// Submodules registered under `<gopath>/src`, repairing once if needed.
    ///
    /// The repair reads URLs from `options.remote` and never unregisters a
    /// path in `options.ignore`.
    pub fn existing(&self, options: &SyncOptions) -> Result<BTreeSet<SubmodulePath>> {
        let ignored = ignored_paths(options);
        self.with_repair_step(&options.remote, &ignored, |repair| {
            self.detect(&options.gopath, repair)
        })
    }

    /// Reconcile the repository's submodules with `deps`.
    pub fn sync(
        &self,
        deps: &[String],
        options: &SyncOptions,
        output: &dyn Output,
    ) -> Result<SyncReport> {
        let desired = self.desired(deps, options)?;
        let ignored = ignored_paths(options);

        self.with_repair_step(&options.remote, &ignored, |repair| {
            let existing = self.detect(&options.gopath, repair)?;
            let wanted: BTreeSet<_> = desired.keys().cloned().collect();
            let plan = plan::plan(&wanted, &existing, &ignored);
            let vendored = desired
                .values()
                .filter(|entry| entry.remote.is_none())
                .map(|entry| entry.path.clone())
                .collect();

            if !options.dry_run {
                sync::apply_plan(
                    self.git.as_ref(),
                    repair,
                    &self.repo_root,
                    &desired,
                    &plan,
                    output,
                )?;
            }

            Ok(SyncReport {
                plan,
                vendored,
                applied: !options.dry_run,
            })
        })
    }

    /// Add each dependency under the vendor directory unless already there.
    ///
    /// Every dependency must be a repository of its own below the source
    /// tree; a plain directory inside the host repository is rejected.
    pub fn vendor(
        &self,
        deps: &[String],
        options: &VendorOptions,
        output: &dyn Output,
    ) -> Result<VendorReport> {
        let src_root = self.src_root(&options.gopath);
        let mut packages = BTreeMap::new();
        for name in deps {
            let dep = DependencyRef::new(&src_root, name.as_str());
            let pkg = package::resolve(self.git.as_ref(), &dep)?;
            let root = pkg.root.canonicalize().unwrap_or_else(|_| pkg.root.clone());
            if root == self.repo_root {
                return Err(GosubError::NotVersionControlled {
                    name: name.clone(),
                    path: dep.nominal_path(),
                    message: "enclosed by the host repository, not a repository of its own"
                        .to_string(),
                });
            }
            packages.entry(pkg.name.clone()).or_insert(pkg);
        }

        let vendor_dir = if options.vendor_dir.is_absolute() {
            self.relative(&options.vendor_dir)?
        } else {
            options.vendor_dir.clone()
        };

        vendor::vendor_packages(
            self.git.as_ref(),
            &self.repo_root,
            &vendor_dir,
            &packages,
            &options.remote,
            output,
        )
    }

    /// Run the repair step on its own, reporting what changed.
    ///
    /// Gitlinks listed in `ignore` are registered when possible but never
    /// dropped from the index.
    pub fn fix(&self, remote: &str, ignore: &[String]) -> Result<RepairReport> {
        let protected = ignore.iter().map(|p| SubmodulePath::new(p)).collect();
        GitmodulesRepair::new(remote)
            .with_protected(protected)
            .run(self.git.as_ref(), &self.repo_root)
            .map_err(|err| GosubError::RepairFailed(Box::new(err)))
    }

    /// Call `f` with the configured repair step, or with a
    /// [`GitmodulesRepair`] for `remote` that protects `ignored`.
    fn with_repair_step<T>(
        &self,
        remote: &str,
        ignored: &BTreeSet<SubmodulePath>,
        f: impl FnOnce(&dyn Repair) -> Result<T>,
    ) -> Result<T> {
        match &self.repair {
            Some(repair) => f(repair.as_ref()),
            None => f(&GitmodulesRepair::new(remote).with_protected(ignored.clone())),
        }
    }

    /// Detect submodules under `<gopath>/src` with `repair` as the fallback.
    fn detect(&self, gopath: &Path, repair: &dyn Repair) -> Result<BTreeSet<SubmodulePath>> {
        let Some(subtree) = self.src_subtree(gopath)? else {
            return Ok(BTreeSet::new());
        };
        detect::detect_with_repair(self.git.as_ref(), repair, &self.repo_root, subtree.as_str())
    }

    /// `<gopath>/src`, with a relative gopath taken from the repo root.
    fn src_root(&self, gopath: &Path) -> PathBuf {
        self.repo_root.join(gopath).join(SRC_DIR)
    }

    /// The source tree relative to the repo root, or `None` if it is absent.
    fn src_subtree(&self, gopath: &Path) -> Result<Option<SubmodulePath>> {
        let src_root = self.src_root(gopath);
        if !src_root.is_dir() {
            return Ok(None);
        }
        let path = self.submodule_path(&src_root.canonicalize()?)?;
        // the repository root itself
        if path.as_str().is_empty() {
            return Ok(Some(SubmodulePath::new(".")));
        }
        Ok(Some(path))
    }

    /// Path of `root` relative to the repository, as a submodule path.
    fn submodule_path(&self, root: &Path) -> Result<SubmodulePath> {
        Ok(SubmodulePath::from_relative(&self.relative(root)?))
    }

    /// Strip the repository root from an absolute path inside it.
    fn relative(&self, path: &Path) -> Result<PathBuf> {
        path.strip_prefix(&self.repo_root)
            .map(Path::to_path_buf)
            .map_err(|_| GosubError::OutsideRepository {
                path: path.to_path_buf(),
                repo_root: self.repo_root.clone(),
            })
    }
}

/// The ignore list as normalized submodule paths.
fn ignored_paths(options: &SyncOptions) -> BTreeSet<SubmodulePath> {
    options.ignore.iter().map(|p| SubmodulePath::new(p)).collect()
}
