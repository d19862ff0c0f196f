//! One-way vendoring: add missing dependencies as new submodules.

use std::{collections::BTreeMap, path::Path};

use crate::{
    error::{GosubError, Result},
    git::{self, Git},
    output::Output,
    package::{self, ResolvedPackage, slash_path},
};

/// Outcome of a vendoring run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorReport {
    /// Canonical names registered as new submodules.
    pub added: Vec<String>,
    /// Canonical names whose destination already existed.
    pub skipped: Vec<String>,
}

/// Register each package under `vendor_dir` unless its destination exists.
///
/// `packages` is keyed by canonical name, so each repository is added at
/// most once. A name that is not relative to the source tree is rejected.
/// The first failure stops the batch.
pub fn vendor_packages(
    git: &dyn Git,
    repo_root: &Path,
    vendor_dir: &Path,
    packages: &BTreeMap<String, ResolvedPackage>,
    remote: &str,
    output: &dyn Output,
) -> Result<VendorReport> {
    let mut report = VendorReport::default();

    for (name, pkg) in packages {
        if !Path::new(name).is_relative() {
            return Err(GosubError::NotVersionControlled {
                name: name.clone(),
                path: pkg.root.clone(),
                message: "repository root is outside the source tree".to_string(),
            });
        }

        let dest = vendor_dir.join(name);
        if repo_root.join(&dest).is_dir() {
            output.warn(&format!("skipping {name} (already vendored)"))?;
            report.skipped.push(name.clone());
            continue;
        }

        output.success(&format!("adding {name}"))?;
        let record = package::read_remote(git, pkg, remote)?;
        let dest = slash_path(&dest);

        let spinner = output.spinner(&format!("cloning {}", record.origin));
        match git::submodule_add(git, repo_root, &record.origin, &dest) {
            Ok(()) => spinner.finish_success(&format!("added {dest}")),
            Err(err) => {
                spinner.finish_fail(&format!("failed to add {dest}"));
                return Err(err);
            }
        }
        report.added.push(name.clone());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::*;
    use crate::{
        git::fake::{FakeGit, failure},
        output::Quiet,
    };
    use tempfile::TempDir;

    fn packages(names: &[&str]) -> BTreeMap<String, ResolvedPackage> {
        names
            .iter()
            .map(|name| {
                let pkg = ResolvedPackage {
                    root: PathBuf::from("/gopath/src").join(name),
                    name: name.to_string(),
                };
                (name.to_string(), pkg)
            })
            .collect()
    }

    fn remote_answers(dir: &Path, args: &[&str]) -> Result<String> {
        match args {
            ["config", "--get", "remote.origin.url"] => {
                let name = dir.strip_prefix("/gopath/src").unwrap_or(dir);
                let name = slash_path(name);
                Ok(format!(
                    "git@github.com:{}.git\n",
                    name.trim_start_matches("github.com/")
                ))
            }
            ["rev-parse", ..] => Ok("main\n".into()),
            ["submodule", "add", ..] => Ok(String::new()),
            _ => Err(failure(args, 2, "unexpected")),
        }
    }

    #[test]
    fn test_adds_missing_and_skips_present() -> Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("vendor/github.com/org/present"))?;
        let git = FakeGit::new(remote_answers);

        let report = vendor_packages(
            &git,
            temp.path(),
            Path::new("vendor"),
            &packages(&["github.com/org/present", "github.com/org/missing"]),
            "origin",
            &Quiet,
        )?;

        assert_eq!(report.added, vec!["github.com/org/missing".to_string()]);
        assert_eq!(report.skipped, vec!["github.com/org/present".to_string()]);

        let adds: Vec<_> = git
            .calls()
            .into_iter()
            .filter(|c| c.args.first().map(String::as_str) == Some("submodule"))
            .collect();
        assert_eq!(adds.len(), 1);
        assert_eq!(
            adds[0].line(),
            "submodule add https://github.com/org/missing vendor/github.com/org/missing"
        );
        assert_eq!(adds[0].dir, temp.path());

        Ok(())
    }

    #[test]
    fn test_rerun_after_success_adds_nothing() -> Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("vendor/github.com/org/dep"))?;
        let git = FakeGit::new(|_, args| panic!("unexpected git call: {args:?}"));

        let report = vendor_packages(
            &git,
            temp.path(),
            Path::new("vendor"),
            &packages(&["github.com/org/dep"]),
            "origin",
            &Quiet,
        )?;
        assert!(report.added.is_empty());
        assert_eq!(report.skipped.len(), 1);

        Ok(())
    }

    #[test]
    fn test_first_failure_stops_batch() {
        let temp = TempDir::new().unwrap();
        let git = FakeGit::new(|dir, args| match args {
            ["submodule", "add", ..] => Err(failure(args, 128, "fatal: repository not found")),
            _ => remote_answers(dir, args),
        });

        let err = vendor_packages(
            &git,
            temp.path(),
            Path::new("vendor"),
            &packages(&["github.com/org/a", "github.com/org/b"]),
            "origin",
            &Quiet,
        )
        .unwrap_err();

        assert!(matches!(err, GosubError::GitCommand { .. }));
        let adds = git
            .lines()
            .into_iter()
            .filter(|l| l.starts_with("submodule add"))
            .count();
        assert_eq!(adds, 1);
    }

    #[test]
    fn test_missing_remote_is_fatal() {
        let temp = TempDir::new().unwrap();
        let git = FakeGit::new(|_, args| Err(failure(args, 1, "")));

        let err = vendor_packages(
            &git,
            temp.path(),
            Path::new("vendor"),
            &packages(&["github.com/org/a"]),
            "origin",
            &Quiet,
        )
        .unwrap_err();
        assert!(matches!(err, GosubError::NoRemoteConfigured { .. }));
    }

    #[test]
    fn test_name_outside_source_tree_is_rejected() {
        let temp = TempDir::new().unwrap();
        let host = temp.path().to_path_buf();
        let git = FakeGit::new(|_, args| panic!("unexpected git call: {args:?}"));
        let name = host.to_string_lossy().into_owned();
        let packages = BTreeMap::from([(
            name.clone(),
            ResolvedPackage {
                root: host.clone(),
                name,
            },
        )]);

        let err = vendor_packages(&git, &host, Path::new("vendor"), &packages, "origin", &Quiet)
            .unwrap_err();
        assert!(matches!(err, GosubError::NotVersionControlled { .. }));
    }
}
