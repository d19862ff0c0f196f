use std::path::{Path, PathBuf};

use crate::{
    error::{GosubError, Result},
    git::{self, Git},
    origin::https_origin,
};

/// Remote queried when none is configured.
pub const DEFAULT_REMOTE: &str = "origin";

/// Branch name git reports for a detached HEAD.
const DETACHED_HEAD: &str = "HEAD";

/// An abstract dependency name, bound to the source tree it resolves against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRef {
    /// Slash-separated logical path, e.g. `github.com/org/name/sub`.
    name: String,
    /// Root of the source tree (`<gopath>/src`).
    src_root: PathBuf,
}

impl DependencyRef {
    /// Bind `name` to the source tree rooted at `src_root`.
    pub fn new(src_root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            src_root: src_root.into(),
        }
    }

    /// The abstract dependency name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source-tree root.
    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    /// Where the dependency is expected on disk.
    pub fn nominal_path(&self) -> PathBuf {
        self.src_root.join(&self.name)
    }
}

/// A dependency located on disk.
///
/// Two packages with the same `root` are the same dependency, whatever name
/// was used to request them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Repository (or vendored directory) root.
    pub root: PathBuf,
    /// Canonical name: `root` relative to the source tree.
    pub name: String,
}

/// Where a dependency's repository lives upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    /// Normalized origin URI.
    pub origin: String,
    /// Checked-out branch; empty when HEAD is detached.
    pub branch: String,
}

/// Locate the repository that contains `dep`.
///
/// The returned root is the repository top level, which may be an ancestor
/// of the requested path when one repository hosts several names.
pub fn resolve(git: &dyn Git, dep: &DependencyRef) -> Result<ResolvedPackage> {
    let nominal = dep.nominal_path();
    let not_versioned = |message: String| GosubError::NotVersionControlled {
        name: dep.name.clone(),
        path: nominal.clone(),
        message,
    };

    if !nominal.is_dir() {
        return Err(not_versioned("no such directory".to_string()));
    }

    let toplevel =
        git::show_toplevel(git, &nominal).map_err(|err| not_versioned(err.to_string()))?;

    // git reports the physical path, so compare against the canonical tree.
    let src_root = dep
        .src_root
        .canonicalize()
        .unwrap_or_else(|_| dep.src_root.clone());
    let name = match toplevel.strip_prefix(&src_root) {
        Ok(rel) => slash_path(rel),
        Err(_) => toplevel.to_string_lossy().into_owned(),
    };

    Ok(ResolvedPackage {
        root: toplevel,
        name,
    })
}

/// Read the normalized origin and branch of a resolved package.
pub fn read_remote(git: &dyn Git, pkg: &ResolvedPackage, remote: &str) -> Result<RemoteRecord> {
    let query_failed = |err: GosubError| GosubError::RemoteQueryFailed {
        path: pkg.root.clone(),
        message: err.to_string(),
    };

    let key = format!("remote.{remote}.url");
    let uri = git::config_get(git, &pkg.root, None, &key).map_err(query_failed)?;
    let uri = match uri {
        Some(uri) if !uri.is_empty() => uri,
        _ => {
            return Err(GosubError::NoRemoteConfigured {
                path: pkg.root.clone(),
                remote: remote.to_string(),
            });
        }
    };

    let branch = git::current_branch(git, &pkg.root).map_err(query_failed)?;
    let branch = if branch == DETACHED_HEAD {
        String::new()
    } else {
        branch
    };

    Ok(RemoteRecord {
        origin: https_origin(&uri),
        branch,
    })
}

/// Render a relative path with `/` separators, as git expects.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::fake::{FakeGit, failure};
    use std::fs;
    use tempfile::TempDir;

    fn package(root: &str) -> ResolvedPackage {
        ResolvedPackage {
            root: PathBuf::from(root),
            name: "github.com/org/dep".to_string(),
        }
    }

    #[test]
    fn test_resolve_strips_source_tree_prefix() -> Result<()> {
        let temp = TempDir::new()?;
        let src = temp.path().canonicalize()?.join("src");
        let requested = src.join("github.com/org/dep/sub/pkg");
        fs::create_dir_all(&requested)?;

        let toplevel = src.join("github.com/org/dep");
        let reported = toplevel.clone();
        let git = FakeGit::new(move |_, args| {
            assert_eq!(args, ["rev-parse", "--show-toplevel"]);
            Ok(format!("{}\n", reported.display()))
        });

        let pkg = resolve(&git, &DependencyRef::new(&src, "github.com/org/dep/sub/pkg"))?;
        assert_eq!(pkg.root, toplevel);
        assert_eq!(pkg.name, "github.com/org/dep");
        assert_eq!(git.calls()[0].dir, requested);

        Ok(())
    }

    #[test]
    fn test_resolve_missing_directory() {
        let temp = TempDir::new().unwrap();
        let git = FakeGit::new(|_, _| panic!("git should not be invoked"));

        let err = resolve(&git, &DependencyRef::new(temp.path(), "nowhere")).unwrap_err();
        assert!(matches!(err, GosubError::NotVersionControlled { .. }));
    }

    #[test]
    fn test_resolve_outside_repository() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("dep")).unwrap();
        let git = FakeGit::new(|_, args| {
            Err(failure(
                args,
                128,
                "fatal: not a git repository (or any of the parent directories): .git",
            ))
        });

        let err = resolve(&git, &DependencyRef::new(temp.path(), "dep")).unwrap_err();
        match err {
            GosubError::NotVersionControlled { name, message, .. } => {
                assert_eq!(name, "dep");
                assert!(message.contains("not a git repository"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_remote_normalizes_origin() -> Result<()> {
        let git = FakeGit::new(|_, args| match args {
            ["config", "--get", "remote.origin.url"] => Ok("git@github.com:org/dep.git\n".into()),
            ["rev-parse", "--abbrev-ref", "HEAD"] => Ok("release\n".into()),
            _ => Err(failure(args, 2, "unexpected")),
        });

        let remote = read_remote(&git, &package("/src/dep"), DEFAULT_REMOTE)?;
        assert_eq!(
            remote,
            RemoteRecord {
                origin: "https://github.com/org/dep".to_string(),
                branch: "release".to_string(),
            }
        );
        assert!(git.calls().iter().all(|c| c.dir == Path::new("/src/dep")));

        Ok(())
    }

    #[test]
    fn test_read_remote_detached_head_has_empty_branch() -> Result<()> {
        let git = FakeGit::new(|_, args| match args {
            ["config", ..] => Ok("https://github.com/org/dep\n".into()),
            _ => Ok("HEAD\n".into()),
        });

        let remote = read_remote(&git, &package("/src/dep"), DEFAULT_REMOTE)?;
        assert_eq!(remote.branch, "");

        Ok(())
    }

    #[test]
    fn test_read_remote_missing_remote() {
        let git = FakeGit::new(|_, args| Err(failure(args, 1, "")));

        let err = read_remote(&git, &package("/src/dep"), "upstream").unwrap_err();
        match err {
            GosubError::NoRemoteConfigured { remote, .. } => assert_eq!(remote, "upstream"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(git.lines(), vec!["config --get remote.upstream.url"]);
    }

    #[test]
    fn test_read_remote_query_failure_is_distinct() {
        let git = FakeGit::new(|_, args| match args {
            ["config", ..] => Ok("https://github.com/org/dep\n".into()),
            _ => Err(failure(args, 128, "fatal: ambiguous argument 'HEAD'")),
        });

        let err = read_remote(&git, &package("/src/dep"), DEFAULT_REMOTE).unwrap_err();
        assert!(matches!(err, GosubError::RemoteQueryFailed { .. }));
    }

    #[test]
    fn test_slash_path() {
        let path: PathBuf = ["github.com", "org", "dep"].iter().collect();
        assert_eq!(slash_path(&path), "github.com/org/dep");
    }
}
