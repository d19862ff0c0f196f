use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{GosubError, Result},
    package::DEFAULT_REMOTE,
};

/// Environment variable that overrides the gopath.
pub const GOPATH_ENV: &str = "GOSUB_GOPATH";

/// Vendor directory used when none is configured.
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

/// Options for a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Directory holding `src/`; relative paths resolve against the repo root.
    pub gopath: PathBuf,
    /// Submodule paths that must never be removed.
    pub ignore: Vec<String>,
    /// Remote whose URL is recorded for each dependency.
    pub remote: String,
    /// Compute the plan without touching the repository.
    pub dry_run: bool,
}

impl SyncOptions {
    /// Options with no ignores, the default remote and `dry_run` off.
    pub fn new(gopath: impl Into<PathBuf>) -> Self {
        Self {
            gopath: gopath.into(),
            ignore: Vec::new(),
            remote: DEFAULT_REMOTE.to_string(),
            dry_run: false,
        }
    }
}

/// Options for a vendor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorOptions {
    /// Directory holding `src/`; relative paths resolve against the repo root.
    pub gopath: PathBuf,
    /// Destination directory for new submodules, relative to the repo root.
    pub vendor_dir: PathBuf,
    /// Remote whose URL is cloned.
    pub remote: String,
}

impl VendorOptions {
    /// Options with the default vendor directory and remote.
    pub fn new(gopath: impl Into<PathBuf>) -> Self {
        Self {
            gopath: gopath.into(),
            vendor_dir: PathBuf::from(DEFAULT_VENDOR_DIR),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

/// Per-repository settings read from `.gosub.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Gopath, relative to the repository root.
    pub gopath: Option<PathBuf>,
    /// Submodule paths sync must leave alone.
    pub ignore: Vec<String>,
    /// Vendor destination, relative to the repository root.
    pub vendor_dir: Option<PathBuf>,
    /// Remote to read URLs from.
    pub remote: Option<String>,
}

impl Settings {
    /// Settings file name at the repository root.
    pub const FILE_NAME: &'static str = ".gosub.toml";

    /// Read settings for the repository at `repo_root`; a missing file yields
    /// defaults.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = repo_root.join(Self::FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        toml::from_str(&contents).map_err(|e| {
            GosubError::Config(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    /// Pick the gopath: command line, then environment, then this file, then
    /// the repository root itself.
    ///
    /// `cli` and `env` are expected to be absolute already.
    pub fn gopath(&self, repo_root: &Path, cli: Option<PathBuf>, env: Option<PathBuf>) -> PathBuf {
        cli.or(env)
            .or_else(|| self.gopath.as_ref().map(|p| repo_root.join(p)))
            .unwrap_or_else(|| repo_root.to_path_buf())
    }

    /// The remote to query, falling back to `origin`.
    pub fn remote(&self) -> String {
        self.remote
            .clone()
            .unwrap_or_else(|| DEFAULT_REMOTE.to_string())
    }

    /// Build sync options; command-line ignores extend the configured list.
    pub fn sync_options(&self, gopath: PathBuf, cli_ignore: &[String], dry_run: bool) -> SyncOptions {
        let mut ignore = self.ignore.clone();
        ignore.extend(cli_ignore.iter().cloned());
        SyncOptions {
            gopath,
            ignore,
            remote: self.remote(),
            dry_run,
        }
    }

    /// Build vendor options; a command-line vendor directory wins.
    pub fn vendor_options(&self, gopath: PathBuf, cli_vendor_dir: Option<PathBuf>) -> VendorOptions {
        let vendor_dir = cli_vendor_dir
            .or_else(|| self.vendor_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VENDOR_DIR));
        VendorOptions {
            gopath,
            vendor_dir,
            remote: self.remote(),
        }
    }
}
