use std::{collections::BTreeSet, fmt, path::Path};

use crate::package::slash_path;

/// A submodule location relative to the host repository root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmodulePath(String);

impl SubmodulePath {
    /// Normalize `path` to `/` separators with no leading `./` or trailing `/`.
    pub fn new(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
        Self(trimmed.to_string())
    }

    /// Build from a relative filesystem path.
    pub fn from_relative(path: &Path) -> Self {
        Self(slash_path(path))
    }

    /// The path as passed to git.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the `.gitmodules` section describing this submodule.
    pub fn section(&self) -> String {
        format!("submodule.{}", self.0)
    }

    /// Fully qualified `.gitmodules` key for `field`.
    pub fn key(&self, field: &str) -> String {
        format!("submodule.{}.{field}", self.0)
    }
}

impl fmt::Display for SubmodulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a sync run will do to each submodule path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Desired and already registered; metadata is refreshed.
    pub keep: BTreeSet<SubmodulePath>,
    /// Desired but not yet registered.
    pub add: BTreeSet<SubmodulePath>,
    /// Registered, no longer desired and not ignored.
    pub remove: BTreeSet<SubmodulePath>,
}

impl ReconciliationPlan {
    /// True when the run only refreshes existing entries.
    pub fn is_steady(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    /// Entries to stage and configure, in a stable order.
    pub fn staged(&self) -> impl Iterator<Item = &SubmodulePath> {
        let mut entries: Vec<_> = self.add.iter().chain(self.keep.iter()).collect();
        entries.sort();
        entries.into_iter()
    }
}

/// Compute keep/add/remove from the desired, existing and ignored sets.
pub fn plan(
    desired: &BTreeSet<SubmodulePath>,
    existing: &BTreeSet<SubmodulePath>,
    ignored: &BTreeSet<SubmodulePath>,
) -> ReconciliationPlan {
    ReconciliationPlan {
        keep: desired.intersection(existing).cloned().collect(),
        add: desired.difference(existing).cloned().collect(),
        remove: existing
            .difference(desired)
            .filter(|path| !ignored.contains(*path))
            .cloned()
            .collect(),
    }
}
