use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::Command,
    sync::Arc,
};

use crate::{
    error::{GosubError, Result},
    output::Output,
};

/// Name of the submodule configuration file at the repository root.
pub const GITMODULES: &str = ".gitmodules";

/// File mode git records for submodule entries in the index.
const GITLINK_MODE: &str = "160000";

/// Port to the external git binary.
///
/// Every call is a function of the working directory and the argument list;
/// implementations return captured stdout on success.
pub trait Git {
    /// Run `git <args>` inside `dir`.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String>;
}

/// [`Git`] implementation that spawns the `git` binary on the `PATH`.
#[derive(Default)]
pub struct SystemGit {
    /// Where to echo each invocation, when tracing is enabled.
    trace: Option<Arc<dyn Output>>,
}

impl SystemGit {
    /// Create a git port that runs commands silently.
    pub fn new() -> Self {
        Self { trace: None }
    }

    /// Create a git port that echoes every command to `output`.
    pub fn with_trace(output: Arc<dyn Output>) -> Self {
        Self {
            trace: Some(output),
        }
    }
}

impl Git for SystemGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let command = format!("git {}", args.join(" "));
        if let Some(trace) = &self.trace {
            trace.message(&format!("$ {command}  ({})", dir.display()))?;
        }

        let output = Command::new("git").current_dir(dir).args(args).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GosubError::GitCommand {
                command,
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        // Pass git's diagnostics through to the operator.
        if !output.stderr.is_empty() {
            io::stderr().write_all(&output.stderr)?;
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Strip the trailing newline git appends to single-value output.
fn trim_line(output: &str) -> String {
    output.trim_end_matches(['\n', '\r']).to_string()
}

/// Return the top-level directory of the repository containing `dir`.
pub fn show_toplevel(git: &dyn Git, dir: &Path) -> Result<PathBuf> {
    let output = git.run(dir, &["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(trim_line(&output)))
}

/// Return the short name of the checked-out branch, or `HEAD` when detached.
pub fn current_branch(git: &dyn Git, dir: &Path) -> Result<String> {
    let output = git.run(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(trim_line(&output))
}

/// Read a configuration value. Returns `None` when the key is not set.
///
/// With `file`, the lookup is confined to that config file relative to `dir`.
pub fn config_get(
    git: &dyn Git,
    dir: &Path,
    file: Option<&str>,
    key: &str,
) -> Result<Option<String>> {
    let mut args = vec!["config"];
    if let Some(file) = file {
        args.extend(["--file", file]);
    }
    args.extend(["--get", key]);

    match git.run(dir, &args) {
        Ok(output) => Ok(Some(trim_line(&output))),
        // git config exits 1 when the key is missing
        Err(err) if err.git_exit_code() == Some(1) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Return every `(key, value)` pair in `file` whose key matches `pattern`.
pub fn config_get_regexp(
    git: &dyn Git,
    dir: &Path,
    file: &str,
    pattern: &str,
) -> Result<Vec<(String, String)>> {
    let output = match git.run(dir, &["config", "--file", file, "--get-regexp", pattern]) {
        Ok(output) => output,
        Err(err) if err.git_exit_code() == Some(1) => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    Ok(output
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(' ') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (line.to_string(), String::new()),
        })
        .collect())
}

/// Set `key` to `value` in the config file `file`.
pub fn config_set(git: &dyn Git, dir: &Path, file: &str, key: &str, value: &str) -> Result<()> {
    git.run(dir, &["config", "--file", file, key, value])?;
    Ok(())
}

/// Remove `key` from the config file `file`.
pub fn config_unset(git: &dyn Git, dir: &Path, file: &str, key: &str) -> Result<()> {
    git.run(dir, &["config", "--file", file, "--unset", key])?;
    Ok(())
}

/// Remove a whole section from the config file `file`.
pub fn config_remove_section(git: &dyn Git, dir: &Path, file: &str, section: &str) -> Result<()> {
    git.run(dir, &["config", "--file", file, "--remove-section", section])?;
    Ok(())
}

/// Raw `git submodule status` listing restricted to `subtree`.
pub fn submodule_status(git: &dyn Git, repo_path: &Path, subtree: &str) -> Result<String> {
    git.run(repo_path, &["submodule", "status", "--", subtree])
}

/// Paths of all index entries under `pathspec`.
pub fn ls_files(git: &dyn Git, repo_path: &Path, pathspec: &str) -> Result<Vec<String>> {
    let output = git.run(repo_path, &["ls-files", "--", pathspec])?;
    Ok(output
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Paths of all gitlink (submodule) entries recorded in the index.
pub fn gitlinks(git: &dyn Git, repo_path: &Path) -> Result<Vec<String>> {
    let output = git.run(repo_path, &["ls-files", "--stage"])?;

    // <mode> SP <object> SP <stage> TAB <path>
    Ok(output
        .lines()
        .filter_map(|line| {
            let (meta, path) = line.split_once('\t')?;
            meta.starts_with(GITLINK_MODE).then(|| path.to_string())
        })
        .collect())
}

/// Stage `path` for inclusion in the next commit.
pub fn add(git: &dyn Git, repo_path: &Path, path: &str) -> Result<()> {
    git.run(repo_path, &["add", path])?;
    Ok(())
}

/// Check whether the repository has staged, unstaged or untracked changes.
pub fn has_uncommitted_changes(git: &dyn Git, repo_path: &Path) -> Result<bool> {
    let output = git.run(repo_path, &["status", "--porcelain"])?;
    Ok(!output.trim().is_empty())
}

/// Drop `path` from the index, keeping whatever is left in the working tree.
pub fn rm_cached(git: &dyn Git, repo_path: &Path, path: &str) -> Result<()> {
    git.run(repo_path, &["rm", "--cached", "-f", path])?;
    Ok(())
}

/// Clone `origin` and register it as a new submodule at `dest`.
pub fn submodule_add(git: &dyn Git, repo_path: &Path, origin: &str, dest: &str) -> Result<()> {
    git.run(repo_path, &["submodule", "add", origin, dest])?;
    Ok(())
}
