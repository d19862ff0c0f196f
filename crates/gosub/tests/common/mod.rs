#![allow(dead_code)]

use anyhow::{Context, Result, ensure};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Return the path to the compiled `gosub` binary for integration-style tests.
pub fn gosub_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gosub"))
}

/// Run a git command inside `repo_path`, ensuring it succeeds.
pub fn git(repo_path: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new("git")
        .current_dir(repo_path)
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;

    ensure!(
        output.status.success(),
        "git command failed: git {}\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    Ok(output)
}

/// Stdout of a successful git command.
pub fn git_stdout(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = git(repo_path, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Initialise a new repository at `repo_path` on `main` with a README commit.
pub fn init_repository(repo_path: &Path) -> Result<()> {
    if !repo_path.exists() {
        fs::create_dir_all(repo_path)?;
    }

    git(repo_path, &["init"])?;
    git(repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(repo_path, &["config", "user.email", "test@example.com"])?;
    git(repo_path, &["config", "user.name", "Test User"])?;

    fs::write(repo_path.join("README.md"), "# Test Project")?;
    git(repo_path, &["add", "README.md"])?;
    git(repo_path, &["commit", "-m", "Initial commit"])?;

    Ok(())
}

/// Create a host repository inside a fresh temp dir.
pub fn create_host() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let host = temp_dir.path().canonicalize()?.join("host");
    init_repository(&host)?;
    Ok((temp_dir, host))
}

/// Create a dependency repository at `<host>/src/<name>` whose `origin` is
/// `remote`.
pub fn create_dependency(host: &Path, name: &str, remote: &str) -> Result<PathBuf> {
    let dep = host.join("src").join(name);
    init_repository(&dep)?;
    git(&dep, &["remote", "add", "origin", remote])?;
    Ok(dep)
}

/// Prepare a `Command` configured to run `gosub` against `repo_path`.
pub fn gosub_command(repo_path: &Path) -> Command {
    let mut cmd = Command::new(gosub_binary());
    cmd.current_dir(repo_path);
    cmd.env_remove("GOSUB_GOPATH");
    cmd.arg("--no-color");
    cmd
}

/// Run `gosub` with the provided arguments, returning the command output.
pub fn run_gosub(repo_path: &Path, args: &[&str]) -> Result<Output> {
    let mut cmd = gosub_command(repo_path);
    cmd.args(args);
    cmd.output()
        .with_context(|| format!("failed to run gosub {}", args.join(" ")))
}

/// Run `gosub`, feeding `stdin` to the process.
pub fn run_gosub_with_stdin(repo_path: &Path, args: &[&str], stdin: &str) -> Result<Output> {
    let mut cmd = gosub_command(repo_path);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().context("failed to spawn gosub")?;
    child
        .stdin
        .take()
        .context("stdin was not piped")?
        .write_all(stdin.as_bytes())?;
    Ok(child.wait_with_output()?)
}

/// Fail the test with the captured streams unless `output` succeeded.
pub fn assert_success(output: &Output, what: &str) {
    if !output.status.success() {
        eprintln!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        eprintln!("stderr: {}", String::from_utf8_lossy(&output.stderr));
        panic!("{what} failed");
    }
}

/// Contents of `<host>/.gitmodules`, or an empty string if it is missing.
pub fn gitmodules(host: &Path) -> String {
    fs::read_to_string(host.join(".gitmodules")).unwrap_or_default()
}
