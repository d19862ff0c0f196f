#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Command-line interface for keeping git submodules in sync with gopath
//! dependencies via the libgosub crate.

use std::{
    env,
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use libgosub::{GOPATH_ENV, Git, Gosub, GosubError, Output, Quiet, SystemGit, Terminal};

/// Command-line argument definitions.
mod args;
/// Implementations of each subcommand.
mod commands;
/// Rendering helpers shared by the commands.
mod ui;

use args::{Cli, Commands};

/// Resolve `path` against `base` unless it is already absolute.
fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine color output preference early for error handling
    let color = if cli.color {
        true
    } else if cli.no_color {
        false
    } else {
        io::stdout().is_terminal()
    };

    let output: Arc<dyn Output> = if cli.quiet {
        Arc::new(Quiet)
    } else {
        Arc::new(Terminal::new(color))
    };

    if let Err(e) = run(cli, &output) {
        // Reset any existing colors only if color was enabled and stdout is a TTY
        if color && io::stdout().is_terminal() {
            print!("\x1b[0m");
            if let Err(flush_err) = io::stdout().flush() {
                eprintln!("Failed to flush stdout while resetting colors: {flush_err}");
            }
        }

        if let Err(display_err) = output.fail(&format!("{e:#}")) {
            eprintln!("Failed to report error via output handler: {display_err:#}");
        }
        if let Err(finish_err) = output.finish() {
            eprintln!("Failed to flush output handler: {finish_err:#}");
        }

        let exit_code = e
            .downcast_ref::<GosubError>()
            .map_or(1, GosubError::exit_code);
        process::exit(exit_code);
    }
    Ok(())
}

/// Execute the selected CLI command using the provided output implementation.
fn run(cli: Cli, output: &Arc<dyn Output>) -> Result<()> {
    let cwd = env::current_dir().context("Failed to read the current directory")?;
    let repo_dir = cli
        .repo
        .map_or_else(|| cwd.clone(), |repo| absolutize(&cwd, repo));

    let git: Box<dyn Git> = if cli.verbose {
        Box::new(SystemGit::with_trace(Arc::clone(output)))
    } else {
        Box::new(SystemGit::new())
    };

    let gosub = Gosub::new(&repo_dir, git)
        .with_context(|| format!("Failed to open repository at {}", repo_dir.display()))?;
    let settings = gosub.settings()?;

    // Gopath priority: CLI flag > env var > settings file > repository root
    let env_gopath = env::var_os(GOPATH_ENV)
        .filter(|value| !value.is_empty())
        .map(|value| absolutize(&cwd, PathBuf::from(value)));
    let cli_gopath = cli.gopath.map(|path| absolutize(&cwd, path));
    let gopath = settings.gopath(gosub.repo_root(), cli_gopath, env_gopath);

    match cli.command {
        Commands::Sync {
            ignore,
            dry_run,
            deps,
        } => {
            let deps = ui::dependency_names(deps)?;
            let options = settings.sync_options(gopath, &ignore, dry_run);
            commands::sync::sync(&gosub, output.as_ref(), &deps, &options)?;
        }
        Commands::Vendor { vendor_dir, deps } => {
            let deps = ui::dependency_names(deps)?;
            let vendor_dir = vendor_dir.map(|dir| absolutize(&cwd, dir));
            let options = settings.vendor_options(gopath, vendor_dir);
            commands::vendor::vendor(&gosub, output.as_ref(), &deps, &options)?;
        }
        Commands::Fix => {
            let remote = settings.remote();
            commands::fix::fix(&gosub, output.as_ref(), &remote, &settings.ignore)?;
        }
        Commands::Status => {
            let options = settings.sync_options(gopath, &[], false);
            commands::status::status(&gosub, output.as_ref(), &options)?;
        }
    }

    output.finish()?;
    Ok(())
}
