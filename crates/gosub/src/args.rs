use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("color_mode")
        .args(["color", "no_color"])
))]
/// Top-level CLI options for gosub.
pub struct Cli {
    /// Repository to operate on (defaults to the current directory)
    #[arg(short = 'r', long, global = true, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Directory holding `src/` (overrides GOSUB_GOPATH and .gosub.toml)
    #[arg(short = 'g', long, global = true, value_name = "DIR")]
    pub gopath: Option<PathBuf>,

    /// Enable colored output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Suppress all output
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Echo every git command before it runs
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    /// The primary command to execute.
    pub command: Commands,
}

#[derive(Subcommand)]
/// CLI subcommands supported by gosub.
pub enum Commands {
    /// Make the repository's submodules match a list of dependencies
    #[command(alias = "s")]
    Sync {
        /// Submodule path to leave alone (can be specified multiple times)
        #[arg(short = 'i', long = "ignore", value_name = "PATH")]
        ignore: Vec<String>,

        /// Print the plan without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Dependency names under <gopath>/src, or `-` to read them from stdin
        deps: Vec<String>,
    },

    /// Add dependencies as new submodules under the vendor directory
    #[command(alias = "v")]
    Vendor {
        /// Destination directory (defaults to `vendor` in the repository root)
        #[arg(long, value_name = "DIR")]
        vendor_dir: Option<PathBuf>,

        /// Dependency names under <gopath>/src, or `-` to read them from stdin
        deps: Vec<String>,
    },

    /// Repair inconsistent submodule registrations
    #[command(alias = "f")]
    Fix,

    /// List submodules registered under <gopath>/src
    #[command(alias = "st")]
    Status,
}
