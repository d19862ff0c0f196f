#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Core library for keeping a repository's git submodules in step with the
//! dependencies that live under a gopath.
//!
//! A sync run resolves each named dependency to the repository that holds
//! it, compares the result with the submodules already registered under
//! `<gopath>/src`, and adds, refreshes or removes registrations so the two
//! agree. Vendoring is the one-way variant that only ever adds. The CLI
//! binary in `crates/gosub` builds on top of this library.

/// Configuration file and per-command options.
mod config;
/// Submodule listing, with a repair-and-retry fallback.
mod detect;
/// Error type shared by every operation.
mod error;
/// Helper routines for interacting with Git repositories.
mod git;
/// High-level orchestration of sync, vendor and fix runs.
mod gosub;
/// Remote URL normalization.
mod origin;
/// Output channel abstractions and implementations.
mod output;
/// Dependency resolution and remote metadata.
mod package;
/// Set arithmetic over submodule paths.
mod plan;
/// Recovery from half-written submodule registrations.
mod repair;
/// Applying a plan to the repository.
mod sync;
/// One-way vendoring of dependencies.
mod vendor;

/// Settings file and per-command options.
pub use config::{DEFAULT_VENDOR_DIR, GOPATH_ENV, Settings, SyncOptions, VendorOptions};
/// Status-line parsing for `git submodule status`.
pub use detect::{StatusLine, parse_status, parse_status_line};
/// Error type and result alias shared by every operation.
pub use error::{GosubError, Result};
/// Git port and its subprocess implementation.
pub use git::{Git, SystemGit};
/// Re-export of the main manager type and its sync report.
pub use gosub::{Gosub, SyncReport};
/// Remote URL normalization.
pub use origin::https_origin;
/// Re-exports for output abstraction and concrete implementations.
pub use output::{Output, OutputError, Quiet, Spinner, Terminal};
/// Dependency references and resolved metadata.
pub use package::{DEFAULT_REMOTE, DependencyRef, RemoteRecord, ResolvedPackage};
/// Submodule paths and the reconciliation planner.
pub use plan::{ReconciliationPlan, SubmodulePath, plan};
/// Repair seam and the default `.gitmodules` repair.
pub use repair::{GitmodulesRepair, Repair, RepairReport};
/// Desired entries fed to the plan executor.
pub use sync::{DesiredEntry, DesiredSet};
/// Outcome of a vendoring run.
pub use vendor::VendorReport;
