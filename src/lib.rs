//! Crate entry point for **branchkeeper (bk)**.
//!
//! The core of the library is [`RepoController`]: a small wrapper around
//! `git2` that answers "which branch am I on", "is it safe to touch the
//! working tree", "am I behind the remote", and can pull or switch
//! branches. The `cmd_*` functions back the `bk` binary.

mod commands;
mod config;
mod controller;
mod git;
mod paths;
mod progress;
mod report;

pub use commands::{cmd_branch, cmd_branches, cmd_checkout, cmd_status, cmd_update};
pub use config::{Config, DEFAULT_REMOTE, LogSettings, RepositorySettings, load_config};
pub use controller::RepoController;
pub use git::{FetchFlags, FetchRecord, FetchReport, RefKind, TipUpdate};
pub use paths::bk_home;
pub use report::{Reporter, TracingReporter, init_tracing};
