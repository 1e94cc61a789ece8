//! # branchkeeper (bk)
//!
//! **bk** keeps a local git checkout in line with its remote.
//!
//! Features:
//! - `bk branch` prints the current branch
//! - `bk branches` lists branches available on the remote
//! - `bk status [BRANCH]` shows whether the tree is clean and up to date
//! - `bk update` pulls the current branch when it is safe to do so
//! - `bk checkout <BRANCH>` switches to a local branch on a clean tree
//! - `bk home` prints the directory holding `config.toml`
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use branchkeeper::{
    bk_home, cmd_branch, cmd_branches, cmd_checkout, cmd_status, cmd_update, init_tracing,
    load_config,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(
    name = "bk",
    version,
    about = "branchkeeper (bk) - keep a local git checkout up to date",
    arg_required_else_help = true
)]
struct Cli {
    /// Repository root (overrides `[repository] path` in config.toml)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the current branch
    Branch,
    /// List branches available on the remote
    Branches,
    /// Show whether the working tree is clean and up to date
    Status {
        /// Branch to compare (default: current branch)
        branch: Option<String>,
    },
    /// Pull the current branch from the remote
    Update,
    /// Switch to an existing local branch
    Checkout { branch: String },
    /// Print the branchkeeper home directory
    Home,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = load_config()?;
    if let Some(repo) = cli.repo {
        cfg.repository.path = Some(repo);
    }
    init_tracing(&cfg.log.level);

    match cli.cmd {
        Cmd::Branch => cmd_branch(&cfg),
        Cmd::Branches => cmd_branches(&cfg),
        Cmd::Status { branch } => cmd_status(&cfg, branch.as_deref()),
        Cmd::Update => cmd_update(&cfg),
        Cmd::Checkout { branch } => cmd_checkout(&cfg, &branch),
        Cmd::Home => {
            println!("{}", bk_home()?.display());
            Ok(())
        }
    }
}
