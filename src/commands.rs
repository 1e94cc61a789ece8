use anyhow::{Result, bail};
use colored::Colorize;
use indicatif::ProgressBar;
use std::time::Duration;

use crate::config::Config;
use crate::controller::RepoController;
use crate::progress::{err_style, ok_style, skip_style, spinner_style};
use crate::report::TracingReporter;

/// Open the configured repository, refusing to continue if it is not one.
fn open_controller(cfg: &Config) -> Result<RepoController> {
    let ctl = RepoController::from_settings(&cfg.repository, Box::new(TracingReporter));
    if !ctl.is_loaded() {
        bail!(
            "not a git repository: {}",
            cfg.repository.root().display()
        );
    }
    Ok(ctl)
}

fn spinner(msg: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn yes_no(v: bool) -> colored::ColoredString {
    if v { "yes".green() } else { "no".red() }
}

/// CLI command: print the current branch.
pub fn cmd_branch(cfg: &Config) -> Result<()> {
    let ctl = open_controller(cfg)?;
    println!("{}", ctl.current_branch()?);
    Ok(())
}

/// CLI command: fetch and print every branch available on the remote.
///
/// The current branch, if it exists on the remote, is marked with `*`.
pub fn cmd_branches(cfg: &Config) -> Result<()> {
    let ctl = open_controller(cfg)?;
    if !ctl.has_remote() {
        eprintln!("no remote {} configured", cfg.repository.remote);
        return Ok(());
    }
    let current = ctl.current_branch().ok();

    let pb = spinner(format!("fetching {}", cfg.repository.remote));
    let branches = match ctl.list_remote_branches() {
        Ok(b) => {
            pb.finish_and_clear();
            b
        }
        Err(e) => {
            pb.set_style(err_style());
            pb.finish_with_message(format!("fetch {} (error: {})", cfg.repository.remote, e));
            return Err(e);
        }
    };

    for b in branches {
        if current.as_deref() == Some(b.as_str()) {
            println!("* {}", b.green());
        } else {
            println!("  {}", b);
        }
    }
    Ok(())
}

/// CLI command: report whether the repository can be modified and whether
/// `branch` (default: current) is up to date with the remote.
///
/// Example output:
/// ```text
/// path       /opt/project/
/// branch     main
/// remote     origin
/// clean      yes
/// up-to-date no
/// ```
pub fn cmd_status(cfg: &Config, branch: Option<&str>) -> Result<()> {
    let ctl = open_controller(cfg)?;
    let shown = match branch {
        Some(b) => b.to_string(),
        None => ctl.current_branch()?,
    };
    if let Some(dir) = ctl.workdir() {
        println!("{:<10} {}", "path", dir.display());
    }
    println!("{:<10} {}", "branch", shown.bold());
    println!(
        "{:<10} {}",
        "remote",
        ctl.remote_name().unwrap_or("none")
    );
    println!("{:<10} {}", "clean", yes_no(ctl.is_safe_to_modify()?));

    if ctl.has_remote() {
        let pb = spinner(format!("checking {}", shown));
        let up = ctl.is_up_to_date(Some(shown.as_str()));
        pb.finish_and_clear();
        println!("{:<10} {}", "up-to-date", yes_no(up?));
    }
    Ok(())
}

/// CLI command: pull the current branch from the remote.
pub fn cmd_update(cfg: &Config) -> Result<()> {
    let ctl = open_controller(cfg)?;
    let branch = ctl.current_branch()?;

    let pb = spinner(format!("updating {}", branch));
    match ctl.update() {
        Ok(true) => {
            pb.set_style(ok_style());
            pb.finish_with_message(format!("updated {}", branch));
            Ok(())
        }
        Ok(false) => {
            pb.set_style(skip_style());
            pb.finish_with_message(format!("{} not updated", branch));
            Ok(())
        }
        Err(e) => {
            pb.set_style(err_style());
            pb.finish_with_message(format!("updating {} (error: {})", branch, e));
            Err(e)
        }
    }
}

/// CLI command: switch to an existing local branch.
pub fn cmd_checkout(cfg: &Config, branch: &str) -> Result<()> {
    let ctl = open_controller(cfg)?;
    if ctl.checkout(branch)? {
        println!("{} switched to {}", "✔".green(), branch);
    } else {
        println!("{} stayed on {}", "•".yellow(), ctl.current_branch()?);
    }
    Ok(())
}
