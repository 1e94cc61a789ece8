use anyhow::{Result, anyhow};
use git2::Repository;
use std::path::Path;

use crate::config::{DEFAULT_REMOTE, RepositorySettings};
use crate::git::{
    FetchReport, PullOutcome, checkout_local_branch, contains_commit, current_branch_name,
    fetch_remote, has_pending_changes, local_branch_tip, merge_tracking_branch,
};
use crate::report::Reporter;

/// What the controller managed to load at construction time.
///
/// The remote is kept by name and resolved against the loaded repository
/// whenever it is needed, so it cannot outlive or exist without it.
enum RepoState {
    Unloaded,
    Loaded {
        repo: Repository,
        remote: Option<String>,
    },
}

/// Branch inspection, up-to-date checks, pulls and checkouts for a single
/// local repository.
///
/// A controller whose path is not a repository stays usable: every
/// operation answers `false`/empty instead of failing. Failures of the
/// underlying git operations (network, conflicts, unknown branches) are
/// returned as errors and left to the caller.
///
/// Not meant to be shared between threads; use one controller per task.
pub struct RepoController {
    state: RepoState,
    include_untracked: bool,
    reporter: Box<dyn Reporter>,
}

impl RepoController {
    /// Open the repository at `path`, using the `origin` remote.
    pub fn open(path: impl AsRef<Path>, reporter: Box<dyn Reporter>) -> Self {
        Self::open_with(path.as_ref(), DEFAULT_REMOTE, false, reporter)
    }

    /// Open the repository described by the `[repository]` config section.
    pub fn from_settings(settings: &RepositorySettings, reporter: Box<dyn Reporter>) -> Self {
        Self::open_with(
            &settings.root(),
            &settings.remote,
            settings.include_untracked,
            reporter,
        )
    }

    fn open_with(
        path: &Path,
        remote_name: &str,
        include_untracked: bool,
        reporter: Box<dyn Reporter>,
    ) -> Self {
        reporter.debug(&format!("Loading git at {}", path.display()));
        let repo = match Repository::open(path) {
            Ok(repo) => repo,
            Err(e) => {
                reporter.warn("Error while loading local git repository. Skipping all git operation.");
                reporter.debug(&format!("open {}: {}", path.display(), e));
                return Self {
                    state: RepoState::Unloaded,
                    include_untracked,
                    reporter,
                };
            }
        };
        reporter.debug("Git repository successfully loaded");
        match current_branch_name(&repo) {
            Ok(branch) => reporter.success(&format!("Current git branch : {}", branch)),
            Err(e) => reporter.debug(&format!("No current branch: {}", e)),
        }

        let names: Vec<String> = match repo.remotes() {
            Ok(r) => r.iter().flatten().map(String::from).collect(),
            Err(e) => {
                reporter.debug(&format!("listing remotes of {}: {}", path.display(), e));
                Vec::new()
            }
        };
        let remote = if names.is_empty() {
            reporter.warn(&format!("No remote git {} found on repository", remote_name));
            None
        } else if names.iter().any(|n| n == remote_name) {
            Some(remote_name.to_string())
        } else {
            reporter.warn(&format!(
                "No remote git {} found on repository (available: {})",
                remote_name,
                names.join(", ")
            ));
            None
        };

        Self {
            state: RepoState::Loaded { repo, remote },
            include_untracked,
            reporter,
        }
    }

    fn loaded(&self) -> Option<(&Repository, Option<&str>)> {
        match &self.state {
            RepoState::Unloaded => None,
            RepoState::Loaded { repo, remote } => Some((repo, remote.as_deref())),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded().is_some()
    }

    pub fn has_remote(&self) -> bool {
        self.remote_name().is_some()
    }

    pub fn remote_name(&self) -> Option<&str> {
        self.loaded().and_then(|(_, remote)| remote)
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.loaded().and_then(|(repo, _)| repo.workdir())
    }

    /// Name of the currently checked-out branch.
    ///
    /// # Errors
    /// Fails when no repository is loaded, or HEAD is detached or unborn.
    pub fn current_branch(&self) -> Result<String> {
        let (repo, _) = self
            .loaded()
            .ok_or_else(|| anyhow!("no git repository loaded"))?;
        current_branch_name(repo)
    }

    /// Fetch the remote and return the decoded per-ref result.
    ///
    /// `None` when there is no repository or no remote to fetch from.
    pub fn fetch(&self) -> Result<Option<FetchReport>> {
        match self.loaded() {
            Some((repo, Some(remote))) => Ok(Some(fetch_remote(repo, remote)?)),
            _ => Ok(None),
        }
    }

    /// Branch names available on the remote, in ref-name order.
    pub fn list_remote_branches(&self) -> Result<Vec<String>> {
        Ok(self
            .fetch()?
            .map(|report| report.branch_names())
            .unwrap_or_default())
    }

    /// True only if the working tree has no uncommitted changes.
    pub fn is_safe_to_modify(&self) -> Result<bool> {
        let Some((repo, _)) = self.loaded() else {
            return Ok(false);
        };
        if has_pending_changes(repo, self.include_untracked)? {
            self.reporter
                .warn("Local git have unsaved change. Skipping operation.");
            return Ok(false);
        }
        Ok(true)
    }

    /// Whether the local branch already contains the remote tip.
    ///
    /// `branch` defaults to the current branch. A local branch ahead of the
    /// remote counts as up to date.
    ///
    /// # Errors
    /// Fails if the local or the remote branch does not exist, or the fetch
    /// fails.
    pub fn is_up_to_date(&self, branch: Option<&str>) -> Result<bool> {
        let Some((repo, Some(remote))) = self.loaded() else {
            return Ok(false);
        };
        let branch = match branch {
            Some(b) => b.to_string(),
            None => current_branch_name(repo)?,
        };
        self.fetch_and_compare(repo, remote, &branch)
    }

    /// Fetch `remote` and check that local `branch` contains its remote tip.
    fn fetch_and_compare(&self, repo: &Repository, remote: &str, branch: &str) -> Result<bool> {
        let local = local_branch_tip(repo, branch)?;

        let report = fetch_remote(repo, remote)?;
        let info = report
            .branch(branch)
            .ok_or_else(|| anyhow!("remote {} has no branch {}", remote, branch))?;

        self.reporter
            .debug(&format!("Fetch flags : {:?}", info.flags.set_names()));
        self.reporter.debug(&format!(
            "Fetch old commit : {}",
            info.old_commit
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string())
        ));
        self.reporter
            .debug(&format!("Fetch remote path : {}", info.remote_ref_path));
        for name in info.flags.set_names() {
            self.reporter.debug(&format!("{} flag detected", name));
        }

        contains_commit(repo, local, info.commit)
    }

    /// Pull the current branch from the remote.
    ///
    /// Returns `false` without side effects when the tree is dirty, the
    /// branch is already up to date or there is no remote. The fetch done by
    /// the up-to-date check is the one the merge uses.
    ///
    /// # Errors
    /// Fetch failures, merge conflicts and untracked files in the way are
    /// returned as-is; the repository is left as it was.
    pub fn update(&self) -> Result<bool> {
        if !self.is_safe_to_modify()? {
            return Ok(false);
        }
        let Some((repo, Some(remote))) = self.loaded() else {
            return Ok(false);
        };
        let branch = current_branch_name(repo)?;
        if self.fetch_and_compare(repo, remote, &branch)? {
            self.reporter.info("Git branch is already up-to-date.");
            return Ok(false);
        }
        self.reporter
            .info(&format!("Updating local git '{}'", branch));
        match merge_tracking_branch(repo, remote, &branch)? {
            PullOutcome::UpToDate => {
                self.reporter.info("Git branch is already up-to-date.");
                Ok(false)
            }
            PullOutcome::FastForward => {
                self.reporter
                    .success("Git successfully updated (fast-forward)");
                Ok(true)
            }
            PullOutcome::Merged => {
                self.reporter
                    .success("Git successfully updated (merge commit created)");
                Ok(true)
            }
        }
    }

    /// Switch the working tree to an existing local branch.
    ///
    /// Returns `false` when the tree is dirty or `branch` is already checked
    /// out; nothing on disk changes in either case.
    ///
    /// # Errors
    /// Fails if `branch` does not exist locally.
    pub fn checkout(&self, branch: &str) -> Result<bool> {
        if !self.is_safe_to_modify()? {
            return Ok(false);
        }
        let Some((repo, _)) = self.loaded() else {
            return Ok(false);
        };
        if current_branch_name(repo).ok().as_deref() == Some(branch) {
            self.reporter
                .warn(&format!("Branch '{}' is already the current branch", branch));
            return Ok(false);
        }
        checkout_local_branch(repo, branch)?;
        self.reporter
            .success(&format!("Git successfully checkout to '{}'", branch));
        Ok(true)
    }
}
