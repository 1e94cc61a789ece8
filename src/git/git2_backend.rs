use anyhow::{Context, Result, anyhow, bail};
use git2::{
    BranchType, Cred, FetchOptions, ObjectType, Oid, Reference, RemoteCallbacks, Repository,
    Status, StatusOptions, build::CheckoutBuilder,
};
use std::collections::HashMap;

use super::fetch_info::{FetchFlags, FetchRecord, FetchReport, RefKind, TipUpdate};

/// How a pull changed the current branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    UpToDate,
    FastForward,
    Merged,
}

/// Build a `FetchOptions` with SSH-agent credentials enabled.
///
/// This allows Git operations to authenticate using the user's SSH agent.
/// If no SSH key is found, it falls back to default credentials.
fn fetch_opts_with_creds() -> FetchOptions<'static> {
    let mut cb = RemoteCallbacks::new();
    cb.credentials(|_url, username_from_url, _allowed| {
        Cred::ssh_key_from_agent(username_from_url.unwrap_or("git")).or_else(|_| Cred::default())
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(cb);
    fo
}

/// Snapshot of every ref a fetch from `remote_name` may write to.
fn tracking_tips(repo: &Repository, remote_name: &str) -> Result<HashMap<String, Oid>> {
    let mut tips = HashMap::new();
    for glob in [format!("refs/remotes/{}/*", remote_name), "refs/tags/*".to_string()] {
        for reference in repo.references_glob(&glob)?.flatten() {
            if let (Some(name), Some(oid)) = (reference.name(), reference.target()) {
                tips.insert(name.to_string(), oid);
            }
        }
    }
    Ok(tips)
}

/// Map an advertised ref name to its short name, kind and local destination.
///
/// Anything that is neither a branch head nor a tag (`HEAD`, `refs/pull/*`,
/// peeled `^{}` entries) is skipped.
fn classify_advertised(remote_name: &str, name: &str) -> Option<(String, RefKind, String)> {
    if let Some(branch) = name.strip_prefix("refs/heads/") {
        return Some((
            branch.to_string(),
            RefKind::Branch,
            format!("refs/remotes/{}/{}", remote_name, branch),
        ));
    }
    if let Some(tag) = name.strip_prefix("refs/tags/") {
        if tag.ends_with("^{}") {
            return None;
        }
        return Some((tag.to_string(), RefKind::Tag, name.to_string()));
    }
    None
}

/// Perform `git fetch <remote>` and decode what happened to each ref.
///
/// Branches land in `refs/remotes/<remote>/*`, tags in `refs/tags/*`.
/// The report is built from the remote's ref advertisement, the tracking
/// refs before the fetch, and the tracking refs after it.
///
/// # Errors
/// Returns an error if the remote does not exist or the fetch fails.
pub fn fetch_remote(repo: &Repository, remote_name: &str) -> Result<FetchReport> {
    let before = tracking_tips(repo, remote_name)?;

    let mut fo = fetch_opts_with_creds();
    let mut remote = repo
        .find_remote(remote_name)
        .with_context(|| format!("remote not found: {}", remote_name))?;
    remote
        .fetch(
            &[
                format!("refs/heads/*:refs/remotes/{}/*", remote_name),
                "refs/tags/*:refs/tags/*".to_string(),
            ],
            Some(&mut fo),
            None,
        )
        .with_context(|| format!("git fetch {}", remote_name))?;

    let advertised: Vec<(String, Oid)> = remote
        .list()
        .context("failed to read remote ref advertisement")?
        .iter()
        .map(|h| (h.name().to_string(), h.oid()))
        .collect();

    let mut records = Vec::new();
    for (name, remote_oid) in advertised {
        let Some((short, kind, local_path)) = classify_advertised(remote_name, &name) else {
            continue;
        };
        let tip = TipUpdate {
            old: before.get(&local_path).copied(),
            tracking: repo.refname_to_id(&local_path).ok(),
            advertised: remote_oid,
        };
        let descends = match (tip.old, tip.tracking) {
            (Some(old), Some(new)) if old != new => {
                repo.graph_descendant_of(new, old).unwrap_or(false)
            }
            _ => false,
        };
        records.push(FetchRecord {
            name: short,
            kind,
            remote_ref_path: local_path,
            commit: remote_oid,
            old_commit: tip.old,
            flags: FetchFlags::decode(kind, &tip, descends),
        });
    }
    Ok(FetchReport::new(records))
}

/// Short name of the branch HEAD points to.
///
/// # Errors
/// Returns an error if HEAD is unborn or detached.
pub fn current_branch_name(repo: &Repository) -> Result<String> {
    let head = repo.head().context("failed to resolve HEAD")?;
    if !head.is_branch() {
        bail!("HEAD is detached");
    }
    head.shorthand()
        .map(String::from)
        .ok_or_else(|| anyhow!("invalid branch name"))
}

/// Commit a local branch points to.
pub fn local_branch_tip(repo: &Repository, branch: &str) -> Result<Oid> {
    let b = repo
        .find_branch(branch, BranchType::Local)
        .with_context(|| format!("local branch not found: {}", branch))?;
    b.get()
        .target()
        .ok_or_else(|| anyhow!("branch {} has no direct target", branch))
}

/// True if `tip` is `commit` or has it in its history.
pub fn contains_commit(repo: &Repository, tip: Oid, commit: Oid) -> Result<bool> {
    if tip == commit {
        return Ok(true);
    }
    repo.graph_descendant_of(tip, commit)
        .context("failed to compare commit ancestry")
}

/// Whether the repository has uncommitted changes.
///
/// Modified, staged, deleted, renamed and conflicted tracked files always
/// count. Untracked files count only when `include_untracked` is set;
/// ignored files never do.
pub fn has_pending_changes(repo: &Repository, include_untracked: bool) -> Result<bool> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(include_untracked)
        .recurse_untracked_dirs(include_untracked)
        .include_ignored(false);
    let statuses = repo
        .statuses(Some(&mut opts))
        .context("failed to read working tree status")?;
    Ok(statuses
        .iter()
        .any(|e| e.status() != Status::CURRENT && !e.status().is_ignored()))
}

/// Merge the already-fetched `refs/remotes/<remote>/<branch>` into the
/// checked-out branch.
///
/// Callers fetch first (see [`fetch_remote`]); this only works on local refs.
/// Fast-forward when the local branch is behind, a merge commit when both
/// sides moved. The merge is computed in memory and the result is checked
/// out in safe mode before any ref moves, so a conflict or an untracked file
/// in the way leaves branch, index and working tree as they were.
///
/// # Errors
/// Returns an error if the tracking branch is missing, the merge conflicts,
/// the checkout would overwrite untracked files, or no committer signature
/// is configured.
pub fn merge_tracking_branch(
    repo: &Repository,
    remote_name: &str,
    branch: &str,
) -> Result<PullOutcome> {
    let tracking = format!("refs/remotes/{}/{}", remote_name, branch);
    let fetch_ref = repo
        .find_reference(&tracking)
        .with_context(|| format!("remote branch not found: {}", tracking))?;
    let fetch_commit = repo.reference_to_annotated_commit(&fetch_ref)?;

    let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;
    if analysis.is_up_to_date() {
        return Ok(PullOutcome::UpToDate);
    }
    if analysis.is_fast_forward() {
        let refname = format!("refs/heads/{}", branch);
        let mut local = repo.find_reference(&refname)?;
        let target = repo.find_object(fetch_commit.id(), Some(ObjectType::Commit))?;
        repo.checkout_tree(&target, Some(CheckoutBuilder::new().safe()))
            .with_context(|| format!("cannot fast-forward {} to {}", branch, tracking))?;
        local.set_target(
            fetch_commit.id(),
            &format!("pull: fast-forward {} to {}", branch, fetch_commit.id()),
        )?;
        repo.set_head(&refname)?;
        return Ok(PullOutcome::FastForward);
    }
    if !analysis.is_normal() {
        bail!("cannot merge {} into {}", tracking, branch);
    }

    let local = repo.head()?.peel_to_commit()?;
    let remote = repo.find_commit(fetch_commit.id())?;
    let base = repo
        .merge_base(local.id(), remote.id())
        .with_context(|| format!("{} and {} share no history", branch, tracking))?;
    let base_tree = repo.find_commit(base)?.tree()?;

    let mut index = repo.merge_trees(&base_tree, &local.tree()?, &remote.tree()?, None)?;
    if index.has_conflicts() {
        let paths: Vec<String> = index
            .conflicts()?
            .flatten()
            .filter_map(|c| c.our.or(c.their).or(c.ancestor))
            .map(|e| String::from_utf8_lossy(&e.path).into_owned())
            .collect();
        bail!(
            "merge conflict pulling {} into {}: {}",
            tracking,
            branch,
            paths.join(", ")
        );
    }

    let tree = repo.find_tree(index.write_tree_to(repo)?)?;
    let sig = repo
        .signature()
        .context("no committer identity configured for merge commit")?;
    repo.checkout_tree(tree.as_object(), Some(CheckoutBuilder::new().safe()))
        .with_context(|| format!("cannot merge {} into {}", tracking, branch))?;
    let msg = format!("Merge branch '{}' of {} into {}", branch, remote_name, branch);
    repo.commit(Some("HEAD"), &sig, &sig, &msg, &tree, &[&local, &remote])?;
    Ok(PullOutcome::Merged)
}

/// Check out the reference's tree and attach HEAD to it.
///
/// The tree checkout runs in safe mode, so it refuses to overwrite local
/// modifications instead of discarding them.
fn checkout_attach_to_reference(repo: &Repository, reference: &Reference) -> Result<()> {
    let name = reference
        .name()
        .ok_or_else(|| anyhow!("invalid reference name"))?;
    let target = reference.peel(ObjectType::Commit)?;
    repo.checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
    repo.set_head(name)?;
    Ok(())
}

/// Switch the working tree to an existing local branch.
///
/// # Errors
/// Returns an error if `branch` does not exist locally or checkout fails.
pub fn checkout_local_branch(repo: &Repository, branch: &str) -> Result<()> {
    let reference = repo
        .find_branch(branch, BranchType::Local)
        .with_context(|| format!("local branch not found: {}", branch))?
        .into_reference();
    checkout_attach_to_reference(repo, &reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_branch_heads() {
        let (short, kind, path) = classify_advertised("origin", "refs/heads/feature/x").unwrap();
        assert_eq!(short, "feature/x");
        assert_eq!(kind, RefKind::Branch);
        assert_eq!(path, "refs/remotes/origin/feature/x");
    }

    #[test]
    fn classify_tags_and_skip_peeled() {
        let (short, kind, path) = classify_advertised("origin", "refs/tags/v1.0").unwrap();
        assert_eq!(short, "v1.0");
        assert_eq!(kind, RefKind::Tag);
        assert_eq!(path, "refs/tags/v1.0");
        assert!(classify_advertised("origin", "refs/tags/v1.0^{}").is_none());
    }

    #[test]
    fn classify_skips_head_and_other_namespaces() {
        assert!(classify_advertised("origin", "HEAD").is_none());
        assert!(classify_advertised("origin", "refs/pull/1/head").is_none());
    }
}
