#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use branchkeeper::{RepoController, Reporter};
use git2::{Commit, IndexAddOption, Oid, Repository, RepositoryInitOptions};
use tempfile::TempDir;

/// Reporter that keeps every message so tests can assert on them.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<(&'static str, String)>>>);

impl Recorder {
    pub fn messages(&self, level: &str) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: &'static str, msg: &str) {
        self.0.lock().unwrap().push((level, msg.to_string()));
    }
}

impl Reporter for Recorder {
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn success(&self, msg: &str) {
        self.push("success", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
}

/// An upstream repository and a clone of it, both with `main` checked out.
pub struct Sandbox {
    _dir: TempDir,
    pub upstream_path: PathBuf,
    pub local_path: PathBuf,
    pub upstream: Repository,
    pub local: Repository,
}

impl Sandbox {
    /// Upstream gets one commit (`README.md`), then it is cloned.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let upstream_path = dir.path().join("upstream");
        let local_path = dir.path().join("local");

        let upstream = init_repo(&upstream_path);
        write_file(&upstream_path, "README.md", "hello\n");
        commit_all(&upstream, "initial commit");

        let local = clone_repo(&upstream_path, &local_path);
        Self {
            _dir: dir,
            upstream_path,
            local_path,
            upstream,
            local,
        }
    }

    pub fn controller(&self) -> (RepoController, Recorder) {
        let rec = Recorder::default();
        let ctl = RepoController::open(&self.local_path, Box::new(rec.clone()));
        (ctl, rec)
    }

    pub fn upstream_commit(&self, file: &str, contents: &str) -> Oid {
        write_file(&self.upstream_path, file, contents);
        commit_all(&self.upstream, &format!("upstream: {}", file))
    }

    pub fn local_commit(&self, file: &str, contents: &str) -> Oid {
        write_file(&self.local_path, file, contents);
        commit_all(&self.local, &format!("local: {}", file))
    }
}

pub fn init_repo(path: &Path) -> Repository {
    fs::create_dir_all(path).unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = match Repository::init_opts(path, &opts) {
        Ok(repo) => repo,
        Err(err) => panic!("failed to init repo: {}", err),
    };
    set_identity(&repo);
    repo
}

pub fn clone_repo(src: &Path, dst: &Path) -> Repository {
    let repo = match Repository::clone(src.to_str().unwrap(), dst) {
        Ok(repo) => repo,
        Err(err) => panic!("failed to clone repo: {}", err),
    };
    set_identity(&repo);
    repo
}

fn set_identity(repo: &Repository) {
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "name").unwrap();
    config.set_str("user.email", "email").unwrap();
}

pub fn write_file(repo_path: &Path, name: &str, contents: &str) {
    let path = repo_path.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Stage everything and commit on HEAD.
pub fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let sig = repo.signature().unwrap();
    let parents: Vec<Commit> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

pub fn create_branch(repo: &Repository, branch_name: &str) {
    let commit = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch(branch_name, &commit, false).unwrap();
}

pub fn branch_tip(repo: &Repository, branch_name: &str) -> Oid {
    repo.refname_to_id(&format!("refs/heads/{}", branch_name))
        .unwrap()
}

pub fn head_branch(repo: &Repository) -> String {
    repo.head().unwrap().shorthand().unwrap().to_string()
}
