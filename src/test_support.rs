//! Throwaway repositories for tests.
//!
//! `TestRepo` wraps a temp dir with an initialised repository whose initial
//! branch is `main`. Commits get strictly increasing timestamps so time-sorted
//! walks are deterministic.

use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::git::GitRepository;

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        Self {
            dir,
            repo,
            clock: Cell::new(1_600_000_000),
        }
    }

    /// Fresh backend handle, the way a request would open it.
    pub fn open(&self) -> GitRepository {
        GitRepository::open(self.dir.path()).unwrap()
    }

    fn signature(&self) -> Signature<'static> {
        let t = self.clock.get() + 60;
        self.clock.set(t);
        Signature::new("Test User", "test@example.com", &Time::new(t, 0)).unwrap()
    }

    fn stage(&self, files: &[(&str, &str)], removals: &[&str]) -> Oid {
        let mut index = self.repo.index().unwrap();
        for (path, content) in files {
            let full = self.dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&full, content).unwrap();
            index.add_path(Path::new(path)).unwrap();
        }
        for path in removals {
            let _ = fs::remove_file(self.dir.path().join(path));
            index.remove_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();
        index.write_tree().unwrap()
    }

    pub fn head_oid(&self) -> Option<Oid> {
        self.repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .map(|c| c.id())
    }

    /// Commit on HEAD with the given files written (created or overwritten).
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> Oid {
        let parents: Vec<Oid> = self.head_oid().into_iter().collect();
        self.commit_with(files, &[], message, Some("HEAD"), &parents)
    }

    /// Commit on HEAD removing the given paths.
    pub fn remove(&self, paths: &[&str], message: &str) -> Oid {
        let parents: Vec<Oid> = self.head_oid().into_iter().collect();
        self.commit_with(&[], paths, message, Some("HEAD"), &parents)
    }

    /// Commit with explicit parents. `update_ref = None` leaves HEAD alone.
    pub fn commit_with(
        &self,
        files: &[(&str, &str)],
        removals: &[&str],
        message: &str,
        update_ref: Option<&str>,
        parents: &[Oid],
    ) -> Oid {
        let tree_id = self.stage(files, removals);
        let tree = self.repo.find_tree(tree_id).unwrap();
        let sig = self.signature();
        let parent_commits: Vec<git2::Commit> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit> = parent_commits.iter().collect();
        self.repo
            .commit(update_ref, &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    pub fn branch(&self, name: &str, target: Oid) {
        let commit = self.repo.find_commit(target).unwrap();
        self.repo.branch(name, &commit, false).unwrap();
    }

    pub fn lightweight_tag(&self, name: &str, target: Oid) {
        let obj = self.repo.find_object(target, None).unwrap();
        self.repo.tag_lightweight(name, &obj, false).unwrap();
    }

    pub fn annotated_tag(&self, name: &str, target: Oid) -> Oid {
        let obj = self.repo.find_object(target, None).unwrap();
        let sig = self.signature();
        self.repo.tag(name, &obj, &sig, "release", false).unwrap()
    }
}
