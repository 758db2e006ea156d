use git2::{DiffOptions, Oid, Repository, Revwalk, Sort};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::git::repository::{commit_to_model, GitRepository};
use crate::models::CommitPage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WalkOrder {
    /// Newest committer time first
    #[default]
    Time,
    /// Children always before their parents
    Topo,
}

impl WalkOrder {
    fn sorting(self) -> Sort {
        match self {
            WalkOrder::Time => Sort::TIME,
            WalkOrder::Topo => Sort::TOPOLOGICAL,
        }
    }
}

/// Lazy, path-filtered walk over the full ancestry of a start commit.
///
/// Each call to `next` pulls from the underlying revwalk until a commit that
/// touches the path (if any) is found. Not restartable.
pub struct CommitWalk<'r> {
    repo: &'r Repository,
    revwalk: Revwalk<'r>,
    path: Option<String>,
}

impl<'r> Iterator for CommitWalk<'r> {
    type Item = Result<git2::Commit<'r>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let oid = match self.revwalk.next()? {
                Ok(oid) => oid,
                Err(e) => return Some(Err(e.into())),
            };
            let commit = match self.repo.find_commit(oid) {
                Ok(c) => c,
                Err(e) => return Some(Err(e.into())),
            };

            let Some(path) = self.path.as_deref() else {
                return Some(Ok(commit));
            };
            match commit_touches_path(self.repo, &commit, path) {
                Ok(true) => return Some(Ok(commit)),
                Ok(false) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Whether `commit` changed `path` relative to its first parent.
///
/// A root commit touches the path iff the path exists in its tree. Only the
/// tree-level deltas are computed, no blob content is read.
pub fn commit_touches_path(repo: &Repository, commit: &git2::Commit, path: &str) -> Result<bool> {
    let tree = commit.tree()?;

    if commit.parent_count() == 0 {
        return Ok(tree.get_path(Path::new(path)).is_ok());
    }

    let parent_tree = commit.parent(0)?.tree()?;

    let mut opts = DiffOptions::new();
    opts.pathspec(path);
    opts.skip_binary_check(true);

    let diff = repo.diff_tree_to_tree(Some(&parent_tree), Some(&tree), Some(&mut opts))?;

    Ok(diff.deltas().len() > 0)
}

impl GitRepository {
    /// Start a lazy walk at `start`.
    ///
    /// Fails with `RevisionUnavailable` if `start` cannot be pushed.
    pub fn commits_from(&self, start: Oid, order: WalkOrder, path: Option<&str>) -> Result<CommitWalk<'_>> {
        let mut revwalk = self.inner().revwalk()?;
        revwalk.set_sorting(order.sorting())?;
        revwalk
            .push(start)
            .map_err(|e| EngineError::RevisionUnavailable(format!("{}: {}", start, e.message())))?;

        Ok(CommitWalk {
            repo: self.inner(),
            revwalk,
            path: path.filter(|p| !p.is_empty() && *p != "/").map(|p| p.trim_matches('/').to_string()),
        })
    }

    /// One page of history starting at `start`.
    ///
    /// `offset` counts matching commits. `has_more` is `returned == limit`,
    /// callers should read it as "maybe more". If `start` cannot be walked
    /// the walk restarts from HEAD.
    pub fn walk(
        &self,
        start: Oid,
        order: WalkOrder,
        path: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<CommitPage> {
        let walk = match self.commits_from(start, order, path) {
            Ok(walk) => walk,
            Err(EngineError::RevisionUnavailable(reason)) => {
                tracing::warn!("Cannot walk from {}, falling back to HEAD", reason);
                self.commits_from(self.head()?, order, path)?
            }
            Err(e) => return Err(e),
        };

        let start_time = std::time::Instant::now();
        let mut walk = walk;
        let mut commits = Vec::with_capacity(limit.min(256));
        let mut skipped = 0;
        // Errors inside the offset window fail the page like any other
        while commits.len() < limit {
            let Some(commit) = walk.next() else { break };
            let commit = commit?;
            if skipped < offset {
                skipped += 1;
                continue;
            }
            commits.push(commit_to_model(&commit));
        }
        tracing::debug!(
            "Walked {} commits (offset {}, path {:?}) in {:?}",
            commits.len(),
            offset,
            path,
            start_time.elapsed()
        );

        let has_more = limit > 0 && commits.len() == limit;
        Ok(CommitPage {
            commits,
            offset,
            limit,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestRepo;

    fn ids(page: &CommitPage) -> Vec<String> {
        page.commits.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn path_filter_keeps_only_touching_commits() {
        let test = TestRepo::new();
        let c3 = test.commit(&[("a.txt", "a1\n"), ("b.txt", "b1\n")], "c3");
        let c2 = test.commit(&[("b.txt", "b2\n")], "c2");
        let c1 = test.commit(&[("a.txt", "a2\n")], "c1");
        let _c0 = test.commit(&[("b.txt", "b3\n")], "c0");

        let repo = test.open();
        let head = repo.head().unwrap();
        let page = repo.walk(head, WalkOrder::Time, Some("a.txt"), 0, 10).unwrap();
        assert_eq!(ids(&page), vec![c1.to_string(), c3.to_string()]);
        assert!(!page.has_more);

        let all = repo.walk(head, WalkOrder::Time, None, 0, 10).unwrap();
        assert_eq!(all.commits.len(), 4);
        assert_eq!(all.commits[2].id, c2.to_string());
    }

    #[test]
    fn directory_pathspec_matches_nested_files() {
        let test = TestRepo::new();
        let c1 = test.commit(&[("src/lib.rs", "fn a() {}\n")], "add lib");
        test.commit(&[("README", "hi\n")], "readme");
        let c3 = test.commit(&[("src/deep/mod.rs", "// x\n")], "add mod");

        let repo = test.open();
        let page = repo.walk(repo.head().unwrap(), WalkOrder::Time, Some("src/"), 0, 10).unwrap();
        assert_eq!(ids(&page), vec![c3.to_string(), c1.to_string()]);
    }

    #[test]
    fn offset_counts_matching_commits_only() {
        let test = TestRepo::new();
        let mut touching = Vec::new();
        for i in 0..5 {
            let content = format!("{}\n", i);
            touching.push(test.commit(&[("a.txt", content.as_str())], "a"));
            test.commit(&[("noise.txt", content.as_str())], "noise");
        }
        touching.reverse();

        let repo = test.open();
        let head = repo.head().unwrap();
        let page = repo.walk(head, WalkOrder::Time, Some("a.txt"), 1, 2).unwrap();
        assert_eq!(ids(&page), vec![touching[1].to_string(), touching[2].to_string()]);
        assert!(page.has_more);

        let last = repo.walk(head, WalkOrder::Time, Some("a.txt"), 4, 2).unwrap();
        assert_eq!(ids(&last), vec![touching[4].to_string()]);
        assert!(!last.has_more);
    }

    #[test]
    fn missing_commit_inside_offset_fails_the_page() {
        let test = TestRepo::new();
        test.commit(&[("a.txt", "1\n")], "c1");
        let c2 = test.commit(&[("a.txt", "2\n")], "c2");
        let c3 = test.commit(&[("a.txt", "3\n")], "c3");

        let hex = c2.to_string();
        let loose = test.repo.path().join("objects").join(&hex[..2]).join(&hex[2..]);
        std::fs::remove_file(loose).unwrap();

        let repo = test.open();
        assert!(repo.walk(c3, WalkOrder::Time, None, 2, 10).is_err());
    }

    #[test]
    fn has_more_is_a_heuristic() {
        let test = TestRepo::new();
        test.commit(&[("a.txt", "1\n")], "one");
        test.commit(&[("a.txt", "2\n")], "two");

        let repo = test.open();
        // Exactly `limit` commits exist, the flag still says "maybe more"
        let page = repo.walk(repo.head().unwrap(), WalkOrder::Time, None, 0, 2).unwrap();
        assert_eq!(page.commits.len(), 2);
        assert!(page.has_more);
    }

    #[test]
    fn walk_follows_all_merge_parents() {
        let test = TestRepo::new();
        let base = test.commit(&[("a.txt", "base\n")], "base");
        let side = test.commit_with(&[("side.txt", "s\n")], &[], "side", None, &[base]);
        let merge = test.commit_with(&[], &[], "merge", Some("HEAD"), &[base, side]);

        let repo = test.open();
        let page = repo.walk(merge, WalkOrder::Topo, None, 0, 10).unwrap();
        let got = ids(&page);
        assert_eq!(got.len(), 3);
        assert_eq!(got[0], merge.to_string());
        assert!(got.contains(&side.to_string()));
        // Parents never come before their children
        let pos = |oid: Oid| got.iter().position(|id| *id == oid.to_string()).unwrap();
        assert!(pos(side) < pos(base));

        let filtered = repo.walk(merge, WalkOrder::Time, Some("side.txt"), 0, 10).unwrap();
        // The merge touches side.txt relative to its first parent, side adds it
        assert_eq!(ids(&filtered), vec![merge.to_string(), side.to_string()]);
    }

    #[test]
    fn unwalkable_start_falls_back_to_head() {
        let test = TestRepo::new();
        let c1 = test.commit(&[("a.txt", "1\n")], "one");

        let repo = test.open();
        let bogus = Oid::from_str("0123456789012345678901234567890123456789").unwrap();
        let page = repo.walk(bogus, WalkOrder::Time, None, 0, 10).unwrap();
        assert_eq!(ids(&page), vec![c1.to_string()]);
    }

    #[test]
    fn root_commit_touches_existing_paths_only() {
        let test = TestRepo::new();
        let c1 = test.commit(&[("a.txt", "1\n")], "one");
        let repo = test.open();
        let commit = repo.lookup_commit(c1).unwrap();
        assert!(commit_touches_path(repo.inner(), &commit, "a.txt").unwrap());
        assert!(!commit_touches_path(repo.inner(), &commit, "b.txt").unwrap());
    }
}
