//! Commit search over history.
//!
//! - `Message` / `Author` / `Committer`: case-insensitive substring match
//! - `Pickaxe`: commits where the number of occurrences of the query changed
//!   in some file, compared against the first parent. Submodule entries are
//!   skipped and unreadable blobs count as empty.
//!
//! Results come out in walker order and stop at `max_results`.

use git2::{DiffFile, FileMode, Oid};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::git::history::WalkOrder;
use crate::git::repository::{commit_to_model, GitRepository};
use crate::models::Commit;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    #[default]
    Message,
    Author,
    Committer,
    Pickaxe,
}

impl GitRepository {
    pub fn search(
        &self,
        start: Oid,
        kind: SearchKind,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Commit>> {
        if query.is_empty() || max_results == 0 {
            return Ok(Vec::new());
        }

        let needle = query.to_lowercase();
        let mut results = Vec::new();

        for commit in self.commits_from(start, WalkOrder::Time, None)? {
            let commit = commit?;
            let matched = match kind {
                SearchKind::Message => contains_ignore_case(commit.message(), &needle),
                SearchKind::Author => signature_matches(&commit.author(), &needle),
                SearchKind::Committer => signature_matches(&commit.committer(), &needle),
                SearchKind::Pickaxe => self.occurrence_count_changed(&commit, query)?,
            };

            if matched {
                results.push(commit_to_model(&commit));
                if results.len() >= max_results {
                    break;
                }
            }
        }

        tracing::debug!("Search {:?} for {:?}: {} results", kind, query, results.len());
        Ok(results)
    }

    fn occurrence_count_changed(&self, commit: &git2::Commit, needle: &str) -> Result<bool> {
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let diff = self
            .inner()
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        for delta in diff.deltas() {
            let before = self.count_in_file(&delta.old_file(), needle);
            let after = self.count_in_file(&delta.new_file(), needle);
            if before != after {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn count_in_file(&self, file: &DiffFile, needle: &str) -> usize {
        let id = file.id();
        if id.is_zero() || matches!(file.mode(), FileMode::Commit) {
            return 0;
        }
        match self.lookup_blob(id) {
            Ok(blob) if blob.is_binary() => 0,
            Ok(blob) => String::from_utf8_lossy(blob.content()).matches(needle).count(),
            Err(e) => {
                tracing::warn!("Skipping unreadable blob {}: {}", id, e);
                0
            }
        }
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn signature_matches(sig: &git2::Signature, needle: &str) -> bool {
    contains_ignore_case(sig.name(), needle) || contains_ignore_case(sig.email(), needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestRepo;

    #[test]
    fn message_search_is_case_insensitive_and_capped() {
        let test = TestRepo::new();
        test.commit(&[("a.txt", "1\n")], "Fix parser");
        test.commit(&[("a.txt", "2\n")], "unrelated");
        let c3 = test.commit(&[("a.txt", "3\n")], "fix PARSER again");

        let repo = test.open();
        let head = repo.head().unwrap();
        let hits = repo.search(head, SearchKind::Message, "parser", 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, c3.to_string());

        let capped = repo.search(head, SearchKind::Message, "parser", 1).unwrap();
        assert_eq!(capped.len(), 1);

        let none = repo.search(head, SearchKind::Message, "", 10).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn author_search_matches_name_or_email() {
        let test = TestRepo::new();
        test.commit(&[("a.txt", "1\n")], "one");

        let repo = test.open();
        let head = repo.head().unwrap();
        assert_eq!(repo.search(head, SearchKind::Author, "test user", 10).unwrap().len(), 1);
        assert_eq!(repo.search(head, SearchKind::Committer, "EXAMPLE.COM", 10).unwrap().len(), 1);
        assert!(repo.search(head, SearchKind::Author, "nobody", 10).unwrap().is_empty());
    }

    #[test]
    fn pickaxe_finds_additions_and_removals() {
        let test = TestRepo::new();
        let c1 = test.commit(&[("a.txt", "alpha\n")], "init");
        let c2 = test.commit(&[("a.txt", "alpha\nneedle\n")], "add needle");
        test.commit(&[("a.txt", "alpha\nneedle\nbeta\n")], "unrelated edit");
        let c4 = test.commit(&[("a.txt", "alpha\nbeta\n")], "remove needle");

        let repo = test.open();
        let hits = repo.search(repo.head().unwrap(), SearchKind::Pickaxe, "needle", 10).unwrap();
        let ids: Vec<String> = hits.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![c4.to_string(), c2.to_string()]);

        let root = repo.search(repo.head().unwrap(), SearchKind::Pickaxe, "alpha", 10).unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].id, c1.to_string());
    }

    #[test]
    fn pickaxe_skips_submodule_entries() {
        let test = TestRepo::new();
        let c1 = test.commit(&[("a.txt", "1\n")], "one");

        let parent = test.repo.find_commit(c1).unwrap();
        let base = parent.tree().unwrap();
        let mut builder = test.repo.treebuilder(Some(&base)).unwrap();
        builder
            .insert("sub", Oid::from_str(&"1".repeat(40)).unwrap(), 0o160000)
            .unwrap();
        let tree = test.repo.find_tree(builder.write().unwrap()).unwrap();
        let sig = git2::Signature::new("Test User", "test@example.com", &git2::Time::new(1_700_000_000, 0)).unwrap();
        let c2 = test
            .repo
            .commit(Some("HEAD"), &sig, &sig, "add submodule", &tree, &[&parent])
            .unwrap();

        let repo = test.open();
        let hits = repo.search(c2, SearchKind::Pickaxe, "1", 10).unwrap();
        let ids: Vec<String> = hits.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![c1.to_string()]);
    }
}
