use git2::{ObjectType, Oid, Repository};
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::models::{Commit, EntryKind, Signature, TreeEntry};

/// Repository backend for one request.
///
/// Opened at the start of a request and dropped at its end; nothing here is
/// shared between requests.
pub struct GitRepository {
    repo: Repository,
    pub path: String,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let repo = Repository::discover(&path)
            .map_err(|e| EngineError::BackendUnavailable(format!("{}: {}", path_str, e.message())))?;

        Ok(Self {
            repo,
            path: path_str,
        })
    }

    /// Raw libgit2 handle for diff, blame and revwalk primitives.
    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    /// Commit id HEAD currently points at.
    pub fn head(&self) -> Result<Oid> {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.id())
            .map_err(|e| EngineError::RevisionUnavailable(format!("HEAD: {}", e.message())))
    }

    /// Look up a fully qualified reference and peel it to a commit id.
    pub fn find_reference(&self, name: &str) -> Result<Oid> {
        let reference = self
            .repo
            .find_reference(name)
            .map_err(|_| EngineError::RevisionUnavailable(name.to_string()))?;
        let commit = reference
            .peel_to_commit()
            .map_err(|_| EngineError::RevisionUnavailable(name.to_string()))?;
        Ok(commit.id())
    }

    pub fn lookup_commit(&self, oid: Oid) -> Result<git2::Commit<'_>> {
        self.repo
            .find_commit(oid)
            .map_err(|_| EngineError::RevisionUnavailable(oid.to_string()))
    }

    pub fn lookup_tree(&self, oid: Oid) -> Result<git2::Tree<'_>> {
        Ok(self.repo.find_tree(oid)?)
    }

    pub fn lookup_blob(&self, oid: Oid) -> Result<git2::Blob<'_>> {
        Ok(self.repo.find_blob(oid)?)
    }

    /// Commit as an owned view model.
    pub fn commit(&self, oid: Oid) -> Result<Commit> {
        let commit = self.lookup_commit(oid)?;
        Ok(commit_to_model(&commit))
    }

    /// Entries of a tree in backend order.
    pub fn tree_entries(&self, oid: Oid) -> Result<Vec<TreeEntry>> {
        let tree = self.lookup_tree(oid)?;
        let entries = tree
            .iter()
            .filter_map(|entry| {
                let kind = match entry.kind() {
                    Some(ObjectType::Blob) => EntryKind::Blob,
                    Some(ObjectType::Tree) => EntryKind::Tree,
                    Some(ObjectType::Commit) => EntryKind::Commit,
                    _ => return None,
                };
                Some(TreeEntry {
                    name: entry.name().unwrap_or("").to_string(),
                    mode: entry.filemode(),
                    kind,
                    id: entry.id().to_string(),
                })
            })
            .collect();
        Ok(entries)
    }

    /// Blob at `path` inside a commit's tree.
    pub fn blob_at<'r>(&'r self, commit: &git2::Commit<'r>, path: &str) -> Result<git2::Blob<'r>> {
        let tree = commit.tree()?;
        let entry = tree
            .get_path(Path::new(path))
            .map_err(|_| EngineError::PathNotFound(path.to_string()))?;
        let obj = entry.to_object(&self.repo)?;
        obj.peel_to_blob()
            .map_err(|_| EngineError::PathNotFound(format!("{} is not a file", path)))
    }
}

pub fn signature_to_model(sig: &git2::Signature) -> Signature {
    let when = sig.when();
    Signature {
        name: sig.name().unwrap_or("Unknown").to_string(),
        email: sig.email().unwrap_or("").to_string(),
        time: when.seconds(),
        offset_minutes: when.offset_minutes(),
    }
}

pub fn commit_to_model(commit: &git2::Commit) -> Commit {
    Commit {
        id: commit.id().to_string(),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
        tree: commit.tree_id().to_string(),
        author: signature_to_model(&commit.author()),
        committer: signature_to_model(&commit.committer()),
        message: String::from_utf8_lossy(commit.message_bytes()).trim_end().to_string(),
    }
}

pub fn format_relative_time(timestamp: i64) -> String {
    format_relative_time_at(timestamp, chrono::Utc::now().timestamp())
}

pub fn format_relative_time_at(timestamp: i64, now: i64) -> String {
    let diff = now - timestamp;

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        let mins = diff / 60;
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if diff < 86400 {
        let hours = diff / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if diff < 2592000 {
        let days = diff / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else if diff < 31536000 {
        let months = diff / 2592000;
        format!("{} month{} ago", months, if months == 1 { "" } else { "s" })
    } else {
        let years = diff / 31536000;
        format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
    }
}
