//! Revision resolution and ref listing.
//!
//! `resolve` is the only place that turns user input into a commit id. The
//! history walker, the diff entry points and blame all go through it, so the
//! fallback order is the same everywhere:
//!
//! 1. full hex id of an existing object
//! 2. absent / `HEAD` → HEAD
//! 3. `refs/heads/<rev>`
//! 4. `refs/tags/<rev>`
//! 5. `<rev>` as given
//! 6. HEAD
//!
//! Branches and tags are told apart by namespace only.

use git2::{BranchType, Oid};
use std::collections::HashMap;

use crate::error::Result;
use crate::git::repository::GitRepository;
use crate::models::{Ref, RefKind};

const HEADS_PREFIX: &str = "refs/heads/";
const TAGS_PREFIX: &str = "refs/tags/";

/// True for a 40 character hex string (a full SHA-1 id).
fn is_full_hex_id(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

impl GitRepository {
    /// Resolve an explicit id and/or a revision name to a commit id.
    ///
    /// Never fails unless HEAD itself cannot be resolved, in which case the
    /// error is `RevisionUnavailable`.
    pub fn resolve(&self, id: Option<&str>, rev: Option<&str>) -> Result<Oid> {
        if let Some(oid) = id.and_then(|id| self.existing_object(id)) {
            return Ok(oid);
        }

        let rev = match rev.map(str::trim) {
            None | Some("") | Some("HEAD") => return self.head(),
            Some(rev) => rev,
        };

        let candidates = [
            format!("{}{}", HEADS_PREFIX, rev),
            format!("{}{}", TAGS_PREFIX, rev),
            rev.to_string(),
        ];
        for name in &candidates {
            match self.find_reference(name) {
                Ok(oid) => {
                    tracing::debug!("Resolved {} via {}", rev, name);
                    return Ok(oid);
                }
                Err(_) => continue,
            }
        }

        tracing::debug!("Could not resolve {}, falling back to HEAD", rev);
        self.head()
    }

    /// Same as `resolve` with only a revision name.
    pub fn resolve_rev(&self, rev: Option<&str>) -> Result<Oid> {
        self.resolve(None, rev)
    }

    /// Commit named by a full hex id. Tag objects are peeled; trees, blobs
    /// and unknown ids yield `None` so the caller keeps going down the chain.
    fn existing_object(&self, id: &str) -> Option<Oid> {
        let id = id.trim();
        if !is_full_hex_id(id) {
            return None;
        }
        let oid = Oid::from_str(id).ok()?;
        match self.inner().find_object(oid, None).and_then(|o| o.peel_to_commit()) {
            Ok(commit) => Some(commit.id()),
            Err(e) => {
                tracing::debug!("{} does not name a commit: {}", id, e.message());
                None
            }
        }
    }

    /// Local branches then tags, each sorted by name.
    ///
    /// Refs that cannot be peeled to a commit (e.g. a tag on a tree) are
    /// skipped.
    pub fn list_refs(&self) -> Result<Vec<Ref>> {
        let mut branches = Vec::new();
        for branch in self.inner().branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            let reference = branch.get();
            if let Some(r) = self.to_ref(reference, RefKind::Branch) {
                branches.push(r);
            }
        }
        branches.sort_by(|a, b| a.name.cmp(&b.name));

        let mut tags = Vec::new();
        for name in self.inner().tag_names(None)?.iter().flatten() {
            let full = format!("{}{}", TAGS_PREFIX, name);
            if let Ok(reference) = self.inner().find_reference(&full) {
                if let Some(r) = self.to_ref(&reference, RefKind::Tag) {
                    tags.push(r);
                }
            }
        }
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        branches.extend(tags);
        Ok(branches)
    }

    fn to_ref(&self, reference: &git2::Reference, kind: RefKind) -> Option<Ref> {
        let name = reference.name()?.to_string();
        let target = reference.peel_to_commit().ok()?.id();
        let shorthand = reference
            .shorthand()
            .map(|s| s.to_string())
            .unwrap_or_else(|| name.clone());
        Some(Ref {
            name,
            shorthand,
            kind,
            target: target.to_string(),
        })
    }

    /// Refs grouped by the commit they point at, for log decoration.
    pub fn decorations(&self) -> Result<HashMap<String, Vec<Ref>>> {
        let mut map: HashMap<String, Vec<Ref>> = HashMap::new();
        for r in self.list_refs()? {
            map.entry(r.target.clone()).or_default().push(r);
        }
        Ok(map)
    }
}
