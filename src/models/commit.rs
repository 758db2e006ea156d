use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch
    pub time: i64,
    /// Timezone offset from UTC in minutes
    pub offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    /// Ordered parent ids: empty for a root commit, two or more for a merge.
    pub parents: Vec<String>,
    pub tree: String,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Abbreviate a hex object id for display.
pub fn short_id(id: &str) -> &str {
    &id[..id.len().min(7)]
}

/// One page of history as produced by the walker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitPage {
    pub commits: Vec<Commit>,
    pub offset: usize,
    pub limit: usize,
    /// `commits.len() == limit`; a hint, not an exact lookahead.
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Branch,
    Tag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    /// Fully qualified name, e.g. `refs/heads/main`
    pub name: String,
    pub shorthand: String,
    pub kind: RefKind,
    /// Commit the ref ultimately points at (annotated tags are peeled)
    pub target: String,
}
