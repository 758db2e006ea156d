//! Blame view models.
//!
//! Provides per-line commit attribution for a file at a specific commit.
//! Lines point at the hunk *instance* covering them so the renderer can
//! coalesce contiguous rows without merging unrelated ranges that happen to
//! share a commit.

use serde::Serialize;

use super::Signature;

/// One attribution range as computed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameHunk {
    /// Position in `Blame::hunks`; identity used for coalescing
    pub index: usize,
    /// First line covered (1-indexed)
    pub start_line: usize,
    pub line_count: usize,
    pub commit_id: String,
    pub signature: Signature,
}

impl BlameHunk {
    pub fn contains(&self, line_number: usize) -> bool {
        line_number >= self.start_line && line_number < self.start_line + self.line_count
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlameLine {
    /// Line number (1-indexed)
    pub line_number: usize,
    pub content: String,
    /// Index into `Blame::hunks`, `None` if no hunk covers this line
    pub hunk: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Blame {
    pub path: String,
    pub commit: String,
    pub hunks: Vec<BlameHunk>,
    pub lines: Vec<BlameLine>,
}

impl Blame {
    pub fn hunk_for(&self, line: &BlameLine) -> Option<&BlameHunk> {
        line.hunk.and_then(|idx| self.hunks.get(idx))
    }
}
