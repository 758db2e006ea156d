//! Diff-related view models.
//!
//! - `Delta`: one changed file, without line content
//! - `Hunk` / `Line`: materialized patch content for one delta
//! - `FileDiff`: a delta plus whatever the chosen view needed (stat, hunks)
//! - `Diff`: all files plus aggregate stats
//!
//! Used by: `render::diff` for the unified, side-by-side and stat views

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeltaStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    TypeChange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delta {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub status: DeltaStatus,
    /// Absent for `Added`
    pub old_id: Option<String>,
    /// Absent for `Deleted`
    pub new_id: Option<String>,
    pub is_binary: bool,
}

impl Delta {
    /// Path to show for this delta: the new side unless the file was deleted.
    pub fn path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or("")
    }

    /// `old → new` for renames and copies, otherwise just the path.
    pub fn display_name(&self) -> String {
        match (self.status, &self.old_path, &self.new_path) {
            (DeltaStatus::Renamed | DeltaStatus::Copied, Some(old), Some(new)) if old != new => {
                format!("{} → {}", old, new)
            }
            _ => self.path().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LineOrigin {
    Context,
    Addition,
    Deletion,
    HunkMarker,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub origin: LineOrigin,
    pub content: String,
    pub old_lineno: Option<u32>,
    pub new_lineno: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hunk {
    pub header: String,
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileStat {
    pub additions: usize,
    pub deletions: usize,
}

impl FileStat {
    pub fn changes(&self) -> usize {
        self.additions + self.deletions
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffStats {
    pub files: usize,
    pub insertions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    pub delta: Delta,
    /// `None` when the backend could not produce a patch for this delta
    pub stat: Option<FileStat>,
    /// Only filled for views that show line content
    pub hunks: Option<Vec<Hunk>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diff {
    pub files: Vec<FileDiff>,
    pub stats: DiffStats,
}

impl Diff {
    /// Largest `additions + deletions` over all files with a stat.
    pub fn max_changes(&self) -> usize {
        self.files
            .iter()
            .filter_map(|f| f.stat.map(|s| s.changes()))
            .max()
            .unwrap_or(0)
    }
}
