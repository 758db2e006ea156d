//! Tree-to-tree diffs.
//!
//! `TreeDiff` wraps a backend diff and realizes as little as each view
//! needs:
//! - `deltas()` / `stats()` never touch line content
//! - `file_stat(idx)` builds one file's patch to count its lines
//! - `hunks(idx)` materializes hunks and lines for one file
//!
//! A patch that cannot be produced (binary content, backend failure) is a
//! per-file `PatchUnavailable`; `materialize` turns it into a degraded
//! `FileDiff` instead of failing the whole diff.

use git2::{Delta as GitDelta, DiffFindOptions, DiffOptions, Oid, Patch};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::git::repository::GitRepository;
use crate::models::{
    Delta, DeltaStatus, Diff, DiffStats, FileDiff, FileStat, Hunk, Line, LineOrigin,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DiffView {
    #[default]
    Unified,
    SideBySide,
    Stat,
}

impl DiffView {
    /// Whether the view shows line content.
    pub fn needs_hunks(self) -> bool {
        !matches!(self, DiffView::Stat)
    }
}

pub struct TreeDiff<'r> {
    diff: git2::Diff<'r>,
}

impl GitRepository {
    /// Diff two trees. `old = None` is the empty tree, so every entry of
    /// `new` shows up as added.
    pub fn diff_trees(
        &self,
        old: Option<&git2::Tree<'_>>,
        new: &git2::Tree<'_>,
        path: Option<&str>,
        context_lines: u32,
    ) -> Result<TreeDiff<'_>> {
        let mut opts = DiffOptions::new();
        opts.context_lines(context_lines);

        if let Some(p) = path.map(|p| p.trim_matches('/')) {
            if !p.is_empty() {
                opts.pathspec(p);
            }
        }

        let mut diff = self.inner().diff_tree_to_tree(old, Some(new), Some(&mut opts))?;

        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find))?;

        Ok(TreeDiff { diff })
    }

    /// Diff between two commits. Without `from`, `to` is compared against
    /// its first parent, or the empty tree for a root commit.
    pub fn diff_commits(
        &self,
        from: Option<Oid>,
        to: Oid,
        path: Option<&str>,
        context_lines: u32,
    ) -> Result<TreeDiff<'_>> {
        let to_commit = self.lookup_commit(to)?;
        let to_tree = to_commit.tree()?;

        let from_tree = match from {
            Some(oid) => Some(self.lookup_commit(oid)?.tree()?),
            None if to_commit.parent_count() > 0 => Some(to_commit.parent(0)?.tree()?),
            None => None,
        };

        self.diff_trees(from_tree.as_ref(), &to_tree, path, context_lines)
    }

    /// Same as `diff_commits` with user-supplied revisions, resolved through
    /// `resolve`. Each string may be a full id or a ref name.
    pub fn diff_revisions(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        path: Option<&str>,
        context_lines: u32,
    ) -> Result<TreeDiff<'_>> {
        let to = self.resolve(to, to)?;
        let from = match from.filter(|f| !f.is_empty()) {
            Some(f) => Some(self.resolve(Some(f), Some(f))?),
            None => None,
        };
        self.diff_commits(from, to, path, context_lines)
    }
}

fn map_status(status: GitDelta) -> DeltaStatus {
    match status {
        GitDelta::Added => DeltaStatus::Added,
        GitDelta::Deleted => DeltaStatus::Deleted,
        GitDelta::Renamed => DeltaStatus::Renamed,
        GitDelta::Copied => DeltaStatus::Copied,
        GitDelta::Typechange => DeltaStatus::TypeChange,
        _ => DeltaStatus::Modified,
    }
}

fn non_zero(oid: Oid) -> Option<String> {
    if oid.is_zero() { None } else { Some(oid.to_string()) }
}

fn delta_to_model(delta: &git2::DiffDelta) -> Delta {
    let status = map_status(delta.status());
    let old_path = delta.old_file().path().map(|p| p.to_string_lossy().to_string());
    let new_path = delta.new_file().path().map(|p| p.to_string_lossy().to_string());

    let old_id = match status {
        DeltaStatus::Added => None,
        _ => non_zero(delta.old_file().id()),
    };
    let new_id = match status {
        DeltaStatus::Deleted => None,
        _ => non_zero(delta.new_file().id()),
    };

    Delta {
        old_path,
        new_path,
        status,
        old_id,
        new_id,
        is_binary: delta.flags().is_binary(),
    }
}

fn strip_newline(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_end_matches('\n').trim_end_matches('\r').to_string()
}

impl<'r> TreeDiff<'r> {
    pub fn len(&self) -> usize {
        self.diff.deltas().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Changed files, without line content.
    pub fn deltas(&self) -> Vec<Delta> {
        self.diff.deltas().map(|d| delta_to_model(&d)).collect()
    }

    /// Aggregate counters from the backend.
    pub fn stats(&self) -> Result<DiffStats> {
        let stats = self.diff.stats()?;
        Ok(DiffStats {
            files: stats.files_changed(),
            insertions: stats.insertions(),
            deletions: stats.deletions(),
        })
    }

    fn patch(&self, idx: usize) -> Result<Patch<'r>> {
        let unavailable = || {
            let path = self
                .diff
                .get_delta(idx)
                .map(|d| delta_to_model(&d).path().to_string())
                .unwrap_or_else(|| format!("delta #{}", idx));
            EngineError::PatchUnavailable(path)
        };

        let patch = Patch::from_diff(&self.diff, idx)
            .map_err(|_| unavailable())?
            .ok_or_else(unavailable)?;
        if patch.delta().flags().is_binary() {
            return Err(unavailable());
        }
        Ok(patch)
    }

    /// Line counts for one file, computed from its own patch.
    pub fn file_stat(&self, idx: usize) -> Result<FileStat> {
        let patch = self.patch(idx)?;
        file_stat_of(&patch)
    }

    /// Hunks and lines for one file.
    pub fn hunks(&self, idx: usize) -> Result<Vec<Hunk>> {
        let patch = self.patch(idx)?;
        hunks_of(&patch)
    }

    /// Build the view model. The stat view gets stats only; other views also
    /// get hunks. Files whose patch is unavailable keep `None` and are logged.
    pub fn materialize(&self, view: DiffView) -> Result<Diff> {
        let stats = self.stats()?;
        let mut files = Vec::with_capacity(self.len());

        for (idx, delta) in self.diff.deltas().enumerate() {
            let mut delta = delta_to_model(&delta);

            let (stat, hunks) = match self.patch(idx) {
                Ok(patch) => {
                    delta.is_binary = false;
                    let stat = file_stat_of(&patch);
                    let hunks = if view.needs_hunks() {
                        hunks_of(&patch).map(Some)
                    } else {
                        Ok(None)
                    };
                    match (stat, hunks) {
                        (Ok(stat), Ok(hunks)) => (Some(stat), hunks),
                        (stat, hunks) => {
                            tracing::warn!("Incomplete patch for {}", delta.path());
                            (stat.ok(), hunks.ok().flatten())
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!("{}", e);
                    delta.is_binary = true;
                    (None, None)
                }
            };

            files.push(FileDiff { delta, stat, hunks });
        }

        Ok(Diff { files, stats })
    }
}

fn file_stat_of(patch: &Patch) -> Result<FileStat> {
    let (_, additions, deletions) = patch.line_stats()?;
    Ok(FileStat {
        additions,
        deletions,
    })
}

fn hunks_of(patch: &Patch) -> Result<Vec<Hunk>> {
    let mut hunks = Vec::with_capacity(patch.num_hunks());

    for hunk_idx in 0..patch.num_hunks() {
        let (hunk, _) = patch.hunk(hunk_idx)?;
        let header = strip_newline(hunk.header());

        let mut lines = vec![Line {
            origin: LineOrigin::HunkMarker,
            content: header.clone(),
            old_lineno: None,
            new_lineno: None,
        }];

        for line_idx in 0..patch.num_lines_in_hunk(hunk_idx)? {
            let line = patch.line_in_hunk(hunk_idx, line_idx)?;

            let origin = match line.origin() {
                '+' => LineOrigin::Addition,
                '-' => LineOrigin::Deletion,
                ' ' => LineOrigin::Context,
                // End-of-file newline markers carry no line of their own
                _ => continue,
            };

            lines.push(Line {
                origin,
                content: strip_newline(line.content()),
                old_lineno: line.old_lineno(),
                new_lineno: line.new_lineno(),
            });
        }

        hunks.push(Hunk {
            header,
            old_start: hunk.old_start(),
            old_lines: hunk.old_lines(),
            new_start: hunk.new_start(),
            new_lines: hunk.new_lines(),
            lines,
        });
    }

    Ok(hunks)
}
