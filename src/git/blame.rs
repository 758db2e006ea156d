use git2::{BlameOptions, Oid};
use std::path::Path;

use crate::error::Result;
use crate::git::repository::{signature_to_model, GitRepository};
use crate::models::{Blame, BlameHunk, BlameLine};

impl GitRepository {
    /// Attribute each line of `path` as of `at` to the commit that last
    /// changed it.
    ///
    /// Only first parents are followed and copy/move detection is off, so a
    /// line brought in by a merge is blamed on the merge commit itself.
    /// Minimum match length is libgit2's default of 20 characters.
    pub fn blame(&self, path: &str, at: Oid) -> Result<Blame> {
        let path = path.trim_matches('/');
        let commit = self.lookup_commit(at)?;
        let blob = self.blob_at(&commit, path)?;

        let mut opts = BlameOptions::new();
        opts.newest_commit(at)
            .first_parent(true)
            .track_copies_same_file(false)
            .track_copies_same_commit_moves(false)
            .track_copies_same_commit_copies(false)
            .track_copies_any_commit_copies(false);

        let start = std::time::Instant::now();
        let blame = self.inner().blame_file(Path::new(path), Some(&mut opts))?;

        let hunks: Vec<BlameHunk> = blame
            .iter()
            .enumerate()
            .map(|(index, hunk)| BlameHunk {
                index,
                start_line: hunk.final_start_line(),
                line_count: hunk.lines_in_hunk(),
                commit_id: hunk.final_commit_id().to_string(),
                signature: signature_to_model(&hunk.final_signature()),
            })
            .collect();
        tracing::debug!("Blame for {} at {}: {} hunks in {:?}", path, at, hunks.len(), start.elapsed());

        let content = String::from_utf8_lossy(blob.content());
        let lines = assign_lines(&content, &hunks);

        Ok(Blame {
            path: path.to_string(),
            commit: at.to_string(),
            hunks,
            lines,
        })
    }

    /// `blame` with a user-supplied revision, resolved through `resolve`.
    pub fn blame_revision(&self, path: &str, rev: Option<&str>) -> Result<Blame> {
        let at = self.resolve(rev, rev)?;
        self.blame(path, at)
    }
}

/// Pair each line of `content` with the hunk covering it.
///
/// `hunks` must be ordered by `start_line`, which is how the backend reports
/// them.
fn assign_lines(content: &str, hunks: &[BlameHunk]) -> Vec<BlameLine> {
    let mut cursor = 0;
    content
        .lines()
        .enumerate()
        .map(|(i, text)| {
            let line_number = i + 1;
            while cursor < hunks.len()
                && hunks[cursor].start_line + hunks[cursor].line_count <= line_number
            {
                cursor += 1;
            }
            let hunk = hunks
                .get(cursor)
                .filter(|h| h.contains(line_number))
                .map(|h| h.index);
            BlameLine {
                line_number,
                content: text.to_string(),
                hunk,
            }
        })
        .collect()
}
