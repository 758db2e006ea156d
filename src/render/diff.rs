//! Diff rendering: unified, side-by-side and stat views.
//!
//! All functions are pure over their input `Diff`; the only side effect is
//! writing to the sink. Files whose patch was unavailable render a single
//! degraded row, the rest of the diff is unaffected.

use crate::config::STAT_BAR_WIDTH;
use crate::error::Result;
use crate::git::DiffView;
use crate::models::{Delta, DeltaStatus, Diff, FileDiff, Hunk, LineOrigin};
use crate::render::sink::Sink;

/// One side of a side-by-side row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell<'a> {
    pub lineno: Option<u32>,
    pub content: &'a str,
    pub origin: LineOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideBySideRow<'a> {
    /// Full-width hunk header
    Header(&'a str),
    /// Old side on the left, new side on the right; `None` is an empty cell
    Pair {
        left: Option<Cell<'a>>,
        right: Option<Cell<'a>>,
    },
}

/// Pair up the lines of a hunk for the side-by-side view.
///
/// A run of deletions directly followed by a run of additions is zipped by
/// position into `max(deletions, additions)` rows; there is no similarity
/// matching. Lone runs fill only their own side. Line order is preserved.
pub fn pair_hunk(hunk: &Hunk) -> Vec<SideBySideRow<'_>> {
    let lines = &hunk.lines;
    let mut rows = Vec::with_capacity(lines.len());
    let mut i = 0;

    let old_cell = move |idx: usize| Cell {
        lineno: lines[idx].old_lineno,
        content: lines[idx].content.as_str(),
        origin: lines[idx].origin,
    };
    let new_cell = move |idx: usize| Cell {
        lineno: lines[idx].new_lineno,
        content: lines[idx].content.as_str(),
        origin: lines[idx].origin,
    };

    while i < lines.len() {
        match lines[i].origin {
            LineOrigin::HunkMarker => {
                rows.push(SideBySideRow::Header(lines[i].content.as_str()));
                i += 1;
            }
            LineOrigin::Context => {
                rows.push(SideBySideRow::Pair {
                    left: Some(old_cell(i)),
                    right: Some(new_cell(i)),
                });
                i += 1;
            }
            LineOrigin::Deletion | LineOrigin::Addition => {
                let del_start = i;
                while i < lines.len() && lines[i].origin == LineOrigin::Deletion {
                    i += 1;
                }
                let add_start = i;
                while i < lines.len() && lines[i].origin == LineOrigin::Addition {
                    i += 1;
                }
                let dels = add_start - del_start;
                let adds = i - add_start;

                for row in 0..dels.max(adds) {
                    rows.push(SideBySideRow::Pair {
                        left: (row < dels).then(|| old_cell(del_start + row)),
                        right: (row < adds).then(|| new_cell(add_start + row)),
                    });
                }
            }
        }
    }

    rows
}

/// Green and red segment widths for one file in the stat view.
///
/// `bar = round(40 * (A+D) / max_changes)`, `green = round(bar * A / (A+D))`,
/// red is the rest. `None` when `max_changes` is zero.
pub fn stat_bar(additions: usize, deletions: usize, max_changes: usize) -> Option<(usize, usize)> {
    if max_changes == 0 {
        return None;
    }
    let total = additions + deletions;
    if total == 0 {
        return Some((0, 0));
    }

    let width = (STAT_BAR_WIDTH as f64 * total as f64 / max_changes as f64).round() as usize;
    let green = (width as f64 * additions as f64 / total as f64).round() as usize;
    Some((green, width - green))
}

fn status_label(status: DeltaStatus) -> (&'static str, &'static str) {
    match status {
        DeltaStatus::Added => ("A", "added"),
        DeltaStatus::Deleted => ("D", "deleted"),
        DeltaStatus::Modified => ("M", "modified"),
        DeltaStatus::Renamed => ("R", "renamed"),
        DeltaStatus::Copied => ("C", "copied"),
        DeltaStatus::TypeChange => ("T", "typechange"),
    }
}

fn origin_class(origin: LineOrigin) -> &'static str {
    match origin {
        LineOrigin::Context => "ctx",
        LineOrigin::Addition => "add",
        LineOrigin::Deletion => "del",
        LineOrigin::HunkMarker => "hunk",
    }
}

fn origin_prefix(origin: LineOrigin) -> &'static str {
    match origin {
        LineOrigin::Context => " ",
        LineOrigin::Addition => "+",
        LineOrigin::Deletion => "-",
        LineOrigin::HunkMarker => "",
    }
}

fn lineno_cell<S: Sink + ?Sized>(sink: &mut S, lineno: Option<u32>) -> Result<()> {
    match lineno {
        Some(n) => sink.raw(&format!("<td class=\"lineno\">{}</td>", n)),
        None => sink.raw("<td class=\"lineno\"></td>"),
    }
}

fn file_header<S: Sink + ?Sized>(sink: &mut S, delta: &Delta) -> Result<()> {
    let (letter, class) = status_label(delta.status);
    sink.raw(&format!(
        "<div class=\"diff-file-header\"><span class=\"status {}\">{}</span> ",
        class, letter
    ))?;
    sink.text(&delta.display_name())?;
    sink.raw("</div>\n")
}

fn unavailable_row<S: Sink + ?Sized>(sink: &mut S, delta: &Delta) -> Result<()> {
    if delta.is_binary {
        sink.raw("<div class=\"diff-unavailable\">Binary files differ</div>\n")
    } else {
        sink.raw("<div class=\"diff-unavailable\">No patch available</div>\n")
    }
}

/// Unified view: lines in original order, hunk headers as full-width rows.
pub fn render_unified<S: Sink + ?Sized>(sink: &mut S, diff: &Diff) -> Result<()> {
    sink.raw("<div class=\"diff unified\">\n")?;
    for file in &diff.files {
        sink.raw("<div class=\"diff-file\">\n")?;
        file_header(sink, &file.delta)?;

        match &file.hunks {
            Some(hunks) => {
                sink.raw("<table class=\"diff-unified\">\n")?;
                for hunk in hunks {
                    for line in &hunk.lines {
                        if line.origin == LineOrigin::HunkMarker {
                            sink.raw("<tr class=\"hunk\"><td colspan=\"3\">")?;
                            sink.text(&line.content)?;
                            sink.raw("</td></tr>\n")?;
                            continue;
                        }
                        sink.raw(&format!("<tr class=\"{}\">", origin_class(line.origin)))?;
                        lineno_cell(sink, line.old_lineno)?;
                        lineno_cell(sink, line.new_lineno)?;
                        sink.raw("<td class=\"code\">")?;
                        sink.raw(origin_prefix(line.origin))?;
                        sink.text(&line.content)?;
                        sink.raw("</td></tr>\n")?;
                    }
                }
                sink.raw("</table>\n")?;
            }
            None => unavailable_row(sink, &file.delta)?,
        }

        sink.raw("</div>\n")?;
    }
    sink.raw("</div>\n")
}

fn side_cell<S: Sink + ?Sized>(sink: &mut S, cell: Option<&Cell>) -> Result<()> {
    match cell {
        Some(cell) => {
            lineno_cell(sink, cell.lineno)?;
            sink.raw(&format!("<td class=\"code {}\">", origin_class(cell.origin)))?;
            sink.text(cell.content)?;
            sink.raw("</td>")
        }
        None => sink.raw("<td class=\"lineno\"></td><td class=\"code empty\"></td>"),
    }
}

/// Side-by-side view built from `pair_hunk`.
pub fn render_side_by_side<S: Sink + ?Sized>(sink: &mut S, diff: &Diff) -> Result<()> {
    sink.raw("<div class=\"diff side-by-side\">\n")?;
    for file in &diff.files {
        sink.raw("<div class=\"diff-file\">\n")?;
        file_header(sink, &file.delta)?;

        match &file.hunks {
            Some(hunks) => {
                sink.raw("<table class=\"diff-side-by-side\">\n")?;
                for hunk in hunks {
                    for row in pair_hunk(hunk) {
                        match row {
                            SideBySideRow::Header(header) => {
                                sink.raw("<tr class=\"hunk\"><td colspan=\"4\">")?;
                                sink.text(header)?;
                                sink.raw("</td></tr>\n")?;
                            }
                            SideBySideRow::Pair { left, right } => {
                                sink.raw("<tr>")?;
                                side_cell(sink, left.as_ref())?;
                                side_cell(sink, right.as_ref())?;
                                sink.raw("</tr>\n")?;
                            }
                        }
                    }
                }
                sink.raw("</table>\n")?;
            }
            None => unavailable_row(sink, &file.delta)?,
        }

        sink.raw("</div>\n")?;
    }
    sink.raw("</div>\n")
}

fn stat_row<S: Sink + ?Sized>(sink: &mut S, file: &FileDiff, max_changes: usize) -> Result<()> {
    sink.raw("<tr><td class=\"name\">")?;
    sink.text(&file.delta.display_name())?;
    sink.raw("</td>")?;

    match file.stat {
        Some(stat) => {
            sink.raw(&format!(
                "<td class=\"count\">+{}/-{}</td><td class=\"bar\">",
                stat.additions, stat.deletions
            ))?;
            if let Some((green, red)) = stat_bar(stat.additions, stat.deletions, max_changes) {
                if green > 0 {
                    sink.raw(&format!("<span class=\"bar-add\">{}</span>", "+".repeat(green)))?;
                }
                if red > 0 {
                    sink.raw(&format!("<span class=\"bar-del\">{}</span>", "-".repeat(red)))?;
                }
            }
            sink.raw("</td>")?;
        }
        None => sink.raw("<td class=\"count\">N/A</td><td class=\"bar\"></td>")?,
    }

    sink.raw("</tr>\n")
}

/// Stat view: per-file counts and proportional bars plus a summary line.
pub fn render_stat<S: Sink + ?Sized>(sink: &mut S, diff: &Diff) -> Result<()> {
    let max_changes = diff.max_changes();

    sink.raw("<table class=\"diffstat\">\n")?;
    for file in &diff.files {
        stat_row(sink, file, max_changes)?;
    }
    sink.raw(&format!(
        "<tr class=\"summary\"><td colspan=\"3\">{} file{} changed, {} insertion{}(+), {} deletion{}(-)</td></tr>\n",
        diff.stats.files,
        if diff.stats.files == 1 { "" } else { "s" },
        diff.stats.insertions,
        if diff.stats.insertions == 1 { "" } else { "s" },
        diff.stats.deletions,
        if diff.stats.deletions == 1 { "" } else { "s" },
    ))?;
    sink.raw("</table>\n")
}

pub fn render_diff<S: Sink + ?Sized>(sink: &mut S, diff: &Diff, view: DiffView) -> Result<()> {
    if diff.files.is_empty() {
        return sink.raw("<div class=\"diff empty\">No changes</div>\n");
    }
    match view {
        DiffView::Unified => render_unified(sink, diff),
        DiffView::SideBySide => render_side_by_side(sink, diff),
        DiffView::Stat => render_stat(sink, diff),
    }
}
