//! Blame rendering.
//!
//! Contiguous lines that belong to the same hunk instance form one visual
//! block: the first row carries the attribution (commit link, author, age),
//! the rest leave those cells blank. Lines with no hunk get placeholders.

use crate::config::BLAME_AUTHOR_WIDTH;
use crate::error::Result;
use crate::git::repository::format_relative_time;
use crate::models::{short_id, Blame, BlameHunk, BlameLine};
use crate::render::sink::{href, link, Sink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution<'a> {
    /// First line of a block
    Start(&'a BlameHunk),
    /// Same hunk instance as the line above
    Continuation,
    /// No hunk covers this line
    Unknown,
}

#[derive(Debug, Clone, Copy)]
pub struct BlameRow<'a> {
    pub line: &'a BlameLine,
    pub attribution: Attribution<'a>,
}

/// Coalesce lines into blocks of the same hunk instance.
pub fn blame_rows(blame: &Blame) -> Vec<BlameRow<'_>> {
    let mut previous: Option<usize> = None;
    blame
        .lines
        .iter()
        .map(|line| {
            let attribution = match (line.hunk, blame.hunk_for(line)) {
                (Some(idx), Some(_)) if previous == Some(idx) => Attribution::Continuation,
                (Some(_), Some(hunk)) => Attribution::Start(hunk),
                _ => Attribution::Unknown,
            };
            previous = line.hunk;
            BlameRow { line, attribution }
        })
        .collect()
}

/// Author name cut to the gutter width, on character boundaries.
pub fn truncate_author(name: &str) -> &str {
    match name.char_indices().nth(BLAME_AUTHOR_WIDTH) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

pub fn render_blame<S: Sink + ?Sized>(sink: &mut S, blame: &Blame) -> Result<()> {
    sink.raw("<table class=\"blame\">\n")?;

    for row in blame_rows(blame) {
        match row.attribution {
            Attribution::Start(hunk) => {
                sink.raw("<tr class=\"block-start\"><td class=\"commit\">")?;
                link(sink, &href("commit", &[("id", hunk.commit_id.as_str())]), short_id(&hunk.commit_id))?;
                sink.raw("</td><td class=\"author\" title=\"")?;
                sink.text(&hunk.signature.name)?;
                sink.raw("\">")?;
                sink.text(truncate_author(&hunk.signature.name))?;
                sink.raw("</td><td class=\"age\">")?;
                sink.text(&format_relative_time(hunk.signature.time))?;
                sink.raw("</td>")?;
            }
            Attribution::Continuation => {
                sink.raw("<tr><td class=\"commit\"></td><td class=\"author\"></td><td class=\"age\"></td>")?;
            }
            Attribution::Unknown => {
                sink.raw(
                    "<tr class=\"unblamed\"><td class=\"commit\">?</td><td class=\"author\">?</td><td class=\"age\">?</td>",
                )?;
            }
        }

        sink.raw(&format!("<td class=\"lineno\">{}</td><td class=\"code\">", row.line.line_number))?;
        sink.text(&row.line.content)?;
        sink.raw("</td></tr>\n")?;
    }

    sink.raw("</table>\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Signature;

    fn hunk(index: usize, start_line: usize, line_count: usize, commit: char, author: &str) -> BlameHunk {
        BlameHunk {
            index,
            start_line,
            line_count,
            commit_id: commit.to_string().repeat(40),
            signature: Signature {
                name: author.to_string(),
                email: String::new(),
                time: 0,
                offset_minutes: 0,
            },
        }
    }

    fn lines(hunks: &[Option<usize>]) -> Vec<BlameLine> {
        hunks
            .iter()
            .enumerate()
            .map(|(i, hunk)| BlameLine {
                line_number: i + 1,
                content: format!("line {}", i + 1),
                hunk: *hunk,
            })
            .collect()
    }

    #[test]
    fn one_hunk_is_one_attribution_row() {
        let blame = Blame {
            path: "a.txt".to_string(),
            commit: "x".repeat(40),
            hunks: vec![hunk(0, 1, 5, 'a', "Alice")],
            lines: lines(&[Some(0); 5]),
        };
        let rows = blame_rows(&blame);
        assert_eq!(rows.len(), 5);
        assert!(matches!(rows[0].attribution, Attribution::Start(_)));
        assert!(rows[1..].iter().all(|r| r.attribution == Attribution::Continuation));

        let mut out = String::new();
        render_blame(&mut out, &blame).unwrap();
        assert_eq!(out.matches("block-start").count(), 1);
        assert_eq!(out.matches("<td class=\"commit\"></td>").count(), 4);
    }

    #[test]
    fn same_commit_in_separate_hunks_does_not_merge() {
        let blame = Blame {
            path: "a.txt".to_string(),
            commit: "x".repeat(40),
            hunks: vec![hunk(0, 1, 1, 'a', "Alice"), hunk(1, 2, 1, 'b', "Bob"), hunk(2, 3, 1, 'a', "Alice")],
            lines: lines(&[Some(0), Some(1), Some(2)]),
        };
        let rows = blame_rows(&blame);
        assert!(rows.iter().all(|r| matches!(r.attribution, Attribution::Start(_))));

        // Adjacent hunk instances from one commit still start new blocks
        let adjacent = Blame {
            hunks: vec![hunk(0, 1, 1, 'a', "Alice"), hunk(1, 2, 1, 'a', "Alice")],
            lines: lines(&[Some(0), Some(1)]),
            ..blame
        };
        let rows = blame_rows(&adjacent);
        assert!(matches!(rows[1].attribution, Attribution::Start(_)));
    }

    #[test]
    fn uncovered_lines_get_placeholders() {
        let blame = Blame {
            path: "a.txt".to_string(),
            commit: "x".repeat(40),
            hunks: vec![hunk(0, 1, 1, 'a', "Alice")],
            lines: lines(&[Some(0), None]),
        };
        let mut out = String::new();
        render_blame(&mut out, &blame).unwrap();
        assert!(out.contains("<tr class=\"unblamed\"><td class=\"commit\">?</td><td class=\"author\">?</td><td class=\"age\">?</td>"));
    }

    #[test]
    fn long_author_names_are_truncated() {
        assert_eq!(truncate_author("Short"), "Short");
        assert_eq!(truncate_author("Maximiliana Featherstonehaugh"), "Maximiliana Feathers");
        assert_eq!(truncate_author("ÄÖÜäöüßÄÖÜäöüßÄÖÜäöüßÄ").chars().count(), 20);

        let blame = Blame {
            path: "a.txt".to_string(),
            commit: "x".repeat(40),
            hunks: vec![hunk(0, 1, 1, 'a', "Maximiliana Featherstonehaugh")],
            lines: lines(&[Some(0)]),
        };
        let mut out = String::new();
        render_blame(&mut out, &blame).unwrap();
        assert!(out.contains(">Maximiliana Feathers</td>"));
        assert!(out.contains("href=\"commit?id=aaaaaaaaaa"));
    }
}
