//! History and ref listings.
//!
//! - `render_log`: one page of commits with decorations and a "more" link
//! - `render_commit`: header block for a single commit page
//! - `render_refs`: branches and tags
//! - `render_not_found`: user-visible fragment for a missing path

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::error::Result;
use crate::git::repository::format_relative_time;
use crate::models::{short_id, Commit, CommitPage, Ref, RefKind, Signature};
use crate::render::sink::{href, link, Sink};

/// Refs keyed by the commit id they point at.
pub type Decorations = HashMap<String, Vec<Ref>>;

fn decoration_labels<S: Sink + ?Sized>(sink: &mut S, refs: Option<&Vec<Ref>>) -> Result<()> {
    for r in refs.into_iter().flatten() {
        let class = match r.kind {
            RefKind::Branch => "branch",
            RefKind::Tag => "tag",
        };
        sink.raw(&format!("<span class=\"ref {}\">", class))?;
        link(sink, &href("log", &[("rev", r.name.as_str())]), &r.shorthand)?;
        sink.raw("</span>")?;
    }
    Ok(())
}

/// Commits as table rows, in the order given.
pub fn render_commit_list<S: Sink + ?Sized>(
    sink: &mut S,
    commits: &[Commit],
    decorations: &Decorations,
) -> Result<()> {
    sink.raw("<table class=\"log\">\n")?;
    for commit in commits {
        sink.raw("<tr><td class=\"commit\">")?;
        link(sink, &href("commit", &[("id", commit.id.as_str())]), commit.short_id())?;
        sink.raw("</td><td class=\"subject\">")?;
        decoration_labels(sink, decorations.get(&commit.id))?;
        sink.text(commit.summary())?;
        sink.raw("</td><td class=\"author\">")?;
        sink.text(&commit.author.name)?;
        sink.raw("</td><td class=\"age\">")?;
        sink.text(&format_relative_time(commit.committer.time))?;
        sink.raw("</td></tr>\n")?;
    }
    sink.raw("</table>\n")
}

/// A page of history. `next_href` is the link used when the page may have a
/// successor.
pub fn render_log<S: Sink + ?Sized>(
    sink: &mut S,
    page: &CommitPage,
    decorations: &Decorations,
    next_href: Option<&str>,
) -> Result<()> {
    if page.commits.is_empty() {
        return sink.raw("<div class=\"log empty\">No commits</div>\n");
    }

    render_commit_list(sink, &page.commits, decorations)?;

    if page.has_more {
        if let Some(next) = next_href {
            sink.raw("<div class=\"pager\">")?;
            link(sink, next, "More…")?;
            sink.raw("</div>\n")?;
        }
    }
    Ok(())
}

fn format_timestamp(sig: &Signature) -> String {
    FixedOffset::east_opt(sig.offset_minutes * 60)
        .and_then(|tz| tz.timestamp_opt(sig.time, 0).single())
        .map(|dt: DateTime<FixedOffset>| dt.format("%Y-%m-%d %H:%M:%S %z").to_string())
        .unwrap_or_else(|| sig.time.to_string())
}

fn signature_row<S: Sink + ?Sized>(sink: &mut S, label: &str, sig: &Signature) -> Result<()> {
    sink.raw("<tr><th>")?;
    sink.text(label)?;
    sink.raw("</th><td>")?;
    sink.text(&sig.name)?;
    if !sig.email.is_empty() {
        sink.text(&format!(" <{}>", sig.email))?;
    }
    sink.raw("</td><td class=\"date\">")?;
    sink.text(&format_timestamp(sig))?;
    sink.raw("</td></tr>\n")
}

/// Header block for a single commit: ids, people, parents and message.
pub fn render_commit<S: Sink + ?Sized>(
    sink: &mut S,
    commit: &Commit,
    decorations: &Decorations,
) -> Result<()> {
    let class = if commit.is_merge() { "commit-header merge" } else { "commit-header" };
    sink.raw(&format!("<div class=\"{}\">\n<div class=\"subject\">", class))?;
    decoration_labels(sink, decorations.get(&commit.id))?;
    sink.text(commit.summary())?;
    sink.raw("</div>\n<table class=\"commit-meta\">\n")?;

    signature_row(sink, "author", &commit.author)?;
    signature_row(sink, "committer", &commit.committer)?;

    sink.raw("<tr><th>commit</th><td colspan=\"2\">")?;
    sink.text(&commit.id)?;
    sink.raw("</td></tr>\n")?;
    sink.raw("<tr><th>tree</th><td colspan=\"2\">")?;
    sink.text(&commit.tree)?;
    sink.raw("</td></tr>\n")?;

    for parent in &commit.parents {
        sink.raw("<tr><th>parent</th><td colspan=\"2\">")?;
        link(sink, &href("commit", &[("id", parent.as_str())]), parent)?;
        sink.raw(" (")?;
        link(
            sink,
            &href("diff", &[("from", parent.as_str()), ("to", commit.id.as_str())]),
            "diff",
        )?;
        sink.raw(")</td></tr>\n")?;
    }
    sink.raw("</table>\n<pre class=\"message\">")?;
    sink.text(&commit.message)?;
    sink.raw("</pre>\n</div>\n")
}

pub fn render_refs<S: Sink + ?Sized>(sink: &mut S, refs: &[Ref]) -> Result<()> {
    sink.raw("<table class=\"refs\">\n")?;
    for r in refs {
        let kind = match r.kind {
            RefKind::Branch => "branch",
            RefKind::Tag => "tag",
        };
        sink.raw(&format!("<tr class=\"{}\"><td class=\"name\">", kind))?;
        link(sink, &href("log", &[("rev", r.name.as_str())]), &r.shorthand)?;
        sink.raw("</td><td class=\"target\">")?;
        link(sink, &href("commit", &[("id", r.target.as_str())]), short_id(&r.target))?;
        sink.raw("</td></tr>\n")?;
    }
    sink.raw("</table>\n")
}

pub fn render_not_found<S: Sink + ?Sized>(sink: &mut S, what: &str) -> Result<()> {
    sink.raw("<div class=\"not-found\">Not found: ")?;
    sink.text(what)?;
    sink.raw("</div>\n")
}
