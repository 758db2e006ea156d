//! Per-request context.
//!
//! A `RequestContext` owns the repository handle and configuration for one
//! request (an HTTP request or a CLI invocation). It is built at the start
//! of the request, threaded through every component, and dropped at the end
//! so the repository is closed again. Nothing in it is shared.
//!
//! The `*_page` methods compose resolver, walker, diff, blame and renderers
//! into complete fragments. Recoverable failures (missing path, one broken
//! patch, undecorated log) degrade the fragment instead of failing it.

use std::path::Path;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::git::{DiffView, GitRepository, SearchKind, WalkOrder};
use crate::render::sink::href;
use crate::render::{self, Decorations, Sink};

pub struct RequestContext {
    pub repo: GitRepository,
    pub config: EngineConfig,
}

/// Parameters of a log page.
#[derive(Debug, Clone, Default)]
pub struct LogRequest<'a> {
    pub rev: Option<&'a str>,
    pub path: Option<&'a str>,
    pub order: WalkOrder,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl RequestContext {
    pub fn open<P: AsRef<Path>>(path: P, config: EngineConfig) -> Result<Self> {
        let repo = GitRepository::open(path)?;
        Ok(Self { repo, config })
    }

    fn decorations(&self) -> Decorations {
        self.repo.decorations().unwrap_or_else(|e| {
            tracing::warn!("Could not load refs for decoration: {}", e);
            Decorations::new()
        })
    }

    pub fn log_page<S: Sink + ?Sized>(&self, sink: &mut S, req: &LogRequest) -> Result<()> {
        let start = Instant::now();
        let head = self.repo.resolve(req.rev, req.rev)?;
        let limit = self.config.clamp_limit(req.limit);
        let page = self.repo.walk(head, req.order, req.path, req.offset, limit)?;

        let next_offset = (req.offset + page.commits.len()).to_string();
        let limit_str = limit.to_string();
        let mut params = vec![("offset", next_offset.as_str()), ("limit", limit_str.as_str())];
        if let Some(rev) = req.rev {
            params.push(("rev", rev));
        }
        if let Some(path) = req.path {
            params.push(("path", path));
        }
        if req.order == WalkOrder::Topo {
            params.push(("order", "topo"));
        }
        let next = href("log", &params);

        render::render_log(sink, &page, &self.decorations(), Some(&next))?;
        tracing::info!("log page: {} commits in {:?}", page.commits.len(), start.elapsed());
        Ok(())
    }

    /// Commit header followed by its diff against the first parent.
    pub fn commit_page<S: Sink + ?Sized>(&self, sink: &mut S, id: Option<&str>, view: DiffView) -> Result<()> {
        let oid = self.repo.resolve(id, id)?;
        let commit = self.repo.commit(oid)?;
        render::render_commit(sink, &commit, &self.decorations())?;

        let diff = self
            .repo
            .diff_commits(None, oid, None, self.config.context_lines)?
            .materialize(view)?;
        render::render_diff(sink, &diff, view)
    }

    pub fn diff_page<S: Sink + ?Sized>(
        &self,
        sink: &mut S,
        from: Option<&str>,
        to: Option<&str>,
        path: Option<&str>,
        view: DiffView,
    ) -> Result<()> {
        let start = Instant::now();
        let diff = self
            .repo
            .diff_revisions(from, to, path, self.config.context_lines)?
            .materialize(view)?;
        render::render_diff(sink, &diff, view)?;
        tracing::info!("diff page: {} files in {:?}", diff.files.len(), start.elapsed());
        Ok(())
    }

    /// Blame table. A path missing at `rev` is `PathNotFound`, left to the
    /// caller.
    pub fn try_blame_page<S: Sink + ?Sized>(&self, sink: &mut S, path: &str, rev: Option<&str>) -> Result<()> {
        let start = Instant::now();
        let blame = self.repo.blame_revision(path, rev)?;
        render::render_blame(sink, &blame)?;
        tracing::info!("blame page: {} lines in {:?}", blame.lines.len(), start.elapsed());
        Ok(())
    }

    /// Blame table, or a "not found" fragment when the path is missing.
    pub fn blame_page<S: Sink + ?Sized>(&self, sink: &mut S, path: &str, rev: Option<&str>) -> Result<()> {
        match self.try_blame_page(sink, path, rev) {
            Err(EngineError::PathNotFound(p)) => render::render_not_found(sink, &p),
            other => other,
        }
    }

    pub fn search_page<S: Sink + ?Sized>(
        &self,
        sink: &mut S,
        rev: Option<&str>,
        kind: SearchKind,
        query: &str,
    ) -> Result<()> {
        let head = self.repo.resolve(rev, rev)?;
        let commits = self.repo.search(head, kind, query, self.config.max_results)?;
        if commits.is_empty() {
            return sink.raw("<div class=\"log empty\">No matching commits</div>\n");
        }
        render::render_commit_list(sink, &commits, &self.decorations())
    }

    pub fn refs_page<S: Sink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        let refs = self.repo.list_refs()?;
        render::render_refs(sink, &refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestRepo;

    fn context(test: &TestRepo) -> RequestContext {
        RequestContext::open(test.dir.path(), EngineConfig::default()).unwrap()
    }

    #[test]
    fn log_page_links_next_page() {
        let test = TestRepo::new();
        for i in 0..3 {
            let content = format!("{}\n", i);
            test.commit(&[("a.txt", content.as_str())], "edit");
        }

        let ctx = context(&test);
        let mut out = String::new();
        let req = LogRequest {
            rev: Some("main"),
            limit: Some(2),
            ..Default::default()
        };
        ctx.log_page(&mut out, &req).unwrap();
        assert_eq!(out.matches("<tr>").count(), 2);
        assert!(out.contains("log?offset=2&amp;limit=2&amp;rev=main"));
        assert!(out.contains("<span class=\"ref branch\">"));
    }

    #[test]
    fn blame_page_reports_missing_path() {
        let test = TestRepo::new();
        test.commit(&[("a.txt", "1\n")], "init");

        let ctx = context(&test);
        let mut out = String::new();
        ctx.blame_page(&mut out, "missing.txt", None).unwrap();
        assert!(out.contains("Not found: missing.txt"));
    }

    #[test]
    fn commit_page_renders_root_diff() {
        let test = TestRepo::new();
        let c1 = test.commit(&[("a.txt", "hello\n")], "init");

        let ctx = context(&test);
        let mut out = String::new();
        let id = c1.to_string();
        ctx.commit_page(&mut out, Some(&id), DiffView::Stat).unwrap();
        assert!(out.contains("commit-header"));
        assert!(out.contains("+1/-0"));
        assert!(out.contains("1 file changed, 1 insertion(+), 0 deletions(-)"));
    }

    #[test]
    fn pages_accept_annotated_tag_object_ids() {
        let test = TestRepo::new();
        let c1 = test.commit(&[("a.txt", "hello\n")], "init");
        test.commit(&[("a.txt", "hello\nworld\n")], "more");
        let tag = test.annotated_tag("release", c1).to_string();

        let ctx = context(&test);
        let mut commit = String::new();
        ctx.commit_page(&mut commit, Some(&tag), DiffView::Unified).unwrap();
        assert!(commit.contains(&c1.to_string()));

        let mut blame = String::new();
        ctx.blame_page(&mut blame, "a.txt", Some(&tag)).unwrap();
        assert_eq!(blame.matches("<td class=\"lineno\">").count(), 1);
    }

    #[test]
    fn try_blame_page_leaves_missing_path_to_caller() {
        let test = TestRepo::new();
        test.commit(&[("a.txt", "1\n")], "init");

        let ctx = context(&test);
        let mut out = String::new();
        let err = ctx.try_blame_page(&mut out, "missing.txt", None).err().unwrap();
        assert!(matches!(err, EngineError::PathNotFound(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn diff_page_side_by_side() {
        let test = TestRepo::new();
        test.commit(&[("a.txt", "a\nb\nc\n")], "init");
        test.commit(&[("a.txt", "a\nB\nc\n")], "edit");

        let ctx = context(&test);
        let mut out = String::new();
        ctx.diff_page(&mut out, None, Some("main"), None, DiffView::SideBySide).unwrap();
        assert!(out.contains("diff side-by-side"));
        assert!(out.contains("<td class=\"code del\">b</td>"));
        assert!(out.contains("<td class=\"code add\">B</td>"));
    }

    #[test]
    fn search_and_refs_pages() {
        let test = TestRepo::new();
        let c1 = test.commit(&[("a.txt", "1\n")], "Add parser");
        test.lightweight_tag("v1.0", c1);

        let ctx = context(&test);
        let mut out = String::new();
        ctx.search_page(&mut out, None, SearchKind::Message, "parser").unwrap();
        assert!(out.contains("Add parser"));

        let mut none = String::new();
        ctx.search_page(&mut none, None, SearchKind::Message, "zzz").unwrap();
        assert!(none.contains("No matching commits"));

        let mut refs = String::new();
        ctx.refs_page(&mut refs).unwrap();
        assert!(refs.contains(">main</a>"));
        assert!(refs.contains(">v1.0</a>"));
    }
}
