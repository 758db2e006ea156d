//! HTTP route handlers - map endpoints to HTML fragments.
//!
//! Each submodule defines routes for one page:
//! - `log`: paginated history (GET /log)
//! - `commit`: commit header plus its diff (GET /commit)
//! - `diff`: diff between two revisions (GET /diff)
//! - `blame`: per-line attribution (GET /blame)
//! - `search`: commit search (GET /search)
//! - `refs`: branches and tags (GET /refs)
//!
//! Handlers open the repository per request on the blocking pool and render
//! into an `HtmlBody`. Nothing but the path and config is shared.

pub mod blame;
pub mod commit;
pub mod diff;
pub mod log;
pub mod refs;
pub mod search;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Router,
};

use crate::config::EngineConfig;
use crate::context::RequestContext;
use crate::error::{EngineError, Result};
use crate::render::{render_not_found, Sink};

/// What every request needs to build its own context.
#[derive(Debug, Clone)]
pub struct AppState {
    pub repo_path: PathBuf,
    pub config: EngineConfig,
}

pub type SharedState = Arc<AppState>;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .merge(log::routes(state.clone()))
        .merge(commit::routes(state.clone()))
        .merge(diff::routes(state.clone()))
        .merge(blame::routes(state.clone()))
        .merge(search::routes(state.clone()))
        .merge(refs::routes(state))
}

/// Response body sink.
#[derive(Debug, Default)]
pub struct HtmlBody {
    html: String,
}

impl HtmlBody {
    pub fn as_str(&self) -> &str {
        &self.html
    }
}

impl Sink for HtmlBody {
    fn raw(&mut self, s: &str) -> Result<()> {
        self.html.push_str(s);
        Ok(())
    }
}

impl IntoResponse for HtmlBody {
    fn into_response(self) -> Response {
        Html(self.html).into_response()
    }
}

fn error_fragment(body: &mut HtmlBody, err: &EngineError) -> Result<()> {
    match err {
        EngineError::PathNotFound(path) => render_not_found(body, path),
        other => {
            body.raw("<div class=\"error\">")?;
            body.text(&other.to_string())?;
            body.raw("</div>\n")
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            EngineError::PathNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let mut body = HtmlBody::default();
        match error_fragment(&mut body, &self) {
            Ok(()) => (status, body).into_response(),
            Err(_) => status.into_response(),
        }
    }
}

/// Open a context for this request on the blocking pool and render with `f`.
pub(crate) async fn render_page<F>(state: SharedState, f: F) -> Result<HtmlBody>
where
    F: FnOnce(&RequestContext, &mut HtmlBody) -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(move || -> Result<HtmlBody> {
        let ctx = RequestContext::open(&state.repo_path, state.config.clone())?;
        let mut body = HtmlBody::default();
        f(&ctx, &mut body)?;
        Ok(body)
    })
    .await
    .map_err(|e| EngineError::Internal(format!("Render task failed: {}", e)))?
}
