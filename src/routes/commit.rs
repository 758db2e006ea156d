//! Single commit endpoint.
//!
//! GET /commit?id=<id or ref>&view=unified|side-by-side|stat
//!
//! Header block (ids, people, parents, message) followed by the diff against
//! the first parent, or against the empty tree for a root commit.

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{render_page, HtmlBody, SharedState};
use crate::error::Result;
use crate::git::DiffView;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/commit", get(get_commit))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CommitQuery {
    id: Option<String>,
    #[serde(default)]
    view: DiffView,
}

async fn get_commit(
    State(state): State<SharedState>,
    Query(query): Query<CommitQuery>,
) -> Result<HtmlBody> {
    render_page(state, move |ctx, body| ctx.commit_page(body, query.id.as_deref(), query.view)).await
}
