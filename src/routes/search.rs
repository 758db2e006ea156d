//! Search endpoint.
//!
//! GET /search?q=<query>&kind=message|author|committer|pickaxe&rev=<optional>

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{render_page, HtmlBody, SharedState};
use crate::error::Result;
use crate::git::SearchKind;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/search", get(get_search))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    #[serde(default)]
    kind: SearchKind,
    rev: Option<String>,
}

async fn get_search(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Result<HtmlBody> {
    render_page(state, move |ctx, body| {
        ctx.search_page(body, query.rev.as_deref(), query.kind, &query.q)
    })
    .await
}
