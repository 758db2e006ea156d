//! Blame endpoint.
//!
//! GET /blame?path=<path>&rev=<optional>
//!
//! Per-line attribution for a file at a revision. A path missing at that
//! revision answers 404 with a "not found" fragment.

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{render_page, HtmlBody, SharedState};
use crate::error::Result;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/blame", get(get_blame))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct BlameQuery {
    path: String,
    rev: Option<String>,
}

async fn get_blame(
    State(state): State<SharedState>,
    Query(query): Query<BlameQuery>,
) -> Result<HtmlBody> {
    render_page(state, move |ctx, body| ctx.try_blame_page(body, &query.path, query.rev.as_deref())).await
}
