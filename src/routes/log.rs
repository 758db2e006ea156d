//! History endpoint.
//!
//! GET /log?rev=<optional>&path=<optional>&order=time|topo&offset=0&limit=<optional>
//!
//! One page of commits reachable from `rev` (HEAD when absent or unknown),
//! optionally restricted to commits touching `path`.

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{render_page, HtmlBody, SharedState};
use crate::context::LogRequest;
use crate::error::Result;
use crate::git::WalkOrder;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/log", get(get_log))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LogQuery {
    rev: Option<String>,
    path: Option<String>,
    #[serde(default)]
    order: WalkOrder,
    #[serde(default)]
    offset: usize,
    limit: Option<usize>,
}

async fn get_log(
    State(state): State<SharedState>,
    Query(query): Query<LogQuery>,
) -> Result<HtmlBody> {
    render_page(state, move |ctx, body| {
        let req = LogRequest {
            rev: query.rev.as_deref(),
            path: query.path.as_deref(),
            order: query.order,
            offset: query.offset,
            limit: query.limit,
        };
        ctx.log_page(body, &req)
    })
    .await
}
