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
        .route("/diff", get(get_diff))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct DiffQuery {
    from: Option<String>,
    to: Option<String>,
    path: Option<String>,
    #[serde(default)]
    view: DiffView,
}

async fn get_diff(
    State(state): State<SharedState>,
    Query(query): Query<DiffQuery>,
) -> Result<HtmlBody> {
    render_page(state, move |ctx, body| {
        ctx.diff_page(
            body,
            query.from.as_deref(),
            query.to.as_deref(),
            query.path.as_deref(),
            query.view,
        )
    })
    .await
}
