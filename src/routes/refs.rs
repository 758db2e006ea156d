use axum::{extract::State, routing::get, Router};

use super::{render_page, HtmlBody, SharedState};
use crate::error::Result;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/refs", get(get_refs))
        .with_state(state)
}

async fn get_refs(State(state): State<SharedState>) -> Result<HtmlBody> {
    render_page(state, |ctx, body| ctx.refs_page(body)).await
}
