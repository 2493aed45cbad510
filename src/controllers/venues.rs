use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/venue.json", get(small_venue))
        .route("/venue-large.json", get(large_venue))
}

fn json_document(body: &Arc<String>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        body.as_str().to_owned(),
    )
        .into_response()
}

pub async fn small_venue(State(state): State<Arc<AppState>>) -> Response {
    json_document(&state.small_venue)
}

pub async fn large_venue(State(state): State<Arc<AppState>>) -> Response {
    json_document(&state.large_venue)
}
