use std::sync::Arc;
use axum::Router;
use axum::routing::{get, post, put};
use crate::server::routes::form::{get_form, patch_form, set_compare};
use crate::server::routes::generate::{generate, status};
use crate::server::routes::results::download_image;
use crate::server::routes::search::{get_search, select_model, set_query};
use crate::server::state::StudioState;

mod form;
mod generate;
mod results;
mod search;

pub fn api_routes() -> Router<Arc<StudioState>> {
    Router::new()
        .route("/api/config", get(form::get_config))
        .route("/api/form", get(get_form).patch(patch_form))
        .route("/api/form/compare", put(set_compare))
        .route("/api/search/{field}", get(get_search).put(set_query))
        .route("/api/search/{field}/select", post(select_model))
        .route("/api/generate", post(generate))
        .route("/api/status", get(status))
        .route("/api/results/{index}/image", get(download_image))
}
