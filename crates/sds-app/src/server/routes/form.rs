use std::sync::Arc;
use axum::extract::State;
use axum::Json;
use sds_core::{FormPatch, GenerationForm};
use crate::server::schemas::{CompareBody, ConfigView};
use crate::server::state::StudioState;

pub async fn get_config(State(state): State<Arc<StudioState>>) -> Json<ConfigView> {
    Json(ConfigView {
        backend_url: state.backend_url.clone(),
    })
}

pub async fn get_form(State(state): State<Arc<StudioState>>) -> Json<GenerationForm> {
    Json(state.studio.form())
}

pub async fn patch_form(
    State(state): State<Arc<StudioState>>,
    Json(patch): Json<FormPatch>,
) -> Json<GenerationForm> {
    Json(state.studio.patch_form(patch))
}

pub async fn set_compare(
    State(state): State<Arc<StudioState>>,
    Json(body): Json<CompareBody>,
) -> Json<GenerationForm> {
    Json(state.studio.set_compare_mode(body.enabled))
}
