use std::sync::Arc;
use axum::extract::{Path, State};
use axum::Json;
use sds_core::{GenerationForm, ModelField};
use crate::error::{AppError, Result};
use crate::server::schemas::{QueryBody, SearchView, SelectBody};
use crate::server::state::StudioState;

fn parse_field(slug: &str) -> Result<ModelField> {
    ModelField::from_slug(slug).ok_or_else(|| AppError::UnknownField(slug.to_string()))
}

pub async fn get_search(
    State(state): State<Arc<StudioState>>,
    Path(field): Path<String>,
) -> Result<Json<SearchView>> {
    let field = parse_field(&field)?;
    Ok(Json(SearchView::new(field, state.studio.search(field).state())))
}

pub async fn set_query(
    State(state): State<Arc<StudioState>>,
    Path(field): Path<String>,
    Json(body): Json<QueryBody>,
) -> Result<Json<SearchView>> {
    let field = parse_field(&field)?;
    let search = state.studio.type_model(field, &body.query);
    Ok(Json(SearchView::new(field, search)))
}

pub async fn select_model(
    State(state): State<Arc<StudioState>>,
    Path(field): Path<String>,
    Json(body): Json<SelectBody>,
) -> Result<Json<GenerationForm>> {
    let field = parse_field(&field)?;
    Ok(Json(state.studio.select_model(field, &body.model_id)))
}
