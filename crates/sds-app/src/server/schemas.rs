use base64::{prelude::BASE64_STANDARD, Engine};
use sds_core::error::FieldError;
use sds_core::{GenerationRequest, GenerationResult, JobShape, ModelField, Phase, ResultLayout};
use serde::{Deserialize, Serialize};
use crate::search::SearchState;

#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    pub backend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryBody {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectBody {
    pub model_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareBody {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub field: ModelField,
    pub query: String,
    pub results: Vec<String>,
    pub pending: bool,
}

impl SearchView {
    pub fn new(field: ModelField, state: SearchState) -> Self {
        Self {
            field,
            query: state.query,
            results: state.results,
            pending: state.pending,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub index: usize,
    pub lane: Option<ModelField>,
    pub image_base64: String,
    pub metadata: GenerationRequest,
}

impl ResultView {
    pub fn all(results: &[GenerationResult], layout: ResultLayout) -> Vec<Self> {
        results
            .iter()
            .enumerate()
            .map(|(index, result)| Self {
                index,
                lane: layout.lane(index),
                image_base64: BASE64_STANDARD.encode(&result.image_data),
                metadata: result.metadata.clone(),
            })
            .collect()
    }
}

/// Response of `POST /api/generate`; `error` is empty on success.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateBody {
    pub results: Vec<ResultView>,
    pub layout: ResultLayout,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub phase: String,
    pub job: Option<JobShape>,
    pub completed: Option<usize>,
    pub layout: ResultLayout,
    pub results: Vec<ResultView>,
    pub error: Option<String>,
}

impl StatusView {
    pub fn new(phase: &Phase) -> Self {
        let layout = phase.layout();
        let outcome = phase.outcome();
        Self {
            phase: phase.name().to_string(),
            job: phase.job().copied(),
            completed: match phase {
                Phase::Submitting { completed, .. } => Some(*completed),
                _ => None,
            },
            layout,
            results: ResultView::all(outcome.results(), layout),
            error: outcome.error().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}
