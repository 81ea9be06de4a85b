use std::sync::Arc;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sds_core::SubmissionOutcome;
use crate::error::Result;
use crate::server::schemas::{GenerateBody, ResultView, StatusView};
use crate::server::state::StudioState;

/// Submits the session form and answers once the job has settled.
pub async fn generate(State(state): State<Arc<StudioState>>) -> Result<Response> {
    // Run detached so a dropped connection cannot strand the job mid-flight.
    let studio = state.studio.clone();
    let outcome = tokio::spawn(async move { studio.submit().await }).await??;
    let layout = state.studio.generator().phase().layout();

    let response = match outcome {
        SubmissionOutcome::Success { results } => Json(GenerateBody {
            results: ResultView::all(&results, layout),
            layout,
            error: String::new(),
        })
        .into_response(),
        SubmissionOutcome::Failure { message } => (
            StatusCode::BAD_GATEWAY,
            Json(GenerateBody {
                results: Vec::new(),
                layout,
                error: message,
            }),
        )
            .into_response(),
        SubmissionOutcome::Pending => StatusCode::ACCEPTED.into_response(),
    };

    Ok(response)
}

pub async fn status(State(state): State<Arc<StudioState>>) -> Json<StatusView> {
    Json(StatusView::new(&state.studio.generator().phase()))
}
