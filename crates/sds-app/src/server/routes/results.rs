use std::sync::Arc;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use crate::error::{AppError, Result};
use crate::server::state::StudioState;

/// Raw bytes of one settled result, served as an attachment.
pub async fn download_image(
    State(state): State<Arc<StudioState>>,
    Path(index): Path<usize>,
) -> Result<Response> {
    let outcome = state.studio.generator().outcome();
    let result = outcome
        .results()
        .get(index)
        .ok_or(AppError::ResultNotFound(index))?;

    let (mime, ext) = match image::guess_format(&result.image_data) {
        Ok(format) => (
            format.to_mime_type(),
            format.extensions_str().first().copied().unwrap_or("img"),
        ),
        Err(_) => ("application/octet-stream", "bin"),
    };
    let filename = download_name(&result.metadata.model_id, index, ext, Utc::now());

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        result.image_data.clone(),
    )
        .into_response())
}

/// `sds-<timestamp>-<model>-<n>.<ext>`, with the model id reduced to
/// characters that are safe in a file name.
pub fn download_name(model_id: &str, index: usize, ext: &str, at: DateTime<Utc>) -> String {
    let model: String = model_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' { c } else { '-' })
        .collect();
    format!(
        "sds-{}-{}-{}.{}",
        at.format("%Y%m%d-%H%M%S"),
        model.trim_matches('-'),
        index + 1,
        ext
    )
}
