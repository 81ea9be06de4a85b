mod routes;
mod schemas;
mod state;

use std::sync::Arc;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use log::info;
use tokio::net::TcpListener;
use crate::config::StudioConfig;
use crate::error::AppError;
use crate::server::routes::api_routes;
use crate::studio::Studio;

pub use schemas::{ErrorBody, GenerateBody, ResultView, StatusView};
pub use state::StudioState;

pub fn router(state: Arc<StudioState>) -> Router {
    Router::new()
        .merge(api_routes())
        .with_state(state)
}

pub async fn serve(config: &StudioConfig, studio: Arc<Studio>) -> anyhow::Result<()> {
    let state = StudioState::new(config.backend_url.clone(), studio);
    let app = router(Arc::new(state));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(
        "Serving studio on {} (backend {})",
        listener.local_addr()?,
        config.backend_url
    );

    axum::serve(listener, app).await?;
    Ok(())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Busy => StatusCode::CONFLICT,
            AppError::UnknownField(_) | AppError::ResultNotFound(_) => StatusCode::NOT_FOUND,
            AppError::SearchFailed(_)
            | AppError::BackendError(_)
            | AppError::Transport(_)
            | AppError::Decode(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let fields = match &self {
            AppError::Validation(errors) => errors.errors.clone(),
            _ => Vec::new(),
        };

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
                fields,
            }),
        )
            .into_response()
    }
}
