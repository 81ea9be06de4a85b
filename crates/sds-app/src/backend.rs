use async_trait::async_trait;
use log::{debug, warn};
use sds_core::request::BackendErrorBody;
use sds_core::{GenerateResponse, GenerationRequest, ModelSearchResponse};
use crate::error::{AppError, Result};

pub const SEARCH_PATH: &str = "/api/v1/models/search";
pub const GENERATE_PATH: &str = "/api/v1/image/generate";

/// Message used when a failed generation carries no `detail`.
pub const GENERATION_FALLBACK: &str = "unknown error from generation backend";

/// The two calls the studio makes against the generation service.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn search_models(&self, query: &str, limit: u32) -> Result<Vec<String>>;

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateResponse>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageBackend for HttpBackend {
    async fn search_models(&self, query: &str, limit: u32) -> Result<Vec<String>> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        debug!("GET {} query='{}' limit={}", url, query, limit);

        let response = self
            .client
            .get(url)
            .query(&[("query", query.to_string()), ("limit", limit.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::SearchFailed(status));
        }

        let body: ModelSearchResponse = response.json().await?;
        Ok(body.models)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateResponse> {
        let url = format!("{}{}", self.base_url, GENERATE_PATH);
        debug!("POST {} model={}", url, request.model_id);

        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BackendErrorBody>(&body)
                .ok()
                .and_then(|b| b.message())
                .unwrap_or_else(|| GENERATION_FALLBACK.to_string());
            warn!("Generation backend returned HTTP {}: {}", status, message);
            return Err(AppError::BackendError(message));
        }

        Ok(response.json().await?)
    }
}
