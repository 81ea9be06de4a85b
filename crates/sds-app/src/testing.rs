//! In-process backend double for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use base64::{prelude::BASE64_STANDARD, Engine};
use reqwest::StatusCode;
use sds_core::{GenerateResponse, GenerationRequest};
use crate::backend::ImageBackend;
use crate::error::{AppError, Result};

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

type SearchReply = std::result::Result<Vec<String>, ()>;

#[derive(Default)]
pub struct FakeBackend {
    pub searches: Mutex<Vec<(String, u32)>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
    search_script: HashMap<String, (Duration, SearchReply)>,
    generate_delay: Duration,
    fail_at: Option<(usize, String)>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, delay: Duration, models: &[&str]) -> Self {
        let models = models.iter().map(|m| m.to_string()).collect();
        self.search_script.insert(query.to_string(), (delay, Ok(models)));
        self
    }

    pub fn with_search_error(mut self, query: &str) -> Self {
        self.search_script.insert(query.to_string(), (Duration::ZERO, Err(())));
        self
    }

    pub fn with_generate_delay(mut self, delay: Duration) -> Self {
        self.generate_delay = delay;
        self
    }

    /// The call with this zero-based issue index fails with `message`.
    pub fn failing_at(mut self, index: usize, message: &str) -> Self {
        self.fail_at = Some((index, message.to_string()));
        self
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.searches.lock().unwrap().iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn generated_models(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|r| r.model_id.clone()).collect()
    }
}

#[async_trait]
impl ImageBackend for FakeBackend {
    async fn search_models(&self, query: &str, limit: u32) -> Result<Vec<String>> {
        self.searches.lock().unwrap().push((query.to_string(), limit));

        let (delay, reply) = self
            .search_script
            .get(query)
            .cloned()
            .unwrap_or_else(|| (Duration::ZERO, Ok(vec![format!("{}-model", query)])));
        tokio::time::sleep(delay).await;

        reply.map_err(|_| AppError::SearchFailed(StatusCode::SERVICE_UNAVAILABLE))
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateResponse> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        tokio::time::sleep(self.generate_delay).await;

        match &self.fail_at {
            Some((at, message)) if *at == index => Err(AppError::BackendError(message.clone())),
            _ => Ok(GenerateResponse {
                image_base64: BASE64_STANDARD.encode(PNG_BYTES),
                metadata: request.clone(),
            }),
        }
    }
}
