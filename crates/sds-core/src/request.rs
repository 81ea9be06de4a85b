use serde::{Deserialize, Serialize};

pub const DEFAULT_HEIGHT: u32 = 512;
pub const DEFAULT_WIDTH: u32 = 512;
pub const DEFAULT_NUM_STEPS: u32 = 25;
pub const DEFAULT_GUIDANCE_SCALE: f32 = 7.5;

pub const MIN_NUM_STEPS: u32 = 10;
pub const MAX_NUM_STEPS: u32 = 100;
pub const MIN_GUIDANCE_SCALE: f32 = 1.0;
pub const MAX_GUIDANCE_SCALE: f32 = 20.0;
/// Guidance is chosen on a half-step grid.
pub const GUIDANCE_STEP: f32 = 0.5;
pub const MIN_DIMENSION: u32 = 128;
pub const MAX_DIMENSION: u32 = 1024;

/// Body of a single `POST /api/v1/image/generate` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub model_id: String,
    pub prompt: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub negative_prompt: String,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_num_steps")]
    pub num_steps: u32,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f32,
}

impl GenerationRequest {
    /// Request with every optional field at its default.
    pub fn new(model_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            negative_prompt: String::new(),
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            num_steps: DEFAULT_NUM_STEPS,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
        }
    }

    /// Same parameters, addressed to another model.
    pub fn for_model(&self, model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            ..self.clone()
        }
    }
}

/// Successful generation response. `metadata` echoes the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateResponse {
    pub image_base64: String,
    pub metadata: GenerationRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelSearchResponse {
    pub models: Vec<String>,
}

/// Error body the backend sends with non-success statuses.
///
/// `detail` is usually a string, but validation failures carry a list of
/// objects, so it is kept as raw JSON.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl BackendErrorBody {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) if s.is_empty() => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_num_steps() -> u32 {
    DEFAULT_NUM_STEPS
}

fn default_guidance_scale() -> f32 {
    DEFAULT_GUIDANCE_SCALE
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
