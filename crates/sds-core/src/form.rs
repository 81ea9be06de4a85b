use serde::{Deserialize, Deserializer, Serialize};
use crate::error::{Result, ValidationErrors};
use crate::model_types::ModelField;
use crate::request::*;

pub const MIN_NUM_IMAGES: u32 = 1;
pub const MAX_NUM_IMAGES: u32 = 12;
pub const DEFAULT_NUM_IMAGES: u32 = 1;

/// Raw form state as the user edits it.
///
/// `num_images` stays textual until submission, where it is clamped
/// instead of rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationForm {
    pub primary_model: String,
    pub secondary_model: String,
    pub compare_mode: bool,
    pub prompt: String,
    pub negative_prompt: String,
    pub height: u32,
    pub width: u32,
    pub num_steps: u32,
    pub guidance_scale: f32,
    #[serde(deserialize_with = "lenient_text")]
    pub num_images: String,
}

impl Default for GenerationForm {
    fn default() -> Self {
        Self {
            primary_model: String::new(),
            secondary_model: String::new(),
            compare_mode: false,
            prompt: String::new(),
            negative_prompt: String::new(),
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            num_steps: DEFAULT_NUM_STEPS,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            num_images: DEFAULT_NUM_IMAGES.to_string(),
        }
    }
}

impl GenerationForm {
    pub fn model(&self, field: ModelField) -> &str {
        match field {
            ModelField::Primary => &self.primary_model,
            ModelField::Secondary => &self.secondary_model,
        }
    }

    pub fn set_model(&mut self, field: ModelField, value: impl Into<String>) {
        match field {
            ModelField::Primary => self.primary_model = value.into(),
            ModelField::Secondary => self.secondary_model = value.into(),
        }
    }

    /// Turning compare mode off drops the second model.
    pub fn set_compare_mode(&mut self, enabled: bool) {
        self.compare_mode = enabled;
        if !enabled {
            self.secondary_model.clear();
        }
    }

    /// Image count after the submission-boundary clamp.
    pub fn resolved_num_images(&self) -> u32 {
        clamp_num_images(&self.num_images)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::default();

        if self.primary_model.trim().is_empty() {
            errors.push(ModelField::Primary.key(), "Required");
        }
        if self.prompt.trim().is_empty() {
            errors.push("prompt", "Required");
        }
        if self.compare_mode && self.secondary_model.trim().is_empty() {
            errors.push(ModelField::Secondary.key(), "Required");
        }

        if !(MIN_NUM_STEPS..=MAX_NUM_STEPS).contains(&self.num_steps) {
            errors.push(
                "num_steps",
                format!("must be between {} and {}", MIN_NUM_STEPS, MAX_NUM_STEPS),
            );
        }

        let g = self.guidance_scale;
        if !g.is_finite() || !(MIN_GUIDANCE_SCALE..=MAX_GUIDANCE_SCALE).contains(&g) {
            errors.push(
                "guidance_scale",
                format!("must be between {} and {}", MIN_GUIDANCE_SCALE, MAX_GUIDANCE_SCALE),
            );
        } else if (g / GUIDANCE_STEP).fract() != 0.0 {
            errors.push("guidance_scale", format!("must be a multiple of {}", GUIDANCE_STEP));
        }

        for (name, value) in [("height", self.height), ("width", self.width)] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
                errors.push(
                    name,
                    format!("must be between {} and {}", MIN_DIMENSION, MAX_DIMENSION),
                );
            }
        }

        errors.into_result()
    }

    /// Shared request for every call of a job, addressed to the primary model.
    pub fn base_request(&self) -> GenerationRequest {
        GenerationRequest {
            model_id: self.primary_model.trim().to_string(),
            prompt: self.prompt.clone(),
            negative_prompt: self.negative_prompt.clone(),
            height: self.height,
            width: self.width,
            num_steps: self.num_steps,
            guidance_scale: self.guidance_scale,
        }
    }
}

/// Partial form update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormPatch {
    pub primary_model: Option<String>,
    pub secondary_model: Option<String>,
    pub compare_mode: Option<bool>,
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub num_steps: Option<u32>,
    pub guidance_scale: Option<f32>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub num_images: Option<String>,
}

impl FormPatch {
    pub fn apply(self, form: &mut GenerationForm) {
        if let Some(v) = self.primary_model {
            form.primary_model = v;
        }
        if let Some(v) = self.secondary_model {
            form.secondary_model = v;
        }
        if let Some(v) = self.prompt {
            form.prompt = v;
        }
        if let Some(v) = self.negative_prompt {
            form.negative_prompt = v;
        }
        if let Some(v) = self.height {
            form.height = v;
        }
        if let Some(v) = self.width {
            form.width = v;
        }
        if let Some(v) = self.num_steps {
            form.num_steps = v;
        }
        if let Some(v) = self.guidance_scale {
            form.guidance_scale = v;
        }
        if let Some(v) = self.num_images {
            form.num_images = v;
        }
        // Last, so switching off also wins over a secondary model in the same patch.
        if let Some(v) = self.compare_mode {
            form.set_compare_mode(v);
        }
    }
}

/// `max(1, min(input, 12))`; anything unparseable falls back to the default.
pub fn clamp_num_images(input: &str) -> u32 {
    let trimmed = input.trim();
    let parsed = trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            // saturating: +inf lands on the upper bound, -inf on the lower
            .map(|v| v.trunc() as i64)
    });

    match parsed {
        Some(n) => n.clamp(MIN_NUM_IMAGES as i64, MAX_NUM_IMAGES as i64) as u32,
        None => DEFAULT_NUM_IMAGES,
    }
}

fn value_as_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_as_text(value).unwrap_or_else(|| DEFAULT_NUM_IMAGES.to_string()))
}

fn lenient_opt_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_as_text(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled() -> GenerationForm {
        GenerationForm {
            primary_model: "sd-base".into(),
            prompt: "a red fox".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clamp_law() {
        assert_eq!(clamp_num_images("0"), 1);
        assert_eq!(clamp_num_images("13"), 12);
        assert_eq!(clamp_num_images("-5"), 1);
        assert_eq!(clamp_num_images("abc"), 1);
        assert_eq!(clamp_num_images(""), 1);
        assert_eq!(clamp_num_images(" 4 "), 4);
        assert_eq!(clamp_num_images("3.9"), 3);
        assert_eq!(clamp_num_images("99999999999999999999"), 12);
        assert_eq!(clamp_num_images("1e400"), 12);
        assert_eq!(clamp_num_images("inf"), 12);
        assert_eq!(clamp_num_images("-inf"), 1);
        assert_eq!(clamp_num_images("NaN"), 1);
    }

    #[test]
    fn test_num_images_accepts_numbers_and_text() {
        let form: GenerationForm = serde_json::from_value(json!({ "num_images": 13 })).unwrap();
        assert_eq!(form.resolved_num_images(), 12);

        let form: GenerationForm = serde_json::from_value(json!({ "num_images": "abc" })).unwrap();
        assert_eq!(form.resolved_num_images(), 1);

        let form: GenerationForm = serde_json::from_value(json!({ "num_images": null })).unwrap();
        assert_eq!(form.num_images, "1");
    }

    #[test]
    fn test_required_fields() {
        let errors = GenerationForm::default().validate().unwrap_err();
        assert_eq!(errors.get("model_id"), Some("Required"));
        assert_eq!(errors.get("prompt"), Some("Required"));
        assert_eq!(errors.get("model_id_2"), None);

        assert!(filled().validate().is_ok());
    }

    #[test]
    fn test_compare_requires_secondary() {
        let mut form = filled();
        form.compare_mode = true;
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.errors.len(), 1);
        assert_eq!(errors.get("model_id_2"), Some("Required"));

        form.secondary_model = "sd-xl".into();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_count_is_not_an_error() {
        let mut form = filled();
        form.num_images = "0".into();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_advanced_ranges() {
        let mut form = filled();
        form.num_steps = 5;
        form.guidance_scale = 7.3;
        form.width = 2048;
        let errors = form.validate().unwrap_err();
        assert!(errors.get("num_steps").is_some());
        assert_eq!(errors.get("guidance_scale"), Some("must be a multiple of 0.5"));
        assert!(errors.get("width").is_some());
        assert!(errors.get("height").is_none());

        form.guidance_scale = 20.5;
        assert!(form.validate().unwrap_err().get("guidance_scale").unwrap().contains("between"));
    }

    #[test]
    fn test_compare_toggle_clears_secondary() {
        let mut form = filled();
        form.set_compare_mode(true);
        form.set_model(ModelField::Secondary, "sd-xl");
        form.set_compare_mode(false);
        assert!(!form.compare_mode);
        assert_eq!(form.secondary_model, "");
    }

    #[test]
    fn test_patch() {
        let mut form = filled();
        let patch: FormPatch = serde_json::from_value(json!({
            "prompt": "a blue whale",
            "num_images": 3,
            "compare_mode": true,
            "secondary_model": "sd-xl"
        }))
        .unwrap();
        patch.apply(&mut form);
        assert_eq!(form.prompt, "a blue whale");
        assert_eq!(form.num_images, "3");
        assert!(form.compare_mode);
        assert_eq!(form.secondary_model, "sd-xl");
        assert_eq!(form.primary_model, "sd-base");
    }

    #[test]
    fn test_base_request_trims_model() {
        let mut form = filled();
        form.primary_model = "  sd-base ".into();
        form.negative_prompt = "blurry".into();
        let req = form.base_request();
        assert_eq!(req.model_id, "sd-base");
        assert_eq!(req.negative_prompt, "blurry");
        assert_eq!(req.num_steps, DEFAULT_NUM_STEPS);
    }
}
