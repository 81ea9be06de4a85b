use serde::{Deserialize, Serialize};

/// One of the two model inputs on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelField {
    Primary,
    Secondary,
}

impl ModelField {
    /// Label for display in UI
    pub fn name(&self) -> &str {
        match self {
            Self::Primary => "Model 1",
            Self::Secondary => "Model 2",
        }
    }

    /// Form field key used in validation reports
    pub fn key(&self) -> &str {
        match self {
            Self::Primary => "model_id",
            Self::Secondary => "model_id_2",
        }
    }

    /// Path segment used by the HTTP surface
    pub fn slug(&self) -> &str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::all().into_iter().find(|f| f.slug() == slug)
    }

    pub fn all() -> [ModelField; 2] {
        [Self::Primary, Self::Secondary]
    }
}
