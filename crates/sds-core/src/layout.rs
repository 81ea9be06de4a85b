use serde::Serialize;
use crate::model_types::ModelField;

/// How a result grid is arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultLayout {
    Empty,
    Single,
    /// Two side-by-side lanes; indices below `split` belong to the first model.
    Lanes { split: usize },
}

impl ResultLayout {
    /// Layout for `count` results.
    ///
    /// With an explicit compare flag, lanes need compare mode and an even
    /// count. Without one (older result sets), any even count above one is
    /// read as two lanes.
    pub fn new(compare_mode: Option<bool>, count: usize) -> Self {
        if count == 0 {
            return Self::Empty;
        }
        let even = count % 2 == 0;
        let lanes = match compare_mode {
            Some(compare) => compare && even,
            None => count > 1 && even,
        };
        if lanes {
            Self::Lanes { split: count / 2 }
        } else {
            Self::Single
        }
    }

    /// Which model's lane a result index falls into.
    pub fn lane(&self, index: usize) -> Option<ModelField> {
        match self {
            Self::Lanes { split } if index < *split => Some(ModelField::Primary),
            Self::Lanes { split } if index < split * 2 => Some(ModelField::Secondary),
            _ => None,
        }
    }
}
