use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::Result;
use crate::form::GenerationForm;
use crate::layout::ResultLayout;
use crate::request::GenerationRequest;

/// A validated submission: which models to call, how many times, with
/// which shared parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    pub id: Uuid,
    pub primary_model: String,
    pub secondary_model: Option<String>,
    pub num_images: u32,
    pub base: GenerationRequest,
}

impl GenerationJob {
    /// Validates the form and applies the image-count clamp.
    pub fn from_form(form: &GenerationForm) -> Result<Self> {
        form.validate()?;

        let secondary_model = Some(form.secondary_model.trim())
            .filter(|m| form.compare_mode && !m.is_empty())
            .map(str::to_string);
        let base = form.base_request();

        Ok(Self {
            id: Uuid::new_v4(),
            primary_model: base.model_id.clone(),
            secondary_model,
            num_images: form.resolved_num_images(),
            base,
        })
    }

    pub fn compare_mode(&self) -> bool {
        self.secondary_model.as_deref().is_some_and(|m| !m.is_empty())
    }

    pub fn total_calls(&self) -> usize {
        self.num_images as usize * if self.compare_mode() { 2 } else { 1 }
    }

    /// Every backend call of the job, in issue order: the primary block,
    /// then the secondary block.
    pub fn calls(&self) -> impl Iterator<Item = GenerationRequest> + '_ {
        let models = std::iter::once(self.primary_model.as_str())
            .chain(self.secondary_model.as_deref().filter(|m| !m.is_empty()));
        models.flat_map(move |model| {
            (0..self.num_images).map(move |_| self.base.for_model(model))
        })
    }

    pub fn shape(&self) -> JobShape {
        JobShape {
            id: self.id,
            compare_mode: self.compare_mode(),
            num_images: self.num_images,
            total_calls: self.total_calls(),
        }
    }
}

/// What renderers need to know about a job without holding its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobShape {
    pub id: Uuid,
    pub compare_mode: bool,
    pub num_images: u32,
    pub total_calls: usize,
}

impl JobShape {
    pub fn layout(&self, result_count: usize) -> ResultLayout {
        ResultLayout::new(Some(self.compare_mode), result_count)
    }
}

/// One decoded image together with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub image_data: Vec<u8>,
    pub metadata: GenerationRequest,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionOutcome {
    Success {
        results: Vec<GenerationResult>,
    },
    Failure {
        message: String,
    },
    #[default]
    Pending,
}

impl SubmissionOutcome {
    pub fn results(&self) -> &[GenerationResult] {
        match self {
            Self::Success { results } => results,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { message } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Submission lifecycle as seen by the rendering layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Submitting {
        job: JobShape,
        completed: usize,
    },
    Settled {
        job: JobShape,
        outcome: SubmissionOutcome,
    },
}

impl Phase {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting { .. } => "submitting",
            Self::Settled { .. } => "settled",
        }
    }

    pub fn job(&self) -> Option<&JobShape> {
        match self {
            Self::Submitting { job, .. } | Self::Settled { job, .. } => Some(job),
            _ => None,
        }
    }

    pub fn outcome(&self) -> SubmissionOutcome {
        match self {
            Self::Settled { outcome, .. } => outcome.clone(),
            _ => SubmissionOutcome::Pending,
        }
    }

    pub fn layout(&self) -> ResultLayout {
        match self {
            Self::Settled { job, outcome } => job.layout(outcome.results().len()),
            _ => ResultLayout::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(compare: bool, num_images: &str) -> GenerationForm {
        let mut form = GenerationForm {
            primary_model: "sd-base".into(),
            prompt: "a red fox".into(),
            num_images: num_images.into(),
            ..Default::default()
        };
        if compare {
            form.set_compare_mode(true);
            form.secondary_model = "sd-xl".into();
        }
        form
    }

    #[test]
    fn test_call_plan_single() {
        let job = GenerationJob::from_form(&form(false, "3")).unwrap();
        assert!(!job.compare_mode());
        assert_eq!(job.total_calls(), 3);
        let models: Vec<String> = job.calls().map(|r| r.model_id).collect();
        assert_eq!(models, vec!["sd-base"; 3]);
    }

    #[test]
    fn test_call_plan_compare() {
        let job = GenerationJob::from_form(&form(true, "2")).unwrap();
        assert!(job.compare_mode());
        assert_eq!(job.total_calls(), 4);
        let models: Vec<String> = job.calls().map(|r| r.model_id).collect();
        assert_eq!(models, vec!["sd-base", "sd-base", "sd-xl", "sd-xl"]);
    }

    #[test]
    fn test_secondary_ignored_without_compare() {
        let mut f = form(false, "1");
        f.secondary_model = "sd-xl".into();
        let job = GenerationJob::from_form(&f).unwrap();
        assert_eq!(job.secondary_model, None);
        assert_eq!(job.total_calls(), 1);
    }

    #[test]
    fn test_count_clamped_at_boundary() {
        assert_eq!(GenerationJob::from_form(&form(false, "0")).unwrap().num_images, 1);
        assert_eq!(GenerationJob::from_form(&form(true, "13")).unwrap().total_calls(), 24);
    }

    #[test]
    fn test_invalid_form_builds_no_job() {
        let mut f = form(false, "1");
        f.prompt.clear();
        assert!(GenerationJob::from_form(&f).is_err());
    }

    #[test]
    fn test_phase_outcome_and_layout() {
        let job = GenerationJob::from_form(&form(true, "1")).unwrap();
        let result = GenerationResult {
            image_data: vec![1, 2, 3],
            metadata: job.base.clone(),
        };
        let phase = Phase::Settled {
            job: job.shape(),
            outcome: SubmissionOutcome::Success {
                results: vec![result.clone(), result],
            },
        };
        assert_eq!(phase.layout(), ResultLayout::Lanes { split: 1 });
        assert_eq!(phase.outcome().results().len(), 2);
        assert_eq!(Phase::Idle.outcome(), SubmissionOutcome::Pending);
        assert!(Phase::Submitting { job: job.shape(), completed: 0 }.is_submitting());
    }
}
