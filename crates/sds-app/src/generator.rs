use std::sync::Arc;
use base64::{prelude::BASE64_STANDARD, Engine};
use log::{debug, error, info, warn};
use sds_core::error::Result as ValidationResult;
use sds_core::{
    GenerateResponse, GenerationForm, GenerationJob, GenerationResult, JobShape, Phase,
    SubmissionOutcome,
};
use tokio::sync::watch;
use crate::backend::ImageBackend;
use crate::error::{AppError, Result};
use crate::events::{EventSender, GenEvent, StudioEvent};

/// Outcome message for a submission whose future was dropped mid-flight.
pub const SUBMISSION_CANCELLED: &str = "submission cancelled";

/// Drives one submission at a time from form to settled outcome.
pub struct Generator {
    backend: Arc<dyn ImageBackend>,
    phase: watch::Sender<Phase>,
    events: EventSender,
}

impl Generator {
    pub fn new(backend: Arc<dyn ImageBackend>, events: EventSender) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            backend,
            phase,
            events,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    pub fn outcome(&self) -> SubmissionOutcome {
        self.phase.borrow().outcome()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase.borrow().is_submitting()
    }

    pub fn validate(&self, form: &GenerationForm) -> ValidationResult<()> {
        form.validate()
    }

    /// Validates `form`, then issues every call of the job in order.
    ///
    /// Returns `AppError::Busy` while another submission is in flight and
    /// `AppError::Validation` for a bad form; neither touches the network.
    /// Backend failures settle the job and come back as
    /// `SubmissionOutcome::Failure`. Dropping the future before it resolves
    /// settles the job as cancelled.
    pub async fn submit(&self, form: &GenerationForm) -> Result<SubmissionOutcome> {
        let claimed = self.phase.send_if_modified(|phase| {
            if matches!(phase, Phase::Validating | Phase::Submitting { .. }) {
                return false;
            }
            *phase = Phase::Validating;
            true
        });
        if !claimed {
            warn!("Submission rejected: another job is in flight");
            return Err(AppError::Busy);
        }
        let mut claim = Claim {
            phase: &self.phase,
            job: None,
            settled: false,
        };

        let job = match GenerationJob::from_form(form) {
            Ok(job) => job,
            Err(errors) => {
                info!("Form rejected: {}", errors);
                // releasing the claim puts the phase back to Idle
                return Err(errors.into());
            }
        };

        let shape = job.shape();
        self.phase.send_replace(Phase::Submitting {
            job: shape,
            completed: 0,
        });
        claim.job = Some(shape);
        info!(
            "Job {} submitted: {} call(s), compare={}",
            job.id,
            shape.total_calls,
            shape.compare_mode
        );

        let outcome = self.run(&job).await;

        let _ = self.events.send(StudioEvent::Gen(GenEvent::Settled {
            job_id: job.id,
            error: outcome.error().map(str::to_string),
        }));
        claim.settled = true;
        self.phase.send_replace(Phase::Settled {
            job: shape,
            outcome: outcome.clone(),
        });

        Ok(outcome)
    }

    #[tracing::instrument(skip_all, fields(job = %job.id))]
    async fn run(&self, job: &GenerationJob) -> SubmissionOutcome {
        let total = job.total_calls();
        let mut results = Vec::with_capacity(total);

        for (index, request) in job.calls().enumerate() {
            debug!("Call {}/{} -> {}", index + 1, total, request.model_id);

            match self.backend.generate(&request).await.and_then(decode_result) {
                Ok(result) => {
                    results.push(result);
                    let completed = results.len();
                    self.phase.send_modify(|phase| {
                        if let Phase::Submitting { completed: c, .. } = phase {
                            *c = completed;
                        }
                    });
                    let _ = self.events.send(StudioEvent::Gen(GenEvent::Progress {
                        job_id: job.id,
                        completed,
                        total,
                    }));
                }
                Err(e) => {
                    error!("Call {}/{} for {} failed: {}", index + 1, total, request.model_id, e);
                    return SubmissionOutcome::Failure {
                        message: e.to_string(),
                    };
                }
            }
        }

        SubmissionOutcome::Success { results }
    }
}

/// Holds the phase claimed by `submit` and releases it if the submission
/// never reaches `Settled`.
struct Claim<'a> {
    phase: &'a watch::Sender<Phase>,
    job: Option<JobShape>,
    settled: bool,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let released = match self.job {
            Some(job) => {
                warn!("Submission dropped after {} call(s) were planned", job.total_calls);
                Phase::Settled {
                    job,
                    outcome: SubmissionOutcome::Failure {
                        message: SUBMISSION_CANCELLED.to_string(),
                    },
                }
            }
            None => Phase::Idle,
        };
        self.phase.send_replace(released);
    }
}

fn decode_result(response: GenerateResponse) -> Result<GenerationResult> {
    let image_data = BASE64_STANDARD.decode(response.image_base64.trim())?;
    Ok(GenerationResult {
        image_data,
        metadata: response.metadata,
    })
}
