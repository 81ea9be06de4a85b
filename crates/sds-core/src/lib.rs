pub mod error;
pub mod form;
pub mod job;
pub mod layout;
mod model_types;
pub mod request;

pub use form::{clamp_num_images, FormPatch, GenerationForm};
pub use job::{GenerationJob, GenerationResult, JobShape, Phase, SubmissionOutcome};
pub use layout::ResultLayout;
pub use model_types::ModelField;
pub use request::{GenerateResponse, GenerationRequest, ModelSearchResponse};
