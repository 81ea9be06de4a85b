use std::sync::Arc;
use crate::studio::Studio;

/// Router state. There is one `Studio` per process, so every HTTP client
/// shares the same form, autocompletes and generation outcome.
pub struct StudioState {
    pub backend_url: String,
    pub studio: Arc<Studio>,
}

impl StudioState {
    pub fn new(backend_url: impl Into<String>, studio: Arc<Studio>) -> Self {
        Self {
            backend_url: backend_url.into(),
            studio,
        }
    }
}
