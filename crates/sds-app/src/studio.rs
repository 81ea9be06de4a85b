use std::sync::Arc;
use sds_core::{FormPatch, GenerationForm, ModelField, SubmissionOutcome};
use tokio::sync::watch;
use crate::backend::ImageBackend;
use crate::error::Result;
use crate::events::EventSender;
use crate::generator::Generator;
use crate::search::{SearchConfig, SearchController, SearchState};

/// One user's session: the form, an autocomplete per model field and the
/// generator that submits it.
pub struct Studio {
    form: watch::Sender<GenerationForm>,
    primary: SearchController,
    secondary: SearchController,
    generator: Generator,
}

impl Studio {
    pub fn new(backend: Arc<dyn ImageBackend>, search: SearchConfig, events: EventSender) -> Self {
        let (form, _) = watch::channel(GenerationForm::default());
        Self {
            form,
            primary: SearchController::new(
                ModelField::Primary,
                backend.clone(),
                search.clone(),
                events.clone(),
            ),
            secondary: SearchController::new(
                ModelField::Secondary,
                backend.clone(),
                search,
                events.clone(),
            ),
            generator: Generator::new(backend, events),
        }
    }

    pub fn form(&self) -> GenerationForm {
        self.form.borrow().clone()
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn search(&self, field: ModelField) -> &SearchController {
        match field {
            ModelField::Primary => &self.primary,
            ModelField::Secondary => &self.secondary,
        }
    }

    pub fn patch_form(&self, patch: FormPatch) -> GenerationForm {
        let compare_off = patch.compare_mode == Some(false);
        self.form.send_modify(|form| patch.apply(form));
        if compare_off {
            self.secondary.clear();
        }
        self.form()
    }

    pub fn set_compare_mode(&self, enabled: bool) -> GenerationForm {
        self.patch_form(FormPatch {
            compare_mode: Some(enabled),
            ..Default::default()
        })
    }

    /// A keystroke in a model input: the field takes the raw text and the
    /// field's autocomplete is re-armed.
    pub fn type_model(&self, field: ModelField, text: &str) -> SearchState {
        self.form.send_modify(|form| form.set_model(field, text));
        let search = self.search(field);
        search.set_query(text);
        search.state()
    }

    /// Picks a suggestion into the owning field and closes the list.
    pub fn select_model(&self, field: ModelField, model_id: &str) -> GenerationForm {
        let chosen = self.search(field).select(model_id);
        self.form.send_modify(|form| form.set_model(field, chosen));
        self.form()
    }

    /// Submits a snapshot of the current form.
    pub async fn submit(&self) -> Result<SubmissionOutcome> {
        let form = self.form();
        self.generator.submit(&form).await
    }
}
