use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use log::{debug, warn};
use sds_core::ModelField;
use serde::Serialize;
use tokio::sync::watch;
use crate::backend::ImageBackend;
use crate::events::{EventSender, SearchEvent, StudioEvent};

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a lookup fires.
    pub debounce: Duration,
    pub limit: u32,
    /// Shorter (trimmed) queries never reach the backend.
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            limit: 10,
            min_query_len: 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<String>,
    pub pending: bool,
}

/// Debounced model autocomplete for one form field.
///
/// Every `set_query` bumps a sequence number. A scheduled lookup only fires
/// if its number is still the latest once the quiet period is over, and a
/// response is only committed under the same condition, so out-of-order
/// completions are dropped without cancelling the request itself.
#[derive(Clone)]
pub struct SearchController {
    inner: Arc<Inner>,
}

struct Inner {
    field: ModelField,
    backend: Arc<dyn ImageBackend>,
    config: SearchConfig,
    state: watch::Sender<SearchState>,
    seq: AtomicU64,
    events: EventSender,
}

impl SearchController {
    pub fn new(
        field: ModelField,
        backend: Arc<dyn ImageBackend>,
        config: SearchConfig,
        events: EventSender,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(Inner {
                field,
                backend,
                config,
                state,
                seq: AtomicU64::new(0),
                events,
            }),
        }
    }

    pub fn field(&self) -> ModelField {
        self.inner.field
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Records `text` and (re)starts the debounce timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_query(&self, text: &str) {
        let inner = &self.inner;
        let short = text.trim().chars().count() < inner.config.min_query_len;

        let mut tag = 0;
        inner.state.send_modify(|s| {
            tag = inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
            s.query = text.to_string();
            if short {
                s.results.clear();
                s.pending = false;
            }
        });

        if short {
            return;
        }

        let inner = self.inner.clone();
        let query = text.to_string();
        tokio::spawn(async move { inner.lookup(tag, query).await });
    }

    /// Picks a suggestion: it becomes the query and the list closes.
    pub fn select(&self, model_id: &str) -> String {
        self.reset(model_id);
        model_id.to_string()
    }

    pub fn clear(&self) {
        self.reset("");
    }

    fn reset(&self, query: &str) {
        let inner = &self.inner;
        inner.state.send_modify(|s| {
            inner.seq.fetch_add(1, Ordering::SeqCst);
            s.query = query.to_string();
            s.results.clear();
            s.pending = false;
        });
    }
}

impl Inner {
    fn is_current(&self, tag: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == tag
    }

    async fn lookup(&self, tag: u64, query: String) {
        tokio::time::sleep(self.config.debounce).await;

        let fired = self.state.send_if_modified(|s| {
            if !self.is_current(tag) {
                return false;
            }
            s.pending = true;
            true
        });
        if !fired {
            return;
        }

        debug!("{}: searching '{}'", self.field.name(), query);
        let outcome = self.backend.search_models(&query, self.config.limit).await;

        match outcome {
            Ok(models) => {
                let count = models.len();
                let committed = self.state.send_if_modified(|s| {
                    if !self.is_current(tag) {
                        return false;
                    }
                    s.results = models;
                    s.pending = false;
                    true
                });
                if committed {
                    let _ = self.events.send(StudioEvent::Search(SearchEvent::Committed {
                        field: self.field,
                        query,
                        count,
                    }));
                } else {
                    debug!("{}: dropping stale results for '{}'", self.field.name(), query);
                }
            }
            Err(e) => {
                warn!("{}: model search for '{}' failed: {}", self.field.name(), query, e);
                self.state.send_if_modified(|s| {
                    if !self.is_current(tag) {
                        return false;
                    }
                    s.pending = false;
                    true
                });
                let _ = self.events.send(StudioEvent::Search(SearchEvent::Failed {
                    field: self.field,
                    query,
                    message: e.to_string(),
                }));
            }
        }
    }
}
