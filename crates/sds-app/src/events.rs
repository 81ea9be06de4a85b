use log::{info, warn};
use sds_core::ModelField;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

pub type EventSender = UnboundedSender<StudioEvent>;
pub type EventReceiver = UnboundedReceiver<StudioEvent>;

#[derive(Debug, Clone, PartialEq)]
pub enum StudioEvent {
    Search(SearchEvent),
    Gen(GenEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Committed {
        field: ModelField,
        query: String,
        count: usize,
    },
    Failed {
        field: ModelField,
        query: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenEvent {
    Progress {
        job_id: Uuid,
        completed: usize,
        total: usize,
    },
    Settled {
        job_id: Uuid,
        error: Option<String>,
    },
}

/// Drains the event channel into the log until every sender is gone.
pub async fn log_events(mut rx: EventReceiver) {
    while let Some(event) = rx.recv().await {
        match event {
            StudioEvent::Search(SearchEvent::Committed { field, query, count }) => {
                info!("{}: {} suggestions for '{}'", field.name(), count, query);
            }
            StudioEvent::Search(SearchEvent::Failed { field, query, message }) => {
                warn!("{}: search for '{}' failed: {}", field.name(), query, message);
            }
            StudioEvent::Gen(GenEvent::Progress { job_id, completed, total }) => {
                info!("Job {}: {}/{} images", job_id, completed, total);
            }
            StudioEvent::Gen(GenEvent::Settled { job_id, error: None }) => {
                info!("Job {} complete", job_id);
            }
            StudioEvent::Gen(GenEvent::Settled { job_id, error: Some(e) }) => {
                warn!("Job {} failed: {}", job_id, e);
            }
        }
    }
}
