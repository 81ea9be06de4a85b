use std::sync::Arc;
use tokio::sync::mpsc;
use sds_app::{events, server, HttpBackend, Studio, StudioConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Nothing is served without a backend to talk to.
    let config = StudioConfig::load()?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    tokio::spawn(events::log_events(events_rx));

    let backend = Arc::new(HttpBackend::new(&config.backend_url));
    let studio = Arc::new(Studio::new(backend, config.search.clone(), events_tx));

    server::serve(&config, studio).await
}
