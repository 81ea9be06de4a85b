#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{prelude::BASE64_STANDARD, Engine};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use sds_app::server::{self, StudioState};
use sds_app::{HttpBackend, SearchConfig, Studio};

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

/// Stand-in for the generation service, recording what it receives.
#[derive(Clone, Default)]
pub struct FakeService {
    pub searches: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub generations: Arc<Mutex<Vec<Value>>>,
}

impl FakeService {
    pub fn generated_models(&self) -> Vec<String> {
        self.generations
            .lock()
            .unwrap()
            .iter()
            .map(|body| body["model_id"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

async fn search(
    State(service): State<FakeService>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    service.searches.lock().unwrap().push(params.clone());
    let query = params.get("query").cloned().unwrap_or_default();
    if query == "fail" {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "detail": "hub down" }))).into_response();
    }
    Json(json!({ "models": [format!("{}/model-a", query), format!("{}/model-b", query)] }))
        .into_response()
}

async fn generate(State(service): State<FakeService>, Json(body): Json<Value>) -> Response {
    service.generations.lock().unwrap().push(body.clone());
    match body["model_id"].as_str() {
        Some("missing") => {
            (StatusCode::NOT_FOUND, Json(json!({ "detail": "model not found" }))).into_response()
        }
        Some("opaque") => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(json!({
            "image_base64": BASE64_STANDARD.encode(PNG_BYTES),
            "metadata": body,
        }))
        .into_response(),
    }
}

async fn serve_on_ephemeral_port(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub async fn spawn_backend() -> (String, FakeService) {
    let service = FakeService::default();
    let app = Router::new()
        .route("/api/v1/models/search", get(search))
        .route("/api/v1/image/generate", post(generate))
        .with_state(service.clone());
    (serve_on_ephemeral_port(app).await, service)
}

/// Fake backend plus a studio served in front of it; returns the studio URL.
pub async fn spawn_studio() -> (String, FakeService) {
    let (backend_url, service) = spawn_backend().await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let search = SearchConfig {
        debounce: Duration::from_millis(50),
        ..SearchConfig::default()
    };
    let studio = Studio::new(Arc::new(HttpBackend::new(&backend_url)), search, tx);
    let state = StudioState::new(backend_url, Arc::new(studio));

    (serve_on_ephemeral_port(server::router(Arc::new(state))).await, service)
}
