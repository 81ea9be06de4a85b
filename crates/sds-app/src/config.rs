use std::env;
use std::time::Duration;
use log::info;
use reqwest::Url;
use crate::error::{AppError, Result};
use crate::search::SearchConfig;

pub const BACKEND_URL_VAR: &str = "BACKEND_URL";

#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Origin of the generation backend, without a trailing slash.
    pub backend_url: String,
    pub port: u16,
    pub search: SearchConfig,
}

impl StudioConfig {
    /// Reads an optional `.env`, then the process environment.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(AppError::Config(format!("failed to read .env: {}", e))),
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = lookup(BACKEND_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Config(format!("{} is not set", BACKEND_URL_VAR)))?;

        let url = Url::parse(&raw)
            .map_err(|e| AppError::Config(format!("{} is not a valid URL: {}", BACKEND_URL_VAR, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "{} must be an http(s) URL, got {}",
                BACKEND_URL_VAR,
                url.scheme()
            )));
        }

        let port = parse_or("PORT", &lookup, 3000u16)?;
        let debounce_ms = parse_or("SEARCH_DEBOUNCE_MS", &lookup, 300u64)?;
        let limit = parse_or("SEARCH_LIMIT", &lookup, 10u32)?;

        Ok(Self {
            backend_url: raw.trim_end_matches('/').to_string(),
            port,
            search: SearchConfig {
                debounce: Duration::from_millis(debounce_ms),
                limit,
                ..SearchConfig::default()
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", key, v))),
    }
}
