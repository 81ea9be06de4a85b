pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod generator;
pub mod search;
pub mod server;
pub mod studio;

#[cfg(test)]
mod testing;

pub use backend::{HttpBackend, ImageBackend};
pub use config::StudioConfig;
pub use error::AppError;
pub use generator::Generator;
pub use search::{SearchConfig, SearchController, SearchState};
pub use studio::Studio;
