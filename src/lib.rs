pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::http::{router, AppState, SharedState};
pub use crate::core::{loader::ModelLoader, predictor::Predictor, recommend::RecommendationService};
pub use utils::error::{PredictError, Result};
