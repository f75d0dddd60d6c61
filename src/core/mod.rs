pub mod classifiers;
pub mod loader;
pub mod predictor;
pub mod recommend;

pub use crate::domain::model::{FeatureVector, Label, PredictionResult};
pub use crate::domain::ports::{Classifier, ConfigProvider, WeatherSource};
pub use crate::utils::error::Result;
