use crate::config::WeatherConfig;
use crate::domain::model::{FeatureVector, Label, MonthlyWeather};
use crate::utils::error::{PredictError, Result};
use async_trait::async_trait;
use chrono::Month;

/// A fitted classifier. Implementations are immutable after loading and are shared
/// across request tasks without locking.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    fn algorithm(&self) -> &'static str;

    /// Class table, in the order the estimator indexes it.
    fn classes(&self) -> &[Label];

    /// Index into `classes()` for a single sample.
    fn predict_class(&self, features: &FeatureVector) -> Result<usize>;

    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<Label>> {
        batch
            .iter()
            .map(|features| {
                let index = self.predict_class(features)?;
                self.classes()
                    .get(index)
                    .cloned()
                    .ok_or_else(|| PredictError::InferenceError {
                        message: format!("class index {} outside class table", index),
                    })
            })
            .collect()
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn monthly_weather(
        &self,
        latitude: f64,
        longitude: f64,
        month: Month,
    ) -> Result<MonthlyWeather>;
}

pub trait ConfigProvider: Send + Sync {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn model_path(&self) -> &str;
    fn crop_labels(&self) -> Vec<String>;
    fn weather(&self) -> Option<&WeatherConfig>;
}
