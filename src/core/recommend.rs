use crate::core::predictor::{coerce_number, Predictor};
use crate::domain::model::{
    FeatureVector, Label, Recommendation, RecommendationRequest, DEFAULT_CROP_LABELS,
};
use crate::domain::ports::WeatherSource;
use crate::utils::error::{PredictError, Result};
use chrono::Month;
use serde_json::Value;
use std::sync::Arc;

/// Soil readings plus a place and month, with weather filled in from external sources.
pub struct RecommendationService {
    predictor: Predictor,
    weather: Arc<dyn WeatherSource>,
    crop_labels: Vec<String>,
}

impl RecommendationService {
    pub fn new(
        predictor: Predictor,
        weather: Arc<dyn WeatherSource>,
        crop_labels: Vec<String>,
    ) -> Self {
        Self {
            predictor,
            weather,
            crop_labels,
        }
    }

    pub fn with_default_labels(predictor: Predictor, weather: Arc<dyn WeatherSource>) -> Self {
        let labels = DEFAULT_CROP_LABELS.iter().map(|s| s.to_string()).collect();
        Self::new(predictor, weather, labels)
    }

    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation> {
        let (n, p, k, ph, latitude, longitude, month) = match request {
            RecommendationRequest {
                n: Some(n),
                p: Some(p),
                k: Some(k),
                ph: Some(ph),
                latitude: Some(latitude),
                longitude: Some(longitude),
                month: Some(month),
            } => (n, p, k, ph, latitude, longitude, month),
            _ => return Err(PredictError::MissingRequestFields),
        };

        let month = parse_month(month)?;
        let n = coerce_number("N", n)?;
        let p = coerce_number("P", p)?;
        let k = coerce_number("K", k)?;
        let ph = coerce_number("ph", ph)?;
        let latitude = coerce_number("latitude", latitude)?;
        let longitude = coerce_number("longitude", longitude)?;

        let weather = self
            .weather
            .monthly_weather(latitude, longitude, month)
            .await?;
        tracing::debug!(
            "Weather for ({}, {}) in {}: {:?}",
            latitude,
            longitude,
            month.name(),
            weather
        );

        let features = FeatureVector::new([
            n,
            p,
            k,
            weather.temperature,
            weather.humidity,
            ph,
            weather.rainfall,
        ]);
        let label = self.predictor.predict(features)?;
        let crop = crop_name(&label, &self.crop_labels)?;

        Ok(Recommendation { crop })
    }
}

pub fn parse_month(value: &Value) -> Result<Month> {
    value
        .as_str()
        .and_then(|name| name.trim().parse::<Month>().ok())
        .ok_or_else(|| PredictError::InvalidRequest {
            message: "Invalid month name".to_string(),
        })
}

/// Numeric classes index the crop table; categorical classes already are crop names.
pub fn crop_name(label: &Label, crop_labels: &[String]) -> Result<String> {
    let index = match label {
        Label::Text(name) => return Ok(name.clone()),
        Label::Integer(i) => usize::try_from(*i).ok(),
        Label::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Some(*f as usize),
        Label::Float(_) => None,
    };

    index
        .and_then(|i| crop_labels.get(i))
        .cloned()
        .ok_or_else(|| PredictError::LabelMappingError {
            class: label.to_string(),
        })
}
