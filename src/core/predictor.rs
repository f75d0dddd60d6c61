use crate::domain::model::{FeatureVector, Label, PredictionResult, FEATURE_COUNT, FEATURE_NAMES};
use crate::domain::ports::Classifier;
use crate::utils::error::{PredictError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Validates request payloads and runs them through the shared model.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: Arc<dyn Classifier>,
}

impl Predictor {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    /// Runs a one-item batch and returns its only label.
    pub fn predict(&self, features: FeatureVector) -> Result<Label> {
        self.model
            .predict(&[features])?
            .into_iter()
            .next()
            .ok_or_else(|| PredictError::InferenceError {
                message: "model returned no prediction".to_string(),
            })
    }

    pub fn predict_payload(&self, payload: &Value) -> Result<PredictionResult> {
        let features = extract_features(payload)?;
        let prediction = self.predict(features)?;
        Ok(PredictionResult { prediction })
    }
}

/// Builds the feature vector from a JSON object in training order.
///
/// Presence of every key is checked first, so the error names the first absent key in
/// `FEATURE_NAMES` order even when earlier values are malformed. Values must then be
/// JSON numbers or numeric strings; ranges are not checked.
pub fn extract_features(payload: &Value) -> Result<FeatureVector> {
    let object = payload
        .as_object()
        .ok_or_else(|| PredictError::InvalidRequest {
            message: "Request body must be a JSON object".to_string(),
        })?;

    if let Some(missing) = FEATURE_NAMES.iter().find(|name| !object.contains_key(**name)) {
        return Err(PredictError::MissingFeature {
            feature: missing.to_string(),
        });
    }

    let mut values = [0.0; FEATURE_COUNT];
    for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
        *slot = coerce_number(name, &object[name])?;
    }
    Ok(FeatureVector::new(values))
}

pub(crate) fn coerce_number(name: &str, value: &Value) -> Result<f64> {
    let invalid = |reason: &str| PredictError::InvalidFeature {
        feature: name.to_string(),
        reason: reason.to_string(),
    };

    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid("is out of range")),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(invalid("is not a number")),
        },
        Value::Null => Err(invalid("is null")),
        _ => Err(invalid("is not a number")),
    }
}
