use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Failed to load model from '{path}': {reason}")]
    ModelLoadError { path: String, reason: String },

    #[error("Invalid model artifact: {message}")]
    InvalidModelError { message: String },

    #[error("Missing feature: '{feature}'")]
    MissingFeature { feature: String },

    #[error("Invalid feature: '{feature}' {reason}")]
    InvalidFeature { feature: String, reason: String },

    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("Missing required fields.")]
    MissingRequestFields,

    #[error("Inference failed: {message}")]
    InferenceError { message: String },

    #[error("{message}")]
    WeatherError { message: String },

    #[error("No crop label for class {class}")]
    LabelMappingError { class: String },
}

impl PredictError {
    /// Errors caused by the caller's payload rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictError::MissingFeature { .. }
                | PredictError::InvalidFeature { .. }
                | PredictError::InvalidRequest { .. }
                | PredictError::MissingRequestFields
        )
    }

    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            PredictError::ModelLoadError { .. }
                | PredictError::InvalidModelError { .. }
                | PredictError::ConfigError { .. }
                | PredictError::ConfigValidationError { .. }
                | PredictError::InvalidConfigValueError { .. }
                | PredictError::MissingConfigError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PredictError::ModelLoadError { path, .. } => {
                format!("Could not load the model artifact at {}", path)
            }
            PredictError::InvalidModelError { .. } => {
                "The model artifact is not a supported classifier export".to_string()
            }
            PredictError::ConfigError { .. }
            | PredictError::ConfigValidationError { .. }
            | PredictError::InvalidConfigValueError { .. }
            | PredictError::MissingConfigError { .. } => {
                format!("Configuration problem: {}", self)
            }
            PredictError::IoError(e) => format!("I/O failure: {}", e),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PredictError::ModelLoadError { .. } => {
                "Check --model-path (or [model].path) points to a readable JSON export"
            }
            PredictError::InvalidModelError { .. } => {
                "Re-export the model with the expected algorithm tag and feature order"
            }
            PredictError::ConfigError { .. }
            | PredictError::ConfigValidationError { .. }
            | PredictError::InvalidConfigValueError { .. }
            | PredictError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags"
            }
            PredictError::ApiError(_) | PredictError::WeatherError { .. } => {
                "Check network access and the weather API credentials"
            }
            PredictError::IoError(_) => "Check file permissions and that the port is free",
            _ => "Check the request payload",
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_feature_message_quotes_key() {
        let err = PredictError::MissingFeature {
            feature: "ph".to_string(),
        };
        assert_eq!(err.to_string(), "Missing feature: 'ph'");
        assert!(err.is_client_error());
        assert!(!err.is_startup_failure());
    }

    #[test]
    fn test_model_load_error_is_startup_failure() {
        let err = PredictError::ModelLoadError {
            path: "model.json".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert!(err.is_startup_failure());
        assert!(!err.is_client_error());
        assert!(err.user_friendly_message().contains("model.json"));
    }
}
