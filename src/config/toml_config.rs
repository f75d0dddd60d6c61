use crate::core::ConfigProvider;
use crate::domain::model::DEFAULT_CROP_LABELS;
use crate::utils::error::{PredictError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number,
    validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 50001;
pub const DEFAULT_MODEL_PATH: &str = "model.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    pub weather: Option<WeatherConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Crop names for numeric classes; defaults to the 22-crop table.
    pub crop_labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_meteostat_endpoint")]
    pub meteostat_endpoint: String,
    #[serde(default = "default_rapidapi_host")]
    pub rapidapi_host: String,
    pub rapidapi_key: Option<String>,
    #[serde(default = "default_nasa_power_endpoint")]
    pub nasa_power_endpoint: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_model_path() -> String {
    DEFAULT_MODEL_PATH.to_string()
}

fn default_true() -> bool {
    true
}

fn default_meteostat_endpoint() -> String {
    "https://meteostat.p.rapidapi.com/point/monthly".to_string()
}

fn default_rapidapi_host() -> String {
    "meteostat.p.rapidapi.com".to_string()
}

fn default_nasa_power_endpoint() -> String {
    "https://power.larc.nasa.gov/api/temporal/climatology/point".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            crop_labels: None,
        }
    }
}

impl TomlConfig {
    /// Loads and parses a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| PredictError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PredictError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` placeholders with environment values; unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PredictError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_positive_number("server.port", self.server.port as u64, 1)?;
        validate_path("model.path", &self.model.path)?;

        if let Some(labels) = &self.model.crop_labels {
            if labels.is_empty() {
                return Err(PredictError::InvalidConfigValueError {
                    field: "model.crop_labels".to_string(),
                    value: "[]".to_string(),
                    reason: "Label table cannot be empty".to_string(),
                });
            }
        }

        if let Some(weather) = self.weather.as_ref().filter(|w| w.enabled) {
            validate_url("weather.meteostat_endpoint", &weather.meteostat_endpoint)?;
            validate_url("weather.nasa_power_endpoint", &weather.nasa_power_endpoint)?;
            validate_non_empty_string("weather.rapidapi_host", &weather.rapidapi_host)?;
            validate_positive_number("weather.timeout_seconds", weather.timeout_seconds, 1)?;

            let key = validate_required_field("weather.rapidapi_key", &weather.rapidapi_key)?;
            validate_non_empty_string("weather.rapidapi_key", key)?;
            if key.starts_with("${") {
                return Err(PredictError::ConfigValidationError {
                    field: "weather.rapidapi_key".to_string(),
                    message: format!("environment variable {} is not set", key),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn host(&self) -> &str {
        &self.server.host
    }

    fn port(&self) -> u16 {
        self.server.port
    }

    fn model_path(&self) -> &str {
        &self.model.path
    }

    fn crop_labels(&self) -> Vec<String> {
        match &self.model.crop_labels {
            Some(labels) => labels.clone(),
            None => DEFAULT_CROP_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn weather(&self) -> Option<&WeatherConfig> {
        self.weather.as_ref().filter(|w| w.enabled)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.port(), 50001);
        assert_eq!(config.model_path(), "model.json");
        assert_eq!(config.crop_labels().len(), 22);
        assert!(config.weather().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "0.0.0.0"
port = 8080

[model]
path = "models/crop_forest.json"
crop_labels = ["rice", "maize"]

[weather]
rapidapi_key = "secret"
timeout_seconds = 5
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), 8080);
        assert_eq!(config.model_path(), "models/crop_forest.json");
        assert_eq!(config.crop_labels(), vec!["rice", "maize"]);

        let weather = config.weather().unwrap();
        assert_eq!(weather.rapidapi_host, "meteostat.p.rapidapi.com");
        assert_eq!(weather.timeout_seconds, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CROP_PREDICT_TEST_KEY", "from-env");

        let toml_content = r#"
[weather]
rapidapi_key = "${CROP_PREDICT_TEST_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.weather().unwrap().rapidapi_key.as_deref(),
            Some("from-env")
        );

        std::env::remove_var("CROP_PREDICT_TEST_KEY");
    }

    #[test]
    fn test_unset_key_placeholder_fails_validation() {
        let toml_content = r#"
[weather]
rapidapi_key = "${CROP_PREDICT_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_weather_skips_validation() {
        let toml_content = r#"
[weather]
enabled = false
meteostat_endpoint = "not a url"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.weather().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[server]\nport = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[model]\npath = \"\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[model]\ncrop_labels = []\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[model]\npath = \"from-file.json\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.model_path(), "from-file.json");
        assert!(TomlConfig::from_file("/nonexistent/crop-predict.toml").is_err());
    }
}
