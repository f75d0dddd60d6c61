use crate::config::WeatherConfig;
use crate::domain::model::MonthlyWeather;
use crate::domain::ports::WeatherSource;
use crate::utils::error::{PredictError, Result};
use async_trait::async_trait;
use chrono::{Datelike, Month, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct MeteostatResponse {
    #[serde(default)]
    data: Option<Vec<MeteostatMonth>>,
}

#[derive(Debug, Deserialize)]
struct MeteostatMonth {
    date: String,
    tavg: Option<f64>,
    prcp: Option<f64>,
}

fn weather_error(message: impl Into<String>) -> PredictError {
    PredictError::WeatherError {
        message: message.into(),
    }
}

/// Monthly temperature and rainfall from Meteostat (RapidAPI), humidity climatology from
/// NASA POWER.
#[derive(Debug, Clone)]
pub struct HttpWeatherSource {
    client: Client,
    meteostat_endpoint: String,
    rapidapi_host: String,
    rapidapi_key: String,
    nasa_power_endpoint: String,
    year: Option<i32>,
}

impl HttpWeatherSource {
    pub fn from_config(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let rapidapi_key =
            config
                .rapidapi_key
                .clone()
                .ok_or_else(|| PredictError::MissingConfigError {
                    field: "weather.rapidapi_key".to_string(),
                })?;

        Ok(Self {
            client,
            meteostat_endpoint: config.meteostat_endpoint.clone(),
            rapidapi_host: config.rapidapi_host.clone(),
            rapidapi_key,
            nasa_power_endpoint: config.nasa_power_endpoint.clone(),
            year: None,
        })
    }

    /// Pins the Meteostat year instead of using the previous calendar year.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    fn target_year(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year() - 1)
    }

    async fn meteostat_month(
        &self,
        latitude: f64,
        longitude: f64,
        month: Month,
    ) -> Result<(f64, f64)> {
        let year = self.target_year();
        let target_month = format!("{}-{:02}", year, month.number_from_month());

        tracing::debug!("Requesting Meteostat monthly data for {}", target_month);
        let response: MeteostatResponse = self
            .client
            .get(&self.meteostat_endpoint)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("start", format!("{}-01-01", year)),
                ("end", format!("{}-12-31", year)),
                ("model", "true".to_string()),
                ("units", "metric".to_string()),
            ])
            .header("x-rapidapi-host", &self.rapidapi_host)
            .header("x-rapidapi-key", &self.rapidapi_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let months = response
            .data
            .filter(|d| !d.is_empty())
            .ok_or_else(|| weather_error("No weather data found for this location/year"))?;

        let entry = months
            .iter()
            .find(|m| m.date.starts_with(&target_month))
            .ok_or_else(|| weather_error(format!("No weather data for {}", target_month)))?;

        match (entry.tavg, entry.prcp) {
            (Some(tavg), Some(prcp)) => Ok((tavg, prcp)),
            _ => Err(weather_error(format!(
                "Incomplete weather data for {}",
                target_month
            ))),
        }
    }

    async fn nasa_humidity(&self, latitude: f64, longitude: f64, month: Month) -> Result<f64> {
        let code = month.name()[..3].to_uppercase();

        tracing::debug!("Requesting NASA POWER RH2M climatology for {}", code);
        let body: serde_json::Value = self
            .client
            .get(&self.nasa_power_endpoint)
            .query(&[
                ("parameters", "RH2M".to_string()),
                ("community", "AG".to_string()),
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("format", "JSON".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body.pointer(&format!("/properties/parameter/RH2M/{}", code))
            .and_then(|v| v.as_f64())
            .ok_or_else(|| weather_error(format!("No humidity data for {}", code)))
    }
}

#[async_trait]
impl WeatherSource for HttpWeatherSource {
    async fn monthly_weather(
        &self,
        latitude: f64,
        longitude: f64,
        month: Month,
    ) -> Result<MonthlyWeather> {
        let ((temperature, rainfall), humidity) = tokio::try_join!(
            self.meteostat_month(latitude, longitude, month),
            self.nasa_humidity(latitude, longitude, month),
        )?;

        Ok(MonthlyWeather {
            temperature,
            rainfall,
            humidity,
        })
    }
}
