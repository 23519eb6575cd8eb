//! Weather lookups proxied to Open-Meteo.
//!
//! [`WeatherService`] never fails: when the upstream call errors or times out
//! it logs a warning and answers with randomised values in plausible ranges.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use log::warn;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

use crate::routes::weather::{ForecastDay, WeatherReport};

pub const DEFAULT_WEATHER_API_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const WEATHER_TIMEOUT_SECS: u64 = 5;
pub const FORECAST_DAYS: usize = 7;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weather_code,precipitation_sum";
const FALLBACK_CONDITIONS: [&str; 4] = ["Clear", "Clouds", "Rain", "Sunny"];

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Weather API returned status {status}")]
    Status { status: u16 },

    #[error("Malformed weather response: {message}")]
    Decode { message: String },
}

/// Label for a WMO weather interpretation code.
pub fn weather_condition(code: u32) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing Rime Fog",
        51 => "Light Drizzle",
        53 => "Moderate Drizzle",
        55 => "Dense Drizzle",
        56 => "Light Freezing Drizzle",
        57 => "Dense Freezing Drizzle",
        61 => "Slight Rain",
        63 => "Moderate Rain",
        65 => "Heavy Rain",
        66 => "Light Freezing Rain",
        67 => "Heavy Freezing Rain",
        71 => "Slight Snow",
        73 => "Moderate Snow",
        75 => "Heavy Snow",
        77 => "Snow Grains",
        80 => "Slight Rain Showers",
        81 => "Moderate Rain Showers",
        82 => "Violent Rain Showers",
        85 => "Slight Snow Showers",
        86 => "Heavy Snow Showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with Hail",
        99 => "Thunderstorm with Heavy Hail",
        _ => "Unknown",
    }
}

/// Label for a daily forecast code. The daily table has no labels for rime
/// fog, freezing precipitation, snow grains, snow showers or hail.
pub fn forecast_condition(code: u32) -> &'static str {
    match code {
        48 | 56 | 57 | 66 | 67 | 77 | 85 | 86 | 96 | 99 => "Unknown",
        other => weather_condition(other),
    }
}

/// Source of current conditions and daily forecasts.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, lat: f64, lng: f64) -> Result<WeatherReport, WeatherError>;

    async fn forecast(&self, lat: f64, lng: f64) -> Result<Vec<ForecastDay>, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentBlock,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentBlock {
    #[serde(default)]
    temperature_2m: Option<f64>,
    #[serde(default)]
    relative_humidity_2m: Option<f64>,
    #[serde(default)]
    weather_code: Option<u32>,
    #[serde(default)]
    wind_speed_10m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: DailyBlock,
}

#[derive(Debug, Default, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    weather_code: Vec<Option<u32>>,
    precipitation_sum: Vec<Option<f64>>,
}

fn report_from_current(current: CurrentBlock) -> WeatherReport {
    let code = current.weather_code.unwrap_or(0);
    let condition = weather_condition(code);
    WeatherReport {
        temperature: current.temperature_2m.unwrap_or(0.0),
        condition: condition.to_string(),
        humidity: current.relative_humidity_2m.unwrap_or(0.0),
        wind_speed: current.wind_speed_10m.unwrap_or(0.0),
        description: format!("{} conditions", condition),
        weather_code: Some(code),
    }
}

fn forecast_from_daily(daily: DailyBlock) -> Result<Vec<ForecastDay>, WeatherError> {
    let days = daily.time.len();
    if daily.temperature_2m_max.len() != days
        || daily.temperature_2m_min.len() != days
        || daily.weather_code.len() != days
        || daily.precipitation_sum.len() != days
    {
        return Err(WeatherError::Decode {
            message: "daily series have mismatched lengths".to_string(),
        });
    }

    Ok((0..days)
        .map(|i| {
            let code = daily.weather_code[i].unwrap_or(0);
            let max = daily.temperature_2m_max[i].unwrap_or(0.0);
            let min = daily.temperature_2m_min[i].unwrap_or(0.0);
            ForecastDay {
                date: daily.time[i].clone(),
                temperature: (max + min) / 2.0,
                temperature_max: max,
                temperature_min: min,
                condition: forecast_condition(code).to_string(),
                precipitation: daily.precipitation_sum[i].unwrap_or(0.0),
                weather_code: Some(code),
            }
        })
        .collect())
}

/// Open-Meteo `v1/forecast` client. No API key is required.
pub struct OpenMeteoProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(WEATHER_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Uses `WEATHER_API_URL` when set, the public endpoint otherwise.
    pub fn from_env() -> Result<Self, WeatherError> {
        let url = std::env::var("WEATHER_API_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WEATHER_API_URL.to_string());
        Self::new(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let resp = self.client.get(&self.base_url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| WeatherError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn current(&self, lat: f64, lng: f64) -> Result<WeatherReport, WeatherError> {
        let response: CurrentResponse = self
            .get_json(&[
                ("latitude", lat.to_string()),
                ("longitude", lng.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .await?;
        Ok(report_from_current(response.current))
    }

    async fn forecast(&self, lat: f64, lng: f64) -> Result<Vec<ForecastDay>, WeatherError> {
        let response: DailyResponse = self
            .get_json(&[
                ("latitude", lat.to_string()),
                ("longitude", lng.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ])
            .await?;
        forecast_from_daily(response.daily)
    }
}

/// Randomised current conditions used when the upstream is unavailable.
pub fn fallback_report<R: Rng + ?Sized>(rng: &mut R) -> WeatherReport {
    WeatherReport {
        temperature: 25.0 + rng.gen_range(0.0..10.0),
        condition: FALLBACK_CONDITIONS[rng.gen_range(0..FALLBACK_CONDITIONS.len())].to_string(),
        humidity: 60.0 + rng.gen_range(0.0..20.0),
        wind_speed: 5.0 + rng.gen_range(0.0..10.0),
        description: "Moderate weather conditions".to_string(),
        weather_code: None,
    }
}

/// Randomised seven-day forecast starting at `today`.
pub fn fallback_forecast<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Vec<ForecastDay> {
    (0..FORECAST_DAYS as i64)
        .map(|offset| ForecastDay {
            date: (today + Duration::days(offset)).format("%Y-%m-%d").to_string(),
            temperature: 20.0 + rng.gen_range(0.0..15.0),
            temperature_max: 25.0 + rng.gen_range(0.0..10.0),
            temperature_min: 15.0 + rng.gen_range(0.0..10.0),
            condition: FALLBACK_CONDITIONS[rng.gen_range(0..FALLBACK_CONDITIONS.len())]
                .to_string(),
            precipitation: rng.gen_range(0.0..20.0),
            weather_code: None,
        })
        .collect()
}

/// Best-effort weather lookups.
#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn current(&self, lat: f64, lng: f64) -> WeatherReport {
        match self.provider.current(lat, lng).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Weather API error: {}", e);
                fallback_report(&mut rand::thread_rng())
            }
        }
    }

    pub async fn forecast(&self, lat: f64, lng: f64) -> Vec<ForecastDay> {
        match self.provider.forecast(lat, lng).await {
            Ok(days) => days,
            Err(e) => {
                warn!("Weather forecast API error: {}", e);
                fallback_forecast(Utc::now().date_naive(), &mut rand::thread_rng())
            }
        }
    }
}
