use serde::{Deserialize, Serialize};

/// Current conditions at a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub temperature: f64,
    pub condition: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub description: String,
    /// WMO code; absent when the values are a local fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<u32>,
}

/// One day of the 7-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    pub temperature: f64,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub condition: String,
    pub precipitation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<u32>,
}

pub const GET_WEATHER: &str = "/weather/{lat}/{lng}";
pub const GET_FORECAST: &str = "/weather/forecast/{lat}/{lng}";
