use serde::{Deserialize, Serialize};
use std::fmt;

/// A form value that may arrive as either a JSON number or a string.
///
/// The frontend posts raw `<input>` values, so `"2.5"`, `2.5` and `""` are all
/// legitimate. Empty strings are treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Text(String),
}

impl FormValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, FormValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormValue::Number(n) => write!(f, "{}", n),
            FormValue::Text(s) => f.write_str(s),
        }
    }
}

/// Render an optional form value, substituting `default` when absent or blank.
pub fn display_or(value: &Option<FormValue>, default: &str) -> String {
    match value {
        Some(v) if !v.is_blank() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Inputs for a yield prediction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldRequest {
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub area: Option<FormValue>,
    #[serde(default, alias = "weather")]
    pub weather_condition: Option<String>,
    #[serde(default, alias = "fertilizer")]
    pub fertilizer_used: Option<String>,
    #[serde(default)]
    pub historical_yield: Option<FormValue>,
    #[serde(default)]
    pub latitude: Option<FormValue>,
    #[serde(default)]
    pub longitude: Option<FormValue>,
}

/// Free text or a list of points; generative models return either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Advice {
    Text(String),
    Items(Vec<String>),
}

impl From<&str> for Advice {
    fn from(s: &str) -> Self {
        Advice::Text(s.to_string())
    }
}

/// Yield prediction returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldPrediction {
    /// Metric tons.
    pub predicted_yield: f64,
    /// Percentage.
    pub confidence: f64,
    pub factors: Advice,
    pub recommendations: Advice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Inputs for crop recommendations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub latitude: Option<FormValue>,
    #[serde(default)]
    pub longitude: Option<FormValue>,
    #[serde(default)]
    pub season: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecommendation {
    pub crop_name: String,
    pub reason: String,
    /// 1 to 10.
    pub suitability_score: f64,
}

impl CropRecommendation {
    pub fn new(crop_name: &str, reason: &str, suitability_score: f64) -> Self {
        Self {
            crop_name: crop_name.to_string(),
            reason: reason.to_string(),
            suitability_score,
        }
    }
}

pub const PREDICT_YIELD: &str = "/ai/predict-yield";
pub const RECOMMEND_CROPS: &str = "/ai/crop-recommendation";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_values_accept_strings_and_numbers() {
        let req: YieldRequest = serde_json::from_str(
            r#"{"cropType":"Rice","area":"2.5","weather":"Good","latitude":30.9,"longitude":""}"#,
        )
        .unwrap();
        assert_eq!(display_or(&req.area, "Not specified"), "2.5");
        assert_eq!(req.weather_condition.as_deref(), Some("Good"));
        assert_eq!(display_or(&req.latitude, "?"), "30.9");
        assert_eq!(display_or(&req.longitude, "?"), "?");
        assert_eq!(display_or(&req.historical_yield, "Not available"), "Not available");
    }

    #[test]
    fn test_advice_accepts_text_or_list() {
        let text: Advice = serde_json::from_str(r#""Irrigate weekly""#).unwrap();
        assert_eq!(text, Advice::from("Irrigate weekly"));
        let items: Advice = serde_json::from_str(r#"["Rainfall","Soil"]"#).unwrap();
        assert_eq!(items, Advice::Items(vec!["Rainfall".into(), "Soil".into()]));
    }
}
